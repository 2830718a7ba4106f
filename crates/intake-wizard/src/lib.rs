use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use intake_spec::{
    AssembleError, FormSpec, SchemaError, StepSpec, StepState, SubmissionRecord, ValidationResult,
    assemble, clear_inactive, count_value, reconcile, validate_step,
};

/// Errors surfaced by wizard orchestration. Validation failures are not
/// errors; they come back as data through [`AdvanceOutcome::Rejected`].
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error("registration already submitted")]
    AlreadySubmitted,
    #[error("field '{0}' is not on the active step")]
    FieldNotOnStep(String),
    #[error("no sub-record block '{0}' on the active step")]
    UnknownBlock(String),
    #[error("no entry {index} in block '{schema}'")]
    UnknownEntry { schema: String, index: usize },
    #[error("field '{field}' is not part of block '{schema}'")]
    UnknownEntryField { schema: String, field: String },
    #[error("no assembled record to submit")]
    NotAssembled,
    #[error("a submission attempt is already in flight")]
    SubmissionInFlight,
    #[error("no submission attempt is in flight")]
    NoSubmissionInFlight,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failure reported by the persistence collaborator. Surfaced to the user
/// as retryable; the assembled record is kept so retry skips re-entry.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Failure reported by the notification collaborator.
#[derive(Debug, Error)]
#[error("notification failure: {0}")]
pub struct NotifyError(pub String);

/// Persistence collaborator contract. Implementations live outside the
/// core; the id and creation timestamp on stored records are theirs to
/// assign.
pub trait RegistrationStore {
    fn submit(&mut self, record: &SubmissionRecord) -> Result<String, TransportError>;
    fn fetch_all(&self, form_id: &str) -> Result<Vec<SubmissionRecord>, TransportError>;
}

/// Notification collaborator contract.
pub trait Notifier {
    fn record_submitted(&mut self, record: &SubmissionRecord) -> Result<(), NotifyError>;
}

/// Hands a submitted record to the notification collaborator. Failure is
/// logged and swallowed: notification never blocks or reverses a completed
/// submission.
pub fn notify_submitted(notifier: &mut dyn Notifier, record: &SubmissionRecord) {
    if let Err(error) = notifier.record_submitted(record) {
        warn!(%error, "notification collaborator failed");
    }
}

/// Result of an [`Wizard::advance`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// The step validated; the wizard moved to the next one.
    Advanced,
    /// The final step validated; the record is assembled and ready to
    /// submit.
    Completed,
    /// The step did not validate; the wizard stays put and the caller gets
    /// the full error map.
    Rejected(ValidationResult),
}

/// Whole-form completion counters for progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub step: usize,
    pub step_count: usize,
    pub answered: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Step(usize),
    Submitted,
}

/// State machine for one registration attempt.
///
/// The wizard owns the step cursor and the accumulated per-step state;
/// there is no state outside it. Step transitions build new [`StepState`]
/// values instead of mutating shared objects, so retreating and returning
/// restores exactly what was saved. A wizard that reaches `Submitted` is
/// finished; register again with a fresh instance.
#[derive(Debug, Clone)]
pub struct Wizard {
    form: FormSpec,
    cursor: Cursor,
    steps: Vec<StepState>,
    assembled: Option<SubmissionRecord>,
    in_flight: bool,
    last_errors: Option<ValidationResult>,
}

impl Wizard {
    /// Compiles the form definition and starts at the first step. A
    /// malformed definition is a config defect and fails here, before any
    /// user interaction.
    pub fn new(form: FormSpec) -> Result<Self, WizardError> {
        form.compile()?;
        let steps = form.steps.iter().map(|_| StepState::default()).collect();
        Ok(Self {
            form,
            cursor: Cursor::Step(0),
            steps,
            assembled: None,
            in_flight: false,
            last_errors: None,
        })
    }

    pub fn form(&self) -> &FormSpec {
        &self.form
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.cursor, Cursor::Submitted)
    }

    /// The step the user is currently on, or `None` once submitted.
    pub fn step(&self) -> Option<&StepSpec> {
        match self.cursor {
            Cursor::Step(index) => self.form.steps.get(index),
            Cursor::Submitted => None,
        }
    }

    /// State of the active step.
    pub fn state(&self) -> Option<&StepState> {
        match self.cursor {
            Cursor::Step(index) => self.steps.get(index),
            Cursor::Submitted => None,
        }
    }

    /// Error map from the most recent rejected advance, kept until the
    /// offending fields change or the step validates.
    pub fn errors(&self) -> Option<&ValidationResult> {
        self.last_errors.as_ref()
    }

    /// The assembled record awaiting submission, if the final step has
    /// passed.
    pub fn record(&self) -> Option<&SubmissionRecord> {
        self.assembled.as_ref()
    }

    /// Stores a value on the active step, then re-evaluates dependencies:
    /// fields whose dependency lapsed lose their value and their error
    /// markers, and every sub-record block is reconciled against its count
    /// field. A `null` value clears the field.
    pub fn set_value(&mut self, field: &str, value: Value) -> Result<(), WizardError> {
        let index = self.active_step_index()?;
        self.ensure_idle()?;
        if !self.form.steps[index]
            .fields
            .iter()
            .any(|spec| spec.id == field)
        {
            return Err(WizardError::FieldNotOnStep(field.to_string()));
        }

        self.assembled = None;
        let next = self.steps[index].with_value(field, value);
        self.steps[index] = next;
        self.normalize();
        self.discard_markers(field);
        debug!(field, step = %self.form.steps[index].id, "value updated");
        Ok(())
    }

    /// Stores a value on one live sub-record entry of the active step.
    /// Entries are addressed by block id and 1-based index, never by
    /// synthesized field names.
    pub fn set_entry_value(
        &mut self,
        schema_id: &str,
        entry_index: usize,
        field: &str,
        value: Value,
    ) -> Result<(), WizardError> {
        let index = self.active_step_index()?;
        self.ensure_idle()?;
        let schema = self.form.steps[index]
            .sub_records
            .iter()
            .find(|schema| schema.id == schema_id)
            .ok_or_else(|| WizardError::UnknownBlock(schema_id.to_string()))?;
        if !schema.fields.iter().any(|spec| spec.id == field) {
            return Err(WizardError::UnknownEntryField {
                schema: schema_id.to_string(),
                field: field.to_string(),
            });
        }

        let state = &mut self.steps[index];
        let entry = state
            .sub_records
            .get_mut(schema_id)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|entry| entry.index == entry_index)
            })
            .ok_or(WizardError::UnknownEntry {
                schema: schema_id.to_string(),
                index: entry_index,
            })?;

        if value.is_null() {
            entry.values.remove(field);
        } else {
            entry.values.insert(field.to_string(), value);
        }
        self.assembled = None;
        Ok(())
    }

    /// Validates the active step. On success the wizard moves forward, and
    /// on the final step it assembles the submission record. On failure it
    /// stays put and hands back every offending field.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, WizardError> {
        let index = self.active_step_index()?;
        self.ensure_idle()?;

        let prior = self.values_before(index);
        let result = validate_step(&self.form, &self.form.steps[index], &self.steps[index], &prior);
        if !result.valid {
            debug!(
                step = %self.form.steps[index].id,
                offending = result.reasons().len(),
                "step rejected"
            );
            self.last_errors = Some(result.clone());
            return Ok(AdvanceOutcome::Rejected(result));
        }

        self.last_errors = None;
        if index + 1 < self.form.steps.len() {
            self.cursor = Cursor::Step(index + 1);
            debug!(step = %self.form.steps[index + 1].id, "advanced");
            return Ok(AdvanceOutcome::Advanced);
        }

        let record = assemble(&self.form, &self.steps)?;
        self.assembled = Some(record);
        info!(form = %self.form.id, "registration complete, awaiting submission");
        Ok(AdvanceOutcome::Completed)
    }

    /// Moves back one step without validating. Previously saved values on
    /// the earlier step are restored, not blanked. Returns `false` when
    /// there is nowhere to go.
    pub fn retreat(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        match self.cursor {
            Cursor::Submitted | Cursor::Step(0) => false,
            Cursor::Step(index) => {
                self.assembled = None;
                self.last_errors = None;
                self.cursor = Cursor::Step(index - 1);
                true
            }
        }
    }

    /// Marks the start of a submission attempt and hands back the record
    /// to send. Only one attempt may be in flight per wizard; resolve it
    /// with [`Wizard::submission_failed`] or [`Wizard::submission_succeeded`].
    pub fn begin_submission(&mut self) -> Result<SubmissionRecord, WizardError> {
        if self.is_submitted() {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.in_flight {
            return Err(WizardError::SubmissionInFlight);
        }
        let record = self.assembled.clone().ok_or(WizardError::NotAssembled)?;
        self.in_flight = true;
        Ok(record)
    }

    /// Resolves the in-flight attempt as failed. The assembled record and
    /// all step state stay untouched, so a retry needs no re-entry and no
    /// re-validation.
    pub fn submission_failed(&mut self) {
        self.in_flight = false;
    }

    /// Resolves the in-flight attempt as succeeded. The wizard becomes
    /// `Submitted` and ownership of the record, stamped with the
    /// server-assigned id, moves to the caller.
    pub fn submission_succeeded(
        &mut self,
        id: impl Into<String>,
    ) -> Result<SubmissionRecord, WizardError> {
        if !self.in_flight {
            return Err(WizardError::NoSubmissionInFlight);
        }
        self.in_flight = false;
        let mut record = self.assembled.take().ok_or(WizardError::NotAssembled)?;
        record.id = Some(id.into());
        self.cursor = Cursor::Submitted;
        info!(form = %self.form.id, "registration submitted");
        Ok(record)
    }

    /// Drives one whole submission attempt against the persistence
    /// collaborator.
    pub fn submit_with(
        &mut self,
        store: &mut dyn RegistrationStore,
    ) -> Result<SubmissionRecord, WizardError> {
        let record = self.begin_submission()?;
        match store.submit(&record) {
            Ok(id) => self.submission_succeeded(id),
            Err(error) => {
                self.submission_failed();
                warn!(form = %self.form.id, %error, "submission attempt failed");
                Err(WizardError::Transport(error))
            }
        }
    }

    /// Whole-form completion counters: answered visible fields over all
    /// visible fields.
    pub fn progress(&self) -> Progress {
        let merged = self.merged_values();
        let active = intake_spec::evaluate(&self.form, &merged);
        let total = self
            .form
            .fields()
            .filter(|field| active.is_visible(&field.id))
            .count();
        let answered = self
            .form
            .fields()
            .filter(|field| active.is_visible(&field.id))
            .filter(|field| merged.get(&field.id).is_some_and(|value| !value.is_null()))
            .count();
        let (step, step_count) = match self.cursor {
            Cursor::Step(index) => (index + 1, self.form.steps.len()),
            Cursor::Submitted => (self.form.steps.len(), self.form.steps.len()),
        };
        Progress {
            step,
            step_count,
            answered,
            total,
        }
    }

    fn active_step_index(&self) -> Result<usize, WizardError> {
        match self.cursor {
            Cursor::Step(index) => Ok(index),
            Cursor::Submitted => Err(WizardError::AlreadySubmitted),
        }
    }

    fn ensure_idle(&self) -> Result<(), WizardError> {
        if self.in_flight {
            return Err(WizardError::SubmissionInFlight);
        }
        Ok(())
    }

    fn merged_values(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for state in &self.steps {
            for (key, value) in &state.values {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    fn values_before(&self, index: usize) -> Map<String, Value> {
        let mut merged = Map::new();
        for state in &self.steps[..index] {
            for (key, value) in &state.values {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Re-evaluates dependencies across all steps and keeps every
    /// sub-record block in lockstep with its count field.
    fn normalize(&mut self) {
        let merged = self.merged_values();
        let (cleaned, cleared) = clear_inactive(&self.form, &merged);
        if !cleared.is_empty() {
            for state in &mut self.steps {
                for id in &cleared {
                    state.values.remove(id);
                }
            }
            debug!(cleared = cleared.len(), "dependency clearing dropped stale values");
        }

        for (index, spec) in self.form.steps.iter().enumerate() {
            for schema in &spec.sub_records {
                let count = count_value(&cleaned, schema);
                let state = &mut self.steps[index];
                let next = reconcile(schema, state.entries(&schema.id), count);
                state.sub_records.insert(schema.id.clone(), next);
            }
        }
    }

    /// Drops stale error markers: the field just edited, plus any field
    /// whose dependency lapsed, must not keep blocking the step.
    fn discard_markers(&mut self, edited: &str) {
        if self.last_errors.is_none() {
            return;
        }
        let merged = self.merged_values();
        let active = intake_spec::evaluate(&self.form, &merged);
        let form = &self.form;
        let stale =
            |field: &str| field == edited || (form.field(field).is_some() && !active.is_visible(field));

        let Some(result) = self.last_errors.as_mut() else {
            return;
        };
        result.errors.retain(|error| !stale(&error.field));
        result.missing_required.retain(|field| !stale(field));
        result.valid = result.errors.is_empty() && result.missing_required.is_empty();
        if result.valid {
            self.last_errors = None;
        }
    }
}
