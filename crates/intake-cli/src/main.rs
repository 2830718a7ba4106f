use anyhow::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    intake_cli::cli::main()
}
