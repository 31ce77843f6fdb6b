use clap::Parser;
use empathy_configuration::{load_config, setup_logging};
use empathy_setup::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config()?;
    cli.apply_overrides(&mut config)?;
    setup_logging(&config);
    run(cli, config).await
}
