use clap::Parser;
use medplan_app::app::{run, AppConfig, Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = AppConfig::from_env().and_then(|mut config| {
        config.apply_cli(&cli)?;
        run(config, cli.command.clone().unwrap_or(Command::Show))
    });
    if let Err(err) = result {
        eprintln!("medplan: {err:#}");
        std::process::exit(1);
    }
}
