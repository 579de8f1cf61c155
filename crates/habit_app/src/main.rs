use clap::Parser;
use habit_app::app::{run, AppConfig};
use habit_app::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().unwrap_or_default();
    config.apply_cli(&cli);
    if let Err(err) = run(config, cli.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
