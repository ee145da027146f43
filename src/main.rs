use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use antdb::cli::Cli;
use antdb::dispatch;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = dispatch::run(&cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    Ok(())
}
