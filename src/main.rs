mod cli;
mod commands;
mod config;
mod import;
mod model;
mod query;
mod ranking;
mod render;
mod source;

pub const USER_AGENT: &str = concat!("spacebio/", env!("CARGO_PKG_VERSION"));

use clap::Parser;
use cli::Cli;
use commands::App;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spacebio=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    debug!("starting spacebio");

    let output = App::new()?
        .run(cli.command)
        .await
        .inspect_err(|e| tracing::error!("command failed: {e}"))?;

    print!("{output}");
    Ok(())
}
