use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trendswipe::app::AppContext;
use trendswipe::cli::{commands, Cli, Commands};
use trendswipe::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Serve { .. } => {
            commands::serve(&ctx).await?;
        }
        Commands::Build { json } => {
            commands::build(&ctx, json).await?;
        }
        Commands::Sources => {
            commands::list_sources(&ctx)?;
        }
    }

    Ok(())
}
