use anyhow::Context;
use clap::Parser;
use dominant_colors::{load_config, setup_logging, Cli, Pipeline};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    info!("Starting dominant-colors v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config(&args).await.context("Invalid configuration")?;

    let pipeline = Pipeline::with_http(config)?;

    let summary = pipeline
        .run_until(shutdown_signal())
        .await
        .context("Pipeline failed")?;

    if summary.interrupted {
        warn!("Interrupted before the input was exhausted");
    }

    info!("dominant-colors stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received interrupt"),
        Err(e) => {
            error!("Cannot listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
