use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heatshield_mcp::config;
use heatshield_mcp::service::HeatAdvisor;

/// Heat-stress risk advisory over MCP (stdio)
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// TOML config file (defaults to ./heatshield.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the advisory backend
    #[arg(long)]
    api_base_url: Option<String>,
    /// File the assessment history is kept in
    #[arg(long)]
    history_path: Option<PathBuf>,
    /// Skip the pacing delays between stages
    #[arg(long)]
    no_pacing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heatshield_mcp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    if let Some(path) = args.history_path {
        settings.history_path = path;
    }
    if args.no_pacing {
        settings.stage_pacing = false;
    }

    tracing::info!(
        "Starting HeatShield advisory server (backend {}, history {})",
        settings.api_base_url,
        settings.history_path.display()
    );

    let advisor = HeatAdvisor::new(&settings)?;
    let server = advisor.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
