use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mysql_mcp_gateway::{app, config::AppConfig, AppState};

#[derive(Parser)]
#[command(name = "mysql-mcp-gateway", version, about = "MySQL MCP Web Server")]
struct Cli {
    #[arg(long, help = "Listen address (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Load environment from this file instead of ./.env")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env first so RUST_LOG and the database settings can live there
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()
        .context("invalid configuration")?
        .with_overrides(cli.host, cli.port);

    tracing::info!(
        "Using MySQL database {} at {}:{}",
        config.database.name,
        config.database.host,
        config.database.port
    );

    let app = app(AppState::from_config(&config));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("MySQL MCP gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
