use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use viral_quote_api::{app, config::AppConfig, state::AppState};

#[derive(Debug, Parser)]
#[command(name = "viral-quote-api", version, about = "Viral Quote Engine HTTP API")]
struct Args {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("viral_quote_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config: AppConfig = viral_quote_api::config::config().clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting Viral Quote API in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config).await?;
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
