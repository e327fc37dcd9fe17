use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskboard_api::{app, config::config, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "taskboard-api", version, about = "Personal task board API server")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides BIND_ADDR)
    #[arg(long)]
    bind: Option<String>,

    /// Keep users and tasks in process memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config();
    info!("Starting Taskboard API in {:?} mode", config.environment);

    let state = AppState::from_config(config, args.in_memory)?;

    let bind_addr = format!(
        "{}:{}",
        args.bind.as_deref().unwrap_or(&config.server.bind_addr),
        args.port.unwrap_or(config.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Taskboard API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
