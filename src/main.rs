use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

use school_roster::{config, db, server};

#[derive(Debug, Parser)]
#[command(author, version, about = "Serve classrooms and students over HTTP")]
struct Args {
    /// Path to YAML config file (defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file and BIND_ADDR
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut cfg = config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        cfg.server.bind_addr = bind;
    }
    cfg.validate_service()?;
    let bind_addr = cfg.bind_addr()?;

    let pool = db::init_pool(&cfg.database.url, cfg.pool_settings())?;
    // A failed migration leaves the service up; queries will report 5xx until the store recovers.
    db::initialize_or_log(&pool).await;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(%bind_addr, "starting school roster service");
    server::serve(listener, pool).await?;

    Ok(())
}
