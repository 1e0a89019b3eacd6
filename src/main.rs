use anyhow::{Context, Result};
use reqwest::Client;
use tourboard::{
    config::Config,
    dashboard::Board,
    fetch::HttpSource,
    history::FileMarkerStore,
    poller::Poller,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tourboard=info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = Config::load().context("loading configuration")?;
    info!(
        url = %config.source_url,
        interval = ?config.poll_interval,
        marker = %config.marker_path.display(),
        snapshot = %config.snapshot_path.display(),
        "configured"
    );

    // ─── 3) wire source, marker store and dashboard ──────────────────
    let source = HttpSource::new(Client::new(), config.source_url.clone());
    let store = FileMarkerStore::new(&config.marker_path)?;
    let board = Board::with_snapshot(&config.snapshot_path)?;

    let poller = Poller::new(source, store, board.dashboard()).with_delimiter(config.delimiter);

    // ─── 4) poll until Ctrl-C ────────────────────────────────────────
    let handle = poller.start(config.poll_interval);
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("shutting down");
    handle.stop().await?;

    info!("all done");
    Ok(())
}
