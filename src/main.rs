use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tracing::{info, warn};

use yield_aprs::{
	api::{router, AppState},
	config::AppConfig,
	protocols::default_sources,
	store::{KvStore, MemoryStore, RedisStore},
	tasks::refresh::run_refresh_scheduler,
	telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
	// Load environment variables from .env if present
	dotenv().ok();
	init_tracing();

	let cfg = AppConfig::from_env();

	let store: Arc<dyn KvStore> = match &cfg.redis_url {
		Some(url) => Arc::new(RedisStore::new(url, &cfg.store_namespace)?),
		None => {
			warn!("REDIS_URL not set, aprs are kept in memory only");
			Arc::new(MemoryStore::new())
		}
	};

	let http = reqwest::Client::builder()
		.timeout(Duration::from_secs(cfg.http_timeout_seconds))
		.build()?;
	let sources = default_sources(&cfg, http);

	let state = AppState { store, sources, cfg: cfg.clone() };
	tokio::spawn(run_refresh_scheduler(state.clone()));

	let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
	info!(%addr, sources = ?state.sources.names(), "starting server");
	axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

	Ok(())
}
