use serde::Deserialize;

use crate::protocols::{celo_rpc::CELO_RPC_URL, moola::MOOLA_API_URL};
use crate::tasks::refresh::{REFRESH_INTERVAL_SECONDS, TOKENS_PER_BATCH};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStrategy {
	/// Fetch a time-derived batch of sources on every tick.
	#[default]
	Batch,
	/// Fetch one source per tick, following a cursor persisted in the store.
	Rotate,
}

impl RefreshStrategy {
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"batch" => Some(Self::Batch),
			"rotate" => Some(Self::Rotate),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
	pub host: String,
	pub port: u16,
	pub redis_url: Option<String>,
	pub store_namespace: String,
	pub subgraph_api_key: String,
	pub moola_api_url: String,
	pub celo_rpc_url: String,
	pub refresh_interval_seconds: u64,
	pub tokens_per_batch: usize,
	pub refresh_strategy: RefreshStrategy,
	pub http_timeout_seconds: u64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 8080,
			redis_url: None,
			store_namespace: "yield_tokens:".to_string(),
			subgraph_api_key: String::new(),
			moola_api_url: MOOLA_API_URL.to_string(),
			celo_rpc_url: CELO_RPC_URL.to_string(),
			refresh_interval_seconds: REFRESH_INTERVAL_SECONDS,
			tokens_per_batch: TOKENS_PER_BATCH,
			refresh_strategy: RefreshStrategy::Batch,
			http_timeout_seconds: 10,
		}
	}
}

impl AppConfig {
	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			host: std::env::var("HOST").unwrap_or(defaults.host),
			port: std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(defaults.port),
			redis_url: std::env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
			store_namespace: std::env::var("STORE_NAMESPACE").unwrap_or(defaults.store_namespace),
			subgraph_api_key: std::env::var("SUBGRAPH_API_KEY").unwrap_or_default(),
			moola_api_url: std::env::var("MOOLA_API_URL").unwrap_or(defaults.moola_api_url),
			celo_rpc_url: std::env::var("CELO_RPC_URL").unwrap_or(defaults.celo_rpc_url),
			refresh_interval_seconds: std::env::var("REFRESH_INTERVAL_SECONDS")
				.ok()
				.and_then(|v| v.parse().ok())
				.filter(|v| *v > 0)
				.unwrap_or(defaults.refresh_interval_seconds),
			tokens_per_batch: std::env::var("TOKENS_PER_BATCH")
				.ok()
				.and_then(|v| v.parse().ok())
				.filter(|v| *v > 0)
				.unwrap_or(defaults.tokens_per_batch),
			refresh_strategy: std::env::var("REFRESH_STRATEGY")
				.ok()
				.and_then(|v| RefreshStrategy::parse(&v))
				.unwrap_or(defaults.refresh_strategy),
			http_timeout_seconds: std::env::var("HTTP_TIMEOUT_SECONDS")
				.ok()
				.and_then(|v| v.parse().ok())
				.filter(|v| *v > 0)
				.unwrap_or(defaults.http_timeout_seconds),
		}
	}
}
