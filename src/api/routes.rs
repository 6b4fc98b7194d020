use std::sync::Arc;

use axum::{
	extract::State,
	http::{header, Uri},
	response::{IntoResponse, Response},
	Json,
};
use tracing::{info, warn};

use super::AppState;
use crate::{
	aggregate::{store_aprs, AGGREGATE_KEY},
	error::{AppError, AppResult},
	protocols::AprSource,
};

/// Shared-cache lifetime of the aggregate, one refresh interval.
const AGGREGATE_MAX_AGE_SECONDS: u32 = 600;

/// Dispatches on the raw, still percent-encoded path. Only an exact source
/// name after the leading slash fetches fresh; anything else is cached.
pub async fn source_or_cached(State(state): State<AppState>, uri: Uri) -> AppResult<Response> {
	let name = uri.path().strip_prefix('/').unwrap_or_default();
	match state.sources.get(name) {
		Some(source) => source_aprs(state, source).await,
		None => cached_aprs(State(state)).await,
	}
}

async fn source_aprs(state: AppState, source: Arc<dyn AprSource>) -> AppResult<Response> {
	let name = source.name().to_string();
	let aprs = source.fetch().await.map_err(|e| {
		warn!(source = %name, error = %e, "on-demand fetch failed");
		AppError::Upstream(format!("{}: {}", name, e))
	})?;
	if aprs.is_empty() {
		return Err(AppError::NotFound);
	}

	let store = state.store.clone();
	let snapshot = aprs.clone();
	let task_source = name.clone();
	tokio::spawn(async move {
		if let Err(e) = store_aprs(store.as_ref(), &snapshot).await {
			warn!(source = %task_source, error = %e, "failed to store aprs");
		}
	});

	info!(source = %name, keys = aprs.len(), "served fresh aprs");
	Ok(([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(aprs)).into_response())
}

pub async fn cached_aprs(State(state): State<AppState>) -> AppResult<Response> {
	let body = state.store.get(AGGREGATE_KEY).await?.unwrap_or_else(|| "{}".to_string());
	let cache_control = format!("s-maxage={}", AGGREGATE_MAX_AGE_SECONDS);
	Ok((
		[
			(header::CONTENT_TYPE, "application/json".to_string()),
			(header::CACHE_CONTROL, cache_control),
			(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
		],
		body,
	)
		.into_response())
}
