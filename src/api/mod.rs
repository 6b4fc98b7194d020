use std::sync::Arc;

use axum::{routing::any, Router};
use tower_http::trace::TraceLayer;

use crate::{config::AppConfig, protocols::SourceRegistry, store::KvStore};

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub sources: SourceRegistry,
    pub cfg: AppConfig,
}

/// `/<source>` fetches that source fresh; every other path serves the
/// cached aggregate. Source names are matched in the fallback on the raw
/// path, so no path extractor can reject a request first.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(routes::cached_aprs))
        .fallback(routes::source_or_cached)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
