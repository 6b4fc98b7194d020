use std::ops::Range;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::{
    aggregate::{store_aprs, Aprs},
    api::AppState,
    config::RefreshStrategy,
    protocols::AprSource,
};

pub const REFRESH_INTERVAL_SECONDS: u64 = 600;
pub const TOKENS_PER_BATCH: usize = 20;
/// Store key of the rotation cursor used by [`RefreshStrategy::Rotate`].
pub const CURSOR_KEY: &str = "next";

/// Slice of the source list that is due at `now_unix`. Consecutive intervals
/// walk through the batches and wrap around.
pub fn batch_range(now_unix: i64, interval_seconds: u64, total: usize, per_batch: usize) -> Range<usize> {
    if total == 0 {
        return 0..0;
    }
    let per_batch = per_batch.max(1);
    let batches = total.div_ceil(per_batch) as i64;
    let intervals = now_unix.div_euclid(interval_seconds.max(1) as i64);
    let offset = intervals.rem_euclid(batches) as usize * per_batch;
    offset..(offset + per_batch).min(total)
}

/// Fetches every source concurrently and merges the successes in order.
/// A failing source is logged and left out.
pub async fn fetch_all(sources: &[Arc<dyn AprSource>]) -> Aprs {
    let results = join_all(sources.iter().map(|s| async move { (s.name(), s.fetch().await) })).await;

    let mut merged = Aprs::new();
    for (name, result) in results {
        match result {
            Ok(aprs) => merged.extend(aprs),
            Err(e) => warn!(source = %name, error = %e, "source fetch failed"),
        }
    }
    merged
}

/// One batched refresh. Returns the merged snapshot.
pub async fn refresh_batch(state: &AppState, now_unix: i64) -> Aprs {
    let range = batch_range(
        now_unix,
        state.cfg.refresh_interval_seconds,
        state.sources.len(),
        state.cfg.tokens_per_batch,
    );
    let aprs = fetch_all(&state.sources.all()[range]).await;
    if !aprs.is_empty() {
        if let Err(e) = store_aprs(state.store.as_ref(), &aprs).await {
            warn!(error = %e, "failed to store refreshed aprs");
        }
    }
    aprs
}

/// Fetches the source under the persisted cursor and advances it.
pub async fn refresh_next(state: &AppState) -> anyhow::Result<Aprs> {
    let total = state.sources.len();
    if total == 0 {
        return Ok(Aprs::new());
    }

    let cursor = state
        .store
        .get(CURSOR_KEY)
        .await?
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0)
        % total;
    let source = &state.sources.all()[cursor];

    let aprs = match source.fetch().await {
        Ok(aprs) => aprs,
        Err(e) => {
            warn!(source = %source.name(), error = %e, "source fetch failed");
            Aprs::new()
        }
    };
    if !aprs.is_empty() {
        store_aprs(state.store.as_ref(), &aprs).await?;
    }

    state.store.put(CURSOR_KEY, ((cursor + 1) % total).to_string()).await?;
    Ok(aprs)
}

pub async fn refresh_once(state: &AppState) {
    match state.cfg.refresh_strategy {
        RefreshStrategy::Batch => {
            let now = time::OffsetDateTime::now_utc().unix_timestamp();
            let aprs = refresh_batch(state, now).await;
            info!(keys = aprs.len(), "batch refresh finished");
        }
        RefreshStrategy::Rotate => match refresh_next(state).await {
            Ok(aprs) => info!(keys = aprs.len(), "rotating refresh finished"),
            Err(e) => warn!(error = %e, "rotating refresh failed"),
        },
    }
}

/// Runs a refresh every interval. Each tick runs in its own task so a slow
/// upstream never holds up the schedule.
pub async fn run_refresh_scheduler(state: AppState) {
    let period = std::time::Duration::from_secs(state.cfg.refresh_interval_seconds.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        info!(strategy = ?state.cfg.refresh_strategy, sources = state.sources.len(), "refresh scheduler tick");
        let state = state.clone();
        tokio::spawn(async move { refresh_once(&state).await });
    }
}
