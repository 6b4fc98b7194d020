//! The aggregated address → APR mapping persisted under [`AGGREGATE_KEY`].
//!
//! The store behind it allows roughly a thousand writes a day, so the
//! aggregate is only rewritten when a fetched value actually differs.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::store::{KvStore, StoreError};

/// Lowercase hex token address → APR in percent.
pub type Aprs = BTreeMap<String, f64>;

pub const AGGREGATE_KEY: &str = "all";

/// Reads the aggregate. Absent or malformed values read as empty.
pub async fn load_aggregate(store: &dyn KvStore) -> Result<Aprs, StoreError> {
    let Some(raw) = store.get(AGGREGATE_KEY).await? else {
        return Ok(Aprs::new());
    };
    match serde_json::from_str::<Aprs>(&raw) {
        Ok(aprs) => Ok(aprs),
        Err(e) => {
            warn!(error = %e, "stored aggregate is malformed, starting from empty");
            Ok(Aprs::new())
        }
    }
}

/// Merges `incoming` into `existing`. Returns true when any value was added
/// or changed.
pub fn merge_aprs(existing: &mut Aprs, incoming: &Aprs) -> bool {
    let mut changed = false;
    for (address, apr) in incoming {
        if !apr.is_finite() {
            warn!(address = %address, apr = %apr, "dropping non-finite apr");
            continue;
        }
        match existing.insert(address.clone(), *apr) {
            Some(previous) if previous == *apr => {}
            _ => changed = true,
        }
    }
    changed
}

/// Merges a snapshot into the stored aggregate, writing only on change.
/// Returns whether a write happened.
pub async fn store_aprs(store: &dyn KvStore, aprs: &Aprs) -> Result<bool, StoreError> {
    let mut all = load_aggregate(store).await?;
    if !merge_aprs(&mut all, aprs) {
        debug!(keys = aprs.len(), "aprs unchanged, skipping write");
        return Ok(false);
    }
    store.put(AGGREGATE_KEY, serde_json::to_string(&all)?).await?;
    info!(keys = all.len(), "aggregate updated");
    Ok(true)
}
