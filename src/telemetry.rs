use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Used when `RUST_LOG` is unset or invalid. Request spans from the
/// `TraceLayer` are only emitted at debug.
const DEFAULT_FILTER: &str = "info,tower_http=debug";

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer().with_target(false).with_level(true);
    let subscriber = Registry::default().with(env_filter).with(fmt_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}
