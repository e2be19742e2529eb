//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_VAR: &str = "MARKET_UPDATE_LOG_FORMAT";

/// Initialize the tracing subscriber
///
/// Filtering follows `RUST_LOG` (default `info`). Output is human-readable unless
/// `MARKET_UPDATE_LOG_FORMAT=json`. Calling this more than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(LOG_FORMAT_VAR)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
