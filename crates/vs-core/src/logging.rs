//! Structured-log contract initialization.
//!
//! One JSON object per line on stdout, matching the contract: `event`,
//! `level`, `timestamp`, `logger` (dotted; last segment is surfaced as the
//! `module` field by downstream collectors). Conversation content is only
//! ever emitted at DEBUG by callers, so it naturally stays out of production
//! logs unless `RUST_LOG` opts a module into DEBUG.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global structured-log subscriber. Safe to call once per
/// process; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(true)
        .try_init();
}
