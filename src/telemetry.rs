//! Tracing initialization.
//!
//! Provides `init_tracing()` for console logging setup. Safe to call more
//! than once; only the first call installs the subscriber, so tests can all
//! call it unconditionally.

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize console tracing.
///
/// Respects `RUST_LOG`, defaulting to INFO. Statement logging gated by
/// [`crate::DebugFlag`] is emitted at DEBUG, so run with
/// `RUST_LOG=rowmap=debug` to see the SQL a session issues.
pub fn init_tracing() {
    INIT.call_once(|| {
        let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

        let fmt_layer = tracing_subscriber::fmt::layer();

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}
