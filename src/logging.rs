//! Logging utilities for song-rewriter
//!
//! Re-exports tracing macros with log_* naming convention for consistency.
//! Diagnostic tracing goes to stderr; persisted error records are handled by
//! [`crate::log_store`].

// Re-export tracing macros with log_* naming
pub use tracing::{
    debug as log_debug,
    error as log_error,
    info as log_info,
    trace as log_trace,
    warn as log_warn,
};

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber used by both binaries.
///
/// `RUST_LOG` takes precedence over `default_directive`. Calling this twice is
/// harmless; the second call is ignored.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
