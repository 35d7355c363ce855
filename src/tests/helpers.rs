// Shared helpers for unit tests

use crate::config::LogTarget;
use crate::log_store::{LockScope, LogFormat, LogWriter};
use crate::record::{CallSite, ErrorRecord};
use crate::retry::RetryPolicy;
use std::path::Path;
use std::time::Duration;

/// Writer with its own lock so parallel tests never contend.
pub fn isolated_writer(dir: &Path, format: LogFormat) -> LogWriter {
    let file = format!("error.{}", format.as_str());
    LogWriter::new(
        LogTarget::new(dir, file, format),
        LockScope::Shared(Default::default()),
    )
}

pub fn record_at_level(message: &str, code: i64, level: &str) -> ErrorRecord {
    ErrorRecord::builder(message, code)
        .category("TestError")
        .subtype("UNIT")
        .level(level)
        .call_site(CallSite::new("tests::helpers", 1))
        .build()
}

/// Strip ANSI color sequences from rendered output.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

// Fast retry policy to prevent slow tests
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_millis(100),
    }
}
