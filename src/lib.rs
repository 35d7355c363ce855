//! # song-rewriter
//!
//! Rewrites song lyrics into technical prose, with a structured error log.
//!
//! ## Key Features
//!
//! - **Error records**: immutable, leveled diagnostic records with call-site
//!   capture, optional stack traces and four rendering styles
//! - **Append log**: JSON lines, CSV or text files with size-based rotation and
//!   serialized concurrent writers
//! - **Lyrics pipeline**: Genius lookup plus Together AI transformation into
//!   scientific, bureaucratic, engineering, military or medical prose
//! - **Two surfaces**: a CLI (`song-rewriter`) and a small web app
//!   (`song-rewriter-web`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use song_rewriter::{call_site, ErrorRecord, LockScope, LogTarget, LogWriter, LogFormat};
//!
//! # fn example() -> song_rewriter::LogResult<()> {
//! let writer = LogWriter::new(
//!     LogTarget::new("logs", "error.log", LogFormat::Json),
//!     LockScope::Process,
//! );
//!
//! let record = ErrorRecord::builder("disk full", 28)
//!     .category("FileError")
//!     .subtype("ENOSPC")
//!     .level("CRITICAL")
//!     .call_site(call_site!())
//!     .build();
//!
//! eprintln!("{}", record.render(true, None));
//! record.append_to_log(&writer)?;
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming)
pub mod logging;

pub mod cli;
pub mod cli_state;
pub mod config;
pub mod error;
pub mod log_store;
pub mod mode;
pub mod prompt;
pub mod providers;
pub mod record;
pub mod retry;
pub mod rewriter;
pub mod web;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use cli_state::CliState;
pub use config::{GeniusConfig, LogTarget, ProviderConfig, Settings, TogetherConfig};
pub use error::{
    ErrorCategory, ErrorSeverity, LogError, LogResult, RewriteError, RewriteResult,
};
pub use log_store::{backup_path, read_logs, LockScope, LogFormat, LogQuery, LogWriter};
pub use mode::Mode;
pub use providers::{GeniusProvider, LyricsProvider, TextTransformer, TogetherProvider};
pub use record::{CallSite, ErrorRecord, ErrorRecordBuilder, Level, LogEntry, UserEntry};
pub use retry::{RetryExecutor, RetryPolicy};
pub use rewriter::{LyricsSource, Rewrite, SongRewriter};
