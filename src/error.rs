//! Error types for song-rewriter.
//!
//! Two families live here:
//!
//! - [`LogError`] covers the append log: directory creation, opening, rotating,
//!   writing and reading log files. These always propagate to the caller.
//! - [`RewriteError`] covers the lyric pipeline: configuration problems, the
//!   lyrics provider and the text-transformation provider. Every variant can be
//!   turned into an [`ErrorRecord`](crate::record::ErrorRecord) with
//!   [`RewriteError::to_record`] so the surface can persist it.
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use song_rewriter::{call_site, LogWriter, RewriteError};
//!
//! fn report(err: RewriteError, writer: &LogWriter) -> song_rewriter::LogResult<()> {
//!     if err.is_retryable() {
//!         eprintln!("temporary problem: {err}");
//!     }
//!     println!("Error: {}", err.user_message());
//!     err.to_record(call_site!()).append_to_log(writer)
//! }
//! ```

use crate::logging::{log_error, log_warn};
use crate::record::{CallSite, ErrorRecord, Level};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Expected outcomes such as a song that does not exist.
    BusinessLogic,

    /// External service failures (Genius, Together, network).
    External,

    /// The caller made a mistake they can fix (missing key, empty input).
    Client,

    /// Temporary failures that should be retried.
    Transient,
}

/// Severity level for logging and alerting decisions.
///
/// Maps one-to-one onto the record [`Level`] enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Critical,
    Error,
    Warning,
    Info,
}

impl From<ErrorSeverity> for Level {
    fn from(severity: ErrorSeverity) -> Self {
        match severity {
            ErrorSeverity::Critical => Level::Critical,
            ErrorSeverity::Error => Level::Error,
            ErrorSeverity::Warning => Level::Warning,
            ErrorSeverity::Info => Level::Info,
        }
    }
}

// ============================================================================
// Log storage errors
// ============================================================================

/// Result alias for append-log operations.
pub type LogResult<T> = std::result::Result<T, LogError>;

/// Failures raised while persisting or reading the error log.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rotate log file {path}: {source}")]
    Rotate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize log entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write csv log row to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// ============================================================================
// Pipeline errors
// ============================================================================

/// Result alias for lyric fetching and transformation.
pub type RewriteResult<T> = std::result::Result<T, RewriteError>;

/// Errors that can occur while fetching or rewriting lyrics.
///
/// | Variant | Category | Retryable | Code |
/// |---------|----------|-----------|------|
/// | `Configuration` | Client | No | 10 |
/// | `LyricsNotFound` | BusinessLogic | No | 20 |
/// | `RequestFailed` | External | Yes | 30 |
/// | `ResponseParsing` | External | No | 31 |
/// | `RateLimitExceeded` | Transient | Yes | 32 |
/// | `Timeout` | Transient | Yes | 33 |
/// | `AuthenticationFailed` | Client | No | 34 |
/// | `EmptyInput` | Client | No | 40 |
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Configuration is invalid or incomplete (usually a missing API key).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The lyrics provider had no matching song.
    #[error("Song not found: {title} by {artist}")]
    LyricsNotFound { artist: String, title: String },

    /// The HTTP request to a provider failed.
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        provider: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider answered but the body could not be understood.
    #[error("{provider} response parsing failed: {message}")]
    ResponseParsing {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        provider: &'static str,
        retry_after_seconds: u64,
    },

    #[error("Request timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    #[error("{provider} authentication failed: {message}")]
    AuthenticationFailed {
        provider: &'static str,
        message: String,
    },

    /// Nothing to transform.
    #[error("No lyrics supplied")]
    EmptyInput,
}

impl RewriteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Client,
            Self::LyricsNotFound { .. } => ErrorCategory::BusinessLogic,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::ResponseParsing { .. } => ErrorCategory::External,
            Self::RateLimitExceeded { .. } => ErrorCategory::Transient,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
            Self::EmptyInput => ErrorCategory::Client,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration { .. } => ErrorSeverity::Critical,
            Self::LyricsNotFound { .. } => ErrorSeverity::Info,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::ResponseParsing { .. } => ErrorSeverity::Warning,
            Self::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::AuthenticationFailed { .. } => ErrorSeverity::Error,
            Self::EmptyInput => ErrorSeverity::Info,
        }
    }

    /// Whether the retry executor should try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } | Self::RequestFailed { .. }
        )
    }

    /// Stable numeric code written to the error log. Never `0`.
    pub fn code(&self) -> i64 {
        match self {
            Self::Configuration { .. } => 10,
            Self::LyricsNotFound { .. } => 20,
            Self::RequestFailed { .. } => 30,
            Self::ResponseParsing { .. } => 31,
            Self::RateLimitExceeded { .. } => 32,
            Self::Timeout { .. } => 33,
            Self::AuthenticationFailed { .. } => 34,
            Self::EmptyInput => 40,
        }
    }

    /// Coarse classification used as the record category.
    pub fn record_category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "ConfigurationError",
            Self::LyricsNotFound { .. } => "LyricsError",
            Self::EmptyInput => "InputError",
            _ => "ProviderError",
        }
    }

    /// Fine-grained classification used as the record subtype.
    pub fn record_subtype(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION",
            Self::LyricsNotFound { .. } => "NOT_FOUND",
            Self::RequestFailed { .. } => "REQUEST_FAILED",
            Self::ResponseParsing { .. } => "RESPONSE_PARSING",
            Self::RateLimitExceeded { .. } => "RATE_LIMITED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::AuthenticationFailed { .. } => "AUTHENTICATION",
            Self::EmptyInput => "EMPTY_INPUT",
        }
    }

    /// Message that is safe to show to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message } => format!("Setup problem: {message}"),
            Self::LyricsNotFound { .. } => "Song not found".to_string(),
            Self::RequestFailed { provider, .. } => {
                format!("Unable to reach {provider}. Please try again")
            }
            Self::ResponseParsing { provider, .. } => {
                format!("Received an invalid response from {provider}")
            }
            Self::RateLimitExceeded {
                retry_after_seconds,
                ..
            } => {
                format!("Service is busy. Please wait {retry_after_seconds} seconds and try again")
            }
            Self::Timeout { .. } => "Request timed out. Please try again".to_string(),
            Self::AuthenticationFailed { provider, .. } => {
                format!("Authentication with {provider} failed. Please check your API key")
            }
            Self::EmptyInput => "Please provide some lyrics to transform".to_string(),
        }
    }

    /// Build an error record describing this failure at `site`.
    pub fn to_record(&self, site: CallSite) -> ErrorRecord {
        ErrorRecord::builder(self.to_string(), self.code())
            .category(self.record_category())
            .subtype(self.record_subtype())
            .level(Level::from(self.severity()))
            .call_site(site)
            .build()
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration",
            message = %message,
            "Configuration validation failed"
        );
        Self::Configuration { message }
    }

    pub fn lyrics_not_found(artist: impl Into<String>, title: impl Into<String>) -> Self {
        let artist = artist.into();
        let title = title.into();
        log_warn!(
            error_type = "lyrics_not_found",
            artist = %artist,
            title = %title,
            "No lyrics found for song"
        );
        Self::LyricsNotFound { artist, title }
    }

    pub fn request_failed(
        provider: &'static str,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            provider = provider,
            message = %message,
            has_source = source.is_some(),
            "Provider request failed"
        );
        Self::RequestFailed {
            provider,
            message,
            source,
        }
    }

    pub fn response_parsing(provider: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing",
            provider = provider,
            message = %message,
            "Provider response format invalid"
        );
        Self::ResponseParsing { provider, message }
    }

    pub fn rate_limit_exceeded(provider: &'static str, retry_after_seconds: u64) -> Self {
        log_warn!(
            error_type = "rate_limit_exceeded",
            provider = provider,
            retry_after_seconds = retry_after_seconds,
            "Provider rate limit exceeded"
        );
        Self::RateLimitExceeded {
            provider,
            retry_after_seconds,
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Provider request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn authentication_failed(provider: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            provider = provider,
            message = %message,
            "Provider authentication failed"
        );
        Self::AuthenticationFailed { provider, message }
    }
}
