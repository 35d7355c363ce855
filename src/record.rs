//! Structured error records.
//!
//! An [`ErrorRecord`] captures one diagnostic event: what happened (`message`,
//! `code`), how it is classified (`category`, `subtype`, [`Level`]), when it was
//! observed and where it was raised. Records are immutable once built and can
//! be rendered four ways via [`ErrorRecord::render`]:
//!
//! | `for_user` | structured | Output |
//! |------------|------------|--------|
//! | `false` | `false` | full diagnostic line (ANSI colored) |
//! | `true`  | `false` | user summary line (ANSI colored) |
//! | `false` | `true`  | JSON object with all ten [`LogEntry`] keys |
//! | `true`  | `true`  | JSON object with `message, level, code, category, subtype` |
//!
//! The structured flag wins: when structured output is requested (explicitly or
//! through the record's own preference) the result is always JSON.
//!
//! # Example
//!
//! ```rust
//! use song_rewriter::{call_site, ErrorRecord};
//!
//! let record = ErrorRecord::builder("disk full", 28)
//!     .category("FileError")
//!     .subtype("ENOSPC")
//!     .level("CRITICAL")
//!     .call_site(call_site!())
//!     .build();
//!
//! assert!(!record.is_success());
//! assert!(record
//!     .render(true, Some(false))
//!     .contains("CRITICAL: disk full; of type FileError ENOSPC; Code: 28"));
//! ```

use crate::error::LogResult;
use crate::log_store::LogWriter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::path::Path;

pub const DEFAULT_SUBTYPE: &str = "UNKNOWN";
pub const DEFAULT_CATEGORY: &str = "GeneralError";

const RESET_COLOR: &str = "\x1b[0m";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// `Regex::new` only fails on invalid patterns; this one is fixed.
#[allow(clippy::unwrap_used)]
static FRAME_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+: ").unwrap());

// ============================================================================
// Level
// ============================================================================

/// Severity class of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Info, Level::Warning, Level::Error, Level::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Parse a level name, substituting `ERROR` for anything unrecognised.
    ///
    /// Matching is exact: `"info"` is not a level name.
    pub fn parse_lenient(name: &str) -> Level {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == name)
            .unwrap_or(Level::Error)
    }

    /// ANSI escape sequence used when rendering lines at this level.
    pub fn color(&self) -> &'static str {
        match self {
            Level::Info => "\x1b[92m",
            Level::Warning => "\x1b[93m",
            Level::Error => "\x1b[91m",
            Level::Critical => "\x1b[91;1m",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Level {
    fn from(name: &str) -> Self {
        Level::parse_lenient(name)
    }
}

impl From<String> for Level {
    fn from(name: String) -> Self {
        Level::parse_lenient(&name)
    }
}

// ============================================================================
// Call site
// ============================================================================

/// Where a record was raised.
///
/// Prefer the [`call_site!`](crate::call_site) macro, which captures the
/// enclosing function path. [`CallSite::caller`] only knows the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    function: String,
    line: i64,
}

impl CallSite {
    pub fn new(function: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            line: i64::from(line),
        }
    }

    /// Placeholder used when the call site cannot be determined.
    pub fn unknown() -> Self {
        Self {
            function: "Unknown".to_string(),
            line: -1,
        }
    }

    /// Source file and line of the caller.
    ///
    /// `#[track_caller]` exposes no function name, so `function` holds the
    /// caller's source file path. Use [`call_site!`](crate::call_site) for
    /// the enclosing fn.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    /// Build from a `type_name` path of a marker fn nested in the caller.
    #[doc(hidden)]
    pub fn from_type_path(path: &str, line: u32) -> Self {
        let mut function = path.strip_suffix("::__call_site_marker").unwrap_or(path);
        while let Some(stripped) = function.strip_suffix("::{{closure}}") {
            function = stripped;
        }
        Self::new(function, line)
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn line(&self) -> i64 {
        self.line
    }
}

/// Capture the enclosing function path and line as a [`CallSite`].
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __call_site_marker() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::record::CallSite::from_type_path(__type_name_of(__call_site_marker), line!())
    }};
}

// ============================================================================
// Structured forms
// ============================================================================

/// The ten-field structured form of a record.
///
/// Field order is the column order of CSV logs and the key order of JSON logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub script: String,
    pub function: String,
    pub line: i64,
    pub category: String,
    pub subtype: String,
    pub level: Level,
    pub code: i64,
    pub message: String,
    pub stack_trace: Option<String>,
}

/// Reduced structured form for end users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub message: String,
    pub level: Level,
    pub code: i64,
    pub category: String,
    pub subtype: String,
}

// ============================================================================
// ErrorRecord
// ============================================================================

/// One timestamped diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    message: String,
    code: i64,
    subtype: String,
    category: String,
    level: Level,
    timestamp: String,
    origin_script: String,
    origin_function: String,
    origin_line: i64,
    stack_trace: Option<String>,
    structured_output_requested: bool,
}

impl ErrorRecord {
    /// Record with default classification, attributed to the caller's file and line.
    ///
    /// `origin_function` is then the caller's source file path (for example
    /// `src/main.rs`), not a function name. Pass `call_site!()` through
    /// [`ErrorRecordBuilder::call_site`] to record the enclosing function.
    #[track_caller]
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self::builder(message, code).build()
    }

    pub fn builder(message: impl Into<String>, code: i64) -> ErrorRecordBuilder {
        ErrorRecordBuilder {
            message: message.into(),
            code,
            subtype: DEFAULT_SUBTYPE.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            level: Level::Error,
            capture_trace: false,
            trace_depth: None,
            prefer_structured_output: false,
            call_site: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn origin_script(&self) -> &str {
        &self.origin_script
    }

    pub fn origin_function(&self) -> &str {
        &self.origin_function
    }

    pub fn origin_line(&self) -> i64 {
        self.origin_line
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    pub fn structured_output_requested(&self) -> bool {
        self.structured_output_requested
    }

    /// `true` iff `code == 0`.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn to_entry(&self) -> LogEntry {
        LogEntry {
            timestamp: self.timestamp.clone(),
            script: self.origin_script.clone(),
            function: self.origin_function.clone(),
            line: self.origin_line,
            category: self.category.clone(),
            subtype: self.subtype.clone(),
            level: self.level,
            code: self.code,
            message: self.message.clone(),
            stack_trace: self.stack_trace.clone(),
        }
    }

    pub fn to_user_entry(&self) -> UserEntry {
        UserEntry {
            message: self.message.clone(),
            level: self.level,
            code: self.code,
            category: self.category.clone(),
            subtype: self.subtype.clone(),
        }
    }

    /// Render the record.
    ///
    /// `structured = None` falls back to the record's own preference. When the
    /// effective structured flag is set the output is JSON regardless of
    /// `for_user`; `for_user` then only chooses the reduced key set.
    pub fn render(&self, for_user: bool, structured: Option<bool>) -> String {
        let structured = structured.unwrap_or(self.structured_output_requested);
        match (structured, for_user) {
            (true, true) => serde_json::to_string(&self.to_user_entry()).unwrap_or_default(),
            (true, false) => serde_json::to_string(&self.to_entry()).unwrap_or_default(),
            (false, true) => self.user_summary(),
            (false, false) => self.full_diagnostic(),
        }
    }

    /// `"{level}: {message}; of type {category} {subtype}; Code: {code}"`, colored.
    pub fn user_summary(&self) -> String {
        format!(
            "{}{}: {}; of type {} {}; Code: {}{}",
            self.level.color(),
            self.level,
            self.message,
            self.category,
            self.subtype,
            self.code,
            RESET_COLOR
        )
    }

    /// Single bracketed diagnostic line, colored.
    pub fn full_diagnostic(&self) -> String {
        format!(
            "{}[Time: {}] [Script: {}] [Function: {}] [Line: {}] [Category: {}] [Subtype: {}] [Level: {}] Error {}: {}{}",
            self.level.color(),
            self.timestamp,
            self.origin_script,
            self.origin_function,
            self.origin_line,
            self.category,
            self.subtype,
            self.level,
            self.code,
            self.message,
            RESET_COLOR
        )
    }

    /// Append this record to `writer`'s log file.
    pub fn append_to_log(&self, writer: &LogWriter) -> LogResult<()> {
        writer.append(self)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_diagnostic())
    }
}

/// Builder for [`ErrorRecord`]; see [`ErrorRecord::builder`].
#[derive(Debug, Clone)]
pub struct ErrorRecordBuilder {
    message: String,
    code: i64,
    subtype: String,
    category: String,
    level: Level,
    capture_trace: bool,
    trace_depth: Option<usize>,
    prefer_structured_output: bool,
    call_site: Option<CallSite>,
}

impl ErrorRecordBuilder {
    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Accepts a [`Level`] or a level name; unknown names become `ERROR`.
    pub fn level(mut self, level: impl Into<Level>) -> Self {
        self.level = level.into();
        self
    }

    pub fn capture_trace(mut self, capture: bool) -> Self {
        self.capture_trace = capture;
        self
    }

    /// Keep only the most recent `depth` frames. `0` keeps the full trace.
    pub fn trace_depth(mut self, depth: usize) -> Self {
        self.trace_depth = Some(depth);
        self
    }

    pub fn prefer_structured_output(mut self, prefer: bool) -> Self {
        self.prefer_structured_output = prefer;
        self
    }

    pub fn call_site(mut self, site: CallSite) -> Self {
        self.call_site = Some(site);
        self
    }

    #[track_caller]
    pub fn build(self) -> ErrorRecord {
        // Called directly so `#[track_caller]` sees through to our caller.
        let site = match self.call_site {
            Some(site) => site,
            None => CallSite::caller(),
        };
        let stack_trace = if self.capture_trace {
            Some(capture_stack_trace(self.trace_depth))
        } else {
            None
        };

        ErrorRecord {
            message: self.message,
            code: self.code,
            subtype: self.subtype,
            category: self.category,
            level: self.level,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            origin_script: script_name(),
            origin_function: site.function,
            origin_line: site.line,
            stack_trace,
            structured_output_requested: self.prefer_structured_output,
        }
    }
}

fn script_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Unknown".to_string())
}

fn capture_stack_trace(depth: Option<usize>) -> String {
    let rendered = std::backtrace::Backtrace::force_capture().to_string();
    truncate_frames(&rendered, depth)
}

/// Symbols of the frames that capture the trace itself.
const CAPTURE_FRAMES: &[&str] = &[
    "std::backtrace",
    "std::sys::backtrace",
    "std::sys_common::backtrace",
    "core::bool::",
    "song_rewriter::record::capture_stack_trace",
    "song_rewriter::record::ErrorRecordBuilder::build",
    "song_rewriter::record::ErrorRecord::new",
];

fn is_capture_frame(frame: &str) -> bool {
    let header = frame.lines().next().unwrap_or_default();
    let symbol = FRAME_HEADER.replace(header, "");
    CAPTURE_FRAMES
        .iter()
        .any(|prefix| symbol.trim_start().starts_with(prefix))
}

/// Reorder a rendered backtrace most-recent-last and keep the last `depth` frames.
///
/// Innermost frames belonging to the capture machinery are dropped first, so
/// with any depth the newest kept frame is the code that built the record.
pub(crate) fn truncate_frames(rendered: &str, depth: Option<usize>) -> String {
    let mut frames: Vec<String> = Vec::new();
    for line in rendered.lines() {
        match frames.last_mut() {
            Some(frame) if !FRAME_HEADER.is_match(line) => {
                frame.push('\n');
                frame.push_str(line);
            }
            _ => frames.push(line.to_string()),
        }
    }
    let internal = frames.iter().take_while(|f| is_capture_frame(f)).count();
    frames.drain(..internal);
    frames.reverse();

    let keep = match depth {
        Some(depth) if depth > 0 => depth.min(frames.len()),
        _ => frames.len(),
    };
    let mut out = frames[frames.len() - keep..].join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
