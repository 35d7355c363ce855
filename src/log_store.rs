//! File-backed append log for [`ErrorRecord`]s.
//!
//! - One file per [`LogTarget`], written in JSON lines, CSV or plain text
//! - Size-triggered rotation to `<file>.<YYYYMMDD_HHMMSS>.bak`
//! - Appends serialized by a lock whose scope is chosen at construction
//! - JSON logs can be queried back with [`read_logs`]

use crate::config::LogTarget;
use crate::error::{LogError, LogResult, RewriteError};
use crate::logging::{log_debug, log_info, log_warn};
use crate::record::{CallSite, ErrorRecord, Level, LogEntry};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static PROCESS_LOCK: Lazy<Arc<Mutex<()>>> = Lazy::new(|| Arc::new(Mutex::new(())));
static PATH_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// ============================================================================
// Format
// ============================================================================

/// On-disk line format.
///
/// Parsing is lenient: `"json"` and `"csv"` select those formats, anything else
/// falls back to plain text. Plain text is named `"txt"` everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LogFormat {
    #[default]
    Json,
    Csv,
    #[serde(rename = "txt")]
    Text,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Csv => "csv",
            LogFormat::Text => "txt",
        }
    }
}

impl From<&str> for LogFormat {
    fn from(name: &str) -> Self {
        match name {
            "json" => LogFormat::Json,
            "csv" => LogFormat::Csv,
            _ => LogFormat::Text,
        }
    }
}

impl From<String> for LogFormat {
    fn from(name: String) -> Self {
        LogFormat::from(name.as_str())
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Lock scope
// ============================================================================

/// Which writers share a lock.
#[derive(Debug, Clone, Default)]
pub enum LockScope {
    /// Every writer in the process shares one lock.
    #[default]
    Process,
    /// Writers targeting the same file share a lock.
    PerPath,
    /// Caller-owned lock.
    Shared(Arc<Mutex<()>>),
}

/// Absolute, lexically normalised form of `path`: `.` segments are dropped and
/// `..` pops its parent. Symlinks are not resolved, so the key does not depend
/// on whether the log directory exists yet.
pub(crate) fn lock_key(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut key = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                key.pop();
            }
            other => key.push(other.as_os_str()),
        }
    }
    key
}

fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = lock_key(path);
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

// ============================================================================
// Writer
// ============================================================================

/// Appends records to one log target.
#[derive(Debug, Clone)]
pub struct LogWriter {
    target: LogTarget,
    lock: Arc<Mutex<()>>,
}

impl LogWriter {
    pub fn new(target: LogTarget, scope: LockScope) -> Self {
        let lock = match scope {
            LockScope::Process => Arc::clone(&PROCESS_LOCK),
            LockScope::PerPath => path_lock(&target.path()),
            LockScope::Shared(lock) => lock,
        };
        Self { target, lock }
    }

    pub fn target(&self) -> &LogTarget {
        &self.target
    }

    pub fn path(&self) -> PathBuf {
        self.target.path()
    }

    pub fn append(&self, record: &ErrorRecord) -> LogResult<()> {
        self.append_with(record, None)
    }

    /// Append `record`, first passing its structured form to `handler`.
    ///
    /// The handler runs under the writer lock, after any rotation and before
    /// the write. It cannot veto the write.
    pub fn append_with(
        &self,
        record: &ErrorRecord,
        handler: Option<&dyn Fn(&LogEntry)>,
    ) -> LogResult<()> {
        let entry = record.to_entry();

        fs::create_dir_all(&self.target.dir).map_err(|source| LogError::CreateDir {
            path: self.target.dir.clone(),
            source,
        })?;
        let path = self.path();

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.rotate_if_needed(&path)?;

        if let Some(handler) = handler {
            handler(&entry);
        }

        match self.target.format {
            LogFormat::Json => {
                let line = serde_json::to_string(&entry)?;
                let mut file = open_append(&path)?;
                writeln!(file, "{line}").map_err(|source| write_error(&path, source))?;
            }
            LogFormat::Csv => {
                let file_exists = path.is_file();
                let file = open_append(&path)?;
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(!file_exists)
                    .from_writer(file);
                writer.serialize(&entry).map_err(|source| LogError::Csv {
                    path: path.clone(),
                    source,
                })?;
                writer.flush().map_err(|source| write_error(&path, source))?;
            }
            LogFormat::Text => {
                let mut file = open_append(&path)?;
                writeln!(file, "{}", record.full_diagnostic())
                    .map_err(|source| write_error(&path, source))?;
            }
        }

        log_debug!(
            path = %path.display(),
            format = %self.target.format,
            level = %entry.level,
            code = entry.code,
            "Appended error record"
        );

        Ok(())
    }

    /// Persist a pipeline failure raised at `site` and hand back the record.
    ///
    /// A storage failure here is only logged: the caller is already reporting
    /// an error and should not lose it to a second one.
    pub fn record_failure(&self, error: &RewriteError, site: CallSite) -> ErrorRecord {
        let record = error.to_record(site);
        if let Err(e) = self.append(&record) {
            log_warn!(
                path = %self.path().display(),
                error = %e,
                original_error = %error,
                "Failed to persist error record"
            );
        }
        record
    }

    /// Query this writer's file. Only JSON logs can be read back.
    pub fn read(&self, query: &LogQuery) -> LogResult<Vec<LogEntry>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        read_logs(self.path(), self.target.format, query)
    }

    /// Rename the file aside if it has grown past the threshold.
    fn rotate_if_needed(&self, path: &Path) -> LogResult<Option<PathBuf>> {
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(LogError::Rotate {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if size <= self.target.rotate_size_bytes {
            return Ok(None);
        }

        let backup = backup_path(path, &chrono::Local::now());
        fs::rename(path, &backup).map_err(|source| LogError::Rotate {
            path: path.to_path_buf(),
            source,
        })?;

        log_info!(
            path = %path.display(),
            backup = %backup.display(),
            size_bytes = size,
            threshold_bytes = self.target.rotate_size_bytes,
            "Rotated error log"
        );

        Ok(Some(backup))
    }
}

/// `<path>.<YYYYMMDD_HHMMSS>.bak`
pub fn backup_path<Tz>(path: &Path, now: &chrono::DateTime<Tz>) -> PathBuf
where
    Tz: chrono::TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.bak", now.format(BACKUP_TIMESTAMP_FORMAT)));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> LogResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn write_error(path: &Path, source: io::Error) -> LogError {
    LogError::Write {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// Retrieval
// ============================================================================

/// Filters for [`read_logs`]. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub level: Option<Level>,
    pub category: Option<String>,
    pub subtype: Option<String>,
}

impl LogQuery {
    pub fn level(mut self, level: impl Into<Level>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.level.map_or(true, |level| entry.level == level)
            && self
                .category
                .as_deref()
                .map_or(true, |category| entry.category == category)
            && self
                .subtype
                .as_deref()
                .map_or(true, |subtype| entry.subtype == subtype)
    }
}

/// Read matching entries from a JSON log, in file order.
///
/// A missing file yields an empty list. Non-JSON formats are not readable and
/// also yield an empty list. Lines that fail to parse are skipped.
pub fn read_logs(
    path: impl AsRef<Path>,
    format: LogFormat,
    query: &LogQuery,
) -> LogResult<Vec<LogEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    if format != LogFormat::Json {
        log_warn!(
            path = %path.display(),
            format = %format,
            "Only JSON logs can be queried"
        );
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|source| LogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| LogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LogEntry>(&line) {
            Ok(entry) if query.matches(&entry) => entries.push(entry),
            Ok(_) => {}
            Err(e) => {
                log_warn!(
                    path = %path.display(),
                    line_number = index + 1,
                    error = %e,
                    "Skipping malformed log line"
                );
            }
        }
    }

    Ok(entries)
}
