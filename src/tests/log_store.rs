// Unit Tests for the Append Log
//
// UNIT UNDER TEST: LogWriter, read_logs, LogQuery, backup_path, lock_key
//
// BUSINESS RESPONSIBILITY:
//   - Appends error records to a file in JSON lines, CSV or text format
//   - Rotates the file aside once it grows past the configured size
//   - Reads JSON logs back, filtered by level, category and subtype
//   - Never loses a good entry because a neighbouring line is malformed
//
// TEST COVERAGE:
//   - N JSON appends produce N parseable lines in order
//   - CSV logs carry exactly one header row
//   - Text logs hold the full diagnostic line
//   - Rotation naming and the fresh file after rotation
//   - Query filters, missing files, malformed lines and non-JSON formats
//   - The pre-write handler sees the structured entry
//   - Per-path lock keys are normalised spellings of one file

use crate::config::LogTarget;
use crate::log_store::{
    backup_path, lock_key, read_logs, LockScope, LogFormat, LogQuery, LogWriter,
};
use crate::record::{Level, LogEntry};
use crate::tests::helpers::{isolated_writer, record_at_level, strip_ansi};
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

#[cfg(test)]
mod json_log_tests {
    use super::*;

    #[test]
    fn test_json_appends_one_line_per_record_in_order() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);

        // Act
        for code in 1..=4 {
            writer
                .append(&record_at_level(&format!("failure {code}"), code, "ERROR"))
                .unwrap();
        }

        // Assert
        let contents = fs::read_to_string(writer.path()).unwrap();
        let entries: Vec<LogEntry> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 4);
        let codes: Vec<i64> = entries.iter().map(|e| e.code).collect();
        assert_eq!(codes, [1, 2, 3, 4]);
        assert_eq!(entries[0].message, "failure 1");
        assert!(entries[0].stack_trace.is_none());
    }

    #[test]
    fn test_append_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("logs");
        let writer = isolated_writer(&nested, LogFormat::Json);

        record_at_level("first", 1, "INFO").append_to_log(&writer).unwrap();

        assert!(writer.path().is_file());
    }

    #[test]
    fn test_read_logs_filters_critical_entries_in_order() {
        // Test verifies 5 entries with 2 CRITICAL yield exactly those 2

        // Arrange
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);
        let levels = ["INFO", "CRITICAL", "ERROR", "CRITICAL", "WARNING"];
        for (i, level) in levels.iter().enumerate() {
            writer
                .append(&record_at_level(&format!("entry {i}"), i as i64 + 1, level))
                .unwrap();
        }

        // Act
        let critical = read_logs(
            writer.path(),
            LogFormat::Json,
            &LogQuery::default().level(Level::Critical),
        )
        .unwrap();

        // Assert
        let messages: Vec<&str> = critical.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["entry 1", "entry 3"]);
    }

    #[test]
    fn test_read_logs_filters_combine() {
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);
        writer.append(&record_at_level("a", 1, "ERROR")).unwrap();
        writer
            .append(
                &crate::record::ErrorRecord::builder("b", 2)
                    .category("NetError")
                    .subtype("TIMEOUT")
                    .build(),
            )
            .unwrap();

        let by_category = writer
            .read(&LogQuery::default().category("NetError"))
            .unwrap();
        let by_both = writer
            .read(&LogQuery::default().category("NetError").subtype("UNIT"))
            .unwrap();
        let everything = writer.read(&LogQuery::default()).unwrap();

        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].message, "b");
        assert!(by_both.is_empty());
        assert_eq!(everything.len(), 2);
    }

    #[test]
    fn test_read_logs_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();

        let entries = read_logs(
            dir.path().join("nothing.log"),
            LogFormat::Json,
            &LogQuery::default(),
        )
        .unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn test_read_logs_skips_malformed_and_blank_lines() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);
        writer.append(&record_at_level("good one", 1, "ERROR")).unwrap();
        let mut contents = fs::read_to_string(writer.path()).unwrap();
        contents.push_str("{not json\n\n");
        fs::write(writer.path(), contents).unwrap();
        writer.append(&record_at_level("good two", 2, "ERROR")).unwrap();

        // Act
        let entries = writer.read(&LogQuery::default()).unwrap();

        // Assert
        let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["good one", "good two"]);
    }

    #[test]
    fn test_read_logs_non_json_format_is_empty() {
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Csv);
        writer.append(&record_at_level("csv row", 1, "ERROR")).unwrap();

        let entries = writer.read(&LogQuery::default()).unwrap();

        assert!(entries.is_empty());
    }
}

#[cfg(test)]
mod csv_and_text_log_tests {
    use super::*;

    #[test]
    fn test_csv_has_exactly_one_header() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Csv);

        // Act
        for code in 1..=3 {
            writer
                .append(&record_at_level("row, with comma", code, "WARNING"))
                .unwrap();
        }

        // Assert
        let contents = fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "timestamp,script,function,line,category,subtype,level,code,message,stack_trace"
        );
        assert_eq!(contents.matches("timestamp,script").count(), 1);

        let mut reader = csv::Reader::from_path(writer.path()).unwrap();
        let rows: Vec<LogEntry> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].message, "row, with comma");
        assert_eq!(rows[2].level, Level::Warning);
    }

    #[test]
    fn test_text_log_holds_full_diagnostic() {
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Text);
        let record = record_at_level("plain", 7, "INFO");

        writer.append(&record).unwrap();

        let contents = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(contents, format!("{}\n", record.full_diagnostic()));
        assert!(strip_ansi(&contents).contains("Error 7: plain"));
    }

    #[test]
    fn test_format_names_are_lenient() {
        assert_eq!(LogFormat::from("json"), LogFormat::Json);
        assert_eq!(LogFormat::from("csv"), LogFormat::Csv);
        assert_eq!(LogFormat::from("txt"), LogFormat::Text);
        assert_eq!(LogFormat::from("yaml"), LogFormat::Text);
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_text_format_has_one_name() {
        // Arrange & Act
        let serialized = serde_json::to_string(&LogFormat::Text).unwrap();

        // Assert
        assert_eq!(serialized, format!("\"{}\"", LogFormat::Text));
        assert_eq!(serialized, "\"txt\"");
        let parsed: LogFormat = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, LogFormat::Text);
    }
}

#[cfg(test)]
mod rotation_tests {
    use super::*;

    #[test]
    fn test_backup_path_format() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 7))
            .unwrap()
            .and_utc();

        let backup = backup_path(std::path::Path::new("logs/error.log"), &now);

        assert_eq!(
            backup,
            std::path::PathBuf::from("logs/error.log.20240309_140507.bak")
        );
    }

    #[test]
    fn test_rotation_moves_oversized_file_aside() {
        // Test verifies the file is renamed once it exceeds the threshold
        // and the fresh file holds only the newest entry

        // Arrange
        let dir = TempDir::new().unwrap();
        let target = LogTarget::new(dir.path(), "error.log", LogFormat::Json).with_rotate_size(64);
        let writer = LogWriter::new(target, LockScope::Shared(Default::default()));
        writer.append(&record_at_level("old entry", 1, "ERROR")).unwrap();
        assert!(fs::metadata(writer.path()).unwrap().len() > 64);

        // Act
        writer.append(&record_at_level("new entry", 2, "ERROR")).unwrap();

        // Assert
        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("error.log.") && name.ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1, "found {backups:?}");
        let stamp = &backups[0]["error.log.".len()..backups[0].len() - ".bak".len()];
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").is_ok());

        let fresh = writer.read(&LogQuery::default()).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].message, "new entry");

        let rotated = fs::read_to_string(dir.path().join(&backups[0])).unwrap();
        assert!(rotated.contains("old entry"));
    }

    #[test]
    fn test_no_rotation_below_threshold() {
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);

        writer.append(&record_at_level("one", 1, "ERROR")).unwrap();
        writer.append(&record_at_level("two", 2, "ERROR")).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

#[cfg(test)]
mod handler_tests {
    use super::*;

    #[test]
    fn test_handler_receives_structured_entry_before_write() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);
        let record = record_at_level("observed", 11, "CRITICAL");
        let seen = Mutex::new(Vec::new());
        let path = writer.path();

        let handler = |entry: &LogEntry| {
            seen.lock().unwrap().push((entry.clone(), path.exists()));
        };

        // Act
        writer
            .append_with(&record, Some(&handler as &dyn Fn(&LogEntry)))
            .unwrap();

        // Assert
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, record.to_entry());
        assert!(!seen[0].1, "handler should run before the first write");
    }

    #[test]
    fn test_record_failure_persists_and_returns_record() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let writer = isolated_writer(dir.path(), LogFormat::Json);
        let error = crate::error::RewriteError::lyrics_not_found("Nobody", "Nothing");

        // Act
        let record = writer.record_failure(&error, crate::record::CallSite::new("web::lyrics", 3));

        // Assert
        assert_eq!(record.code(), 20);
        let entries = writer.read(&LogQuery::default()).unwrap();
        assert_eq!(entries, vec![record.to_entry()]);
    }
}

#[cfg(test)]
mod lock_key_tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_lock_key_ignores_current_dir_segments() {
        assert_eq!(
            lock_key(Path::new("logs/./error.log")),
            lock_key(Path::new("logs/error.log"))
        );
    }

    #[test]
    fn test_lock_key_resolves_parent_segments() {
        assert_eq!(
            lock_key(Path::new("logs/archive/../error.log")),
            lock_key(Path::new("logs/error.log"))
        );
    }

    #[test]
    fn test_lock_key_is_absolute() {
        assert!(lock_key(Path::new("logs/error.log")).is_absolute());
    }
}
