//! State the CLI keeps between invocations.

use crate::logging::{log_debug, log_warn};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "song-rewriter";
const STATE_FILE: &str = "config.json";

/// Persisted CLI preferences.
///
/// Missing fields take their defaults, so an older or hand-edited file still
/// loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliState {
    /// True until the welcome message has been shown once.
    pub first_run: bool,
    /// Whether the banner is printed before each run.
    pub show_banner: bool,
}

impl Default for CliState {
    fn default() -> Self {
        Self {
            first_run: true,
            show_banner: true,
        }
    }
}

impl CliState {
    /// `<config_dir>/song-rewriter/config.json`, or `./song-rewriter/config.json`
    /// when the platform has no config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(STATE_FILE)
    }

    /// Load state from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log_debug!(path = %path.display(), "No CLI state yet, using defaults");
                return Self::default();
            }
            Err(e) => {
                log_warn!(path = %path.display(), error = %e, "Failed to read CLI state");
                return Self::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            log_warn!(path = %path.display(), error = %e, "Corrupt CLI state, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Apply `--no-banner` / `--show-banner`. Returns whether anything changed.
    pub fn apply_banner_flags(&mut self, no_banner: bool, show_banner: bool) -> bool {
        let wanted = if no_banner {
            false
        } else if show_banner {
            true
        } else {
            return false;
        };
        let changed = self.show_banner != wanted;
        self.show_banner = wanted;
        changed
    }
}
