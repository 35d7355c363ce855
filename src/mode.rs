//! Technical registers the lyrics can be rewritten into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Scientific,
    Bureaucratic,
    Engineering,
    Military,
    Medical,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Scientific,
        Mode::Bureaucratic,
        Mode::Engineering,
        Mode::Military,
        Mode::Medical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Scientific => "scientific",
            Mode::Bureaucratic => "bureaucratic",
            Mode::Engineering => "engineering",
            Mode::Military => "military",
            Mode::Medical => "medical",
        }
    }

    /// Capitalised name for display in the web form.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Scientific => "Scientific",
            Mode::Bureaucratic => "Bureaucratic",
            Mode::Engineering => "Engineering",
            Mode::Military => "Military",
            Mode::Medical => "Medical",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}', expected one of: scientific, bureaucratic, engineering, military, medical")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}
