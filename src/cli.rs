//! Command-line surface: argument definitions and the text printed around a run.

use crate::log_store::LogFormat;
use crate::mode::Mode;
use crate::record::Level;
use crate::rewriter::LyricsSource;
use clap::Parser;
use std::path::PathBuf;

pub const OUTPUT_HEADER: &str = "\nTechnical Prose Version:\n";
pub const USAGE_HINT: &str =
    "Please provide either a song title and artist or manual lyrics input.";

const EXAMPLES: &str = r#"Examples:
  song-rewriter --title "Song Title" --artist "Artist Name"
  song-rewriter --input "Here comes the sun (Doo-d-doo-doo)
Here comes the sun
And I say, \"It's alright\""
  song-rewriter -t "Bohemian Rhapsody" -a "Queen" -m bureaucratic"#;

/// Convert song lyrics into technical prose.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "song-rewriter",
    about = "Convert song lyrics into technical prose",
    disable_version_flag = true,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Song title for automatic lyrics lookup
    #[arg(short = 't', long)]
    pub title: Option<String>,

    /// Artist name for automatic lyrics lookup
    #[arg(short = 'a', long)]
    pub artist: Option<String>,

    /// Lyrics entered manually (takes precedence over --title/--artist)
    #[arg(short = 'i', long)]
    pub input: Option<String>,

    /// Transformation mode
    #[arg(short = 'm', long, value_enum, default_value_t = Mode::Scientific)]
    pub mode: Mode,

    /// Stop printing the banner on future runs
    #[arg(long, conflicts_with = "show_banner")]
    pub no_banner: bool,

    /// Print the banner again on future runs
    #[arg(long)]
    pub show_banner: bool,

    /// Print version information and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Directory for the error log (overrides SONG_REWRITER_LOG_DIR)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print logged errors instead of rewriting anything
    #[arg(long)]
    pub show_logs: bool,

    /// Only show logged errors at this level (with --show-logs)
    #[arg(long, value_name = "LEVEL", requires = "show_logs", value_parser = parse_level)]
    pub log_level: Option<Level>,
}

fn parse_level(value: &str) -> Result<Level, String> {
    Level::ALL
        .into_iter()
        .find(|level| level.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| {
            format!("unknown level '{value}' (expected INFO, WARNING, ERROR or CRITICAL)")
        })
}

impl Cli {
    /// `--input` wins; otherwise both title and artist are needed.
    ///
    /// Whitespace-only input still selects manual lyrics so the rewriter
    /// rejects it as empty. Only an absent or zero-length `--input` falls back.
    pub fn lyrics_source(&self) -> Option<LyricsSource> {
        if let Some(input) = self.input.as_deref().filter(|s| !s.is_empty()) {
            return Some(LyricsSource::Manual(input.to_string()));
        }
        let title = self.title.as_deref().filter(|s| !s.trim().is_empty())?;
        let artist = self.artist.as_deref().filter(|s| !s.trim().is_empty())?;
        Some(LyricsSource::Song {
            artist: artist.to_string(),
            title: title.to_string(),
        })
    }
}

pub fn version_text() -> String {
    format!("song-rewriter {}", env!("CARGO_PKG_VERSION"))
}

pub fn banner() -> String {
    format!(
        r#"
  ____                      ____      __        __    _ _
 / ___|  ___  _ __   __ _  |  _ \ ___ \ \      / / __(_) |_ ___ _ __
 \___ \ / _ \| '_ \ / _` | | |_) / _ \ \ \ /\ / / '__| | __/ _ \ '__|
  ___) | (_) | | | | (_| | |  _ <  __/  \ V  V /| |  | | ||  __/ |
 |____/ \___/|_| |_|\__, | |_| \_\___|   \_/\_/ |_|  |_|\__\___|_|
                    |___/
  Convert song lyrics into technical prose            v{}
"#,
        env!("CARGO_PKG_VERSION")
    )
}

pub fn welcome() -> &'static str {
    "Welcome to SongReWriter!\n\
     Fetch a song with --title and --artist, or paste lyrics with --input.\n\
     Pick a register with --mode, and hide this banner with --no-banner.\n"
}

/// Heading printed above `--show-logs` output.
pub fn log_listing_header(path: &std::path::Path, format: LogFormat) -> String {
    format!("Error log: {} ({format})", path.display())
}
