//! Lyric rewriting pipeline
//!
//! [`SongRewriter`] ties a [`LyricsProvider`] to a [`TextTransformer`]. Both
//! surfaces (CLI and web) go through it so they share one code path for
//! fetching, validating and transforming.

use crate::config::Settings;
use crate::error::{RewriteError, RewriteResult};
use crate::logging::{log_debug, log_info};
use crate::mode::Mode;
use crate::providers::{GeniusProvider, LyricsProvider, TextTransformer, TogetherProvider};
use std::sync::Arc;
use std::time::Instant;

/// Where the lyrics come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsSource {
    /// Text supplied directly by the user
    Manual(String),
    /// Looked up through the lyrics provider
    Song { artist: String, title: String },
}

/// Result of one rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub lyrics: String,
    pub transformed: String,
    pub mode: Mode,
}

#[derive(Clone)]
pub struct SongRewriter {
    lyrics: Arc<dyn LyricsProvider>,
    transformer: Arc<dyn TextTransformer>,
}

impl std::fmt::Debug for SongRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SongRewriter")
            .field("lyrics", &self.lyrics.provider_name())
            .field("transformer", &self.transformer.provider_name())
            .finish()
    }
}

impl SongRewriter {
    pub fn new(lyrics: Arc<dyn LyricsProvider>, transformer: Arc<dyn TextTransformer>) -> Self {
        Self {
            lyrics,
            transformer,
        }
    }

    /// Genius for lookups, Together for transformation.
    ///
    /// # Errors
    ///
    /// Fails if the Together section of `settings` is invalid. The Genius key
    /// is only required once a song is actually looked up.
    pub fn from_settings(settings: &Settings) -> RewriteResult<Self> {
        let lyrics = GeniusProvider::new(settings.genius.clone())?;
        let transformer = TogetherProvider::new(settings.together.clone())?;
        Ok(Self::new(Arc::new(lyrics), Arc::new(transformer)))
    }

    pub async fn fetch_lyrics(&self, artist: &str, title: &str) -> RewriteResult<String> {
        if artist.trim().is_empty() || title.trim().is_empty() {
            return Err(RewriteError::EmptyInput);
        }
        self.lyrics.fetch_lyrics(artist.trim(), title.trim()).await
    }

    pub async fn rewrite_text(&self, lyrics: &str, mode: Mode) -> RewriteResult<String> {
        if lyrics.trim().is_empty() {
            return Err(RewriteError::EmptyInput);
        }
        self.transformer.transform(lyrics, mode).await
    }

    /// Fetch a song's lyrics and rewrite them.
    pub async fn rewrite_song(
        &self,
        artist: &str,
        title: &str,
        mode: Mode,
    ) -> RewriteResult<Rewrite> {
        let lyrics = self.fetch_lyrics(artist, title).await?;
        let transformed = self.rewrite_text(&lyrics, mode).await?;
        Ok(Rewrite {
            lyrics,
            transformed,
            mode,
        })
    }

    pub async fn rewrite(&self, source: &LyricsSource, mode: Mode) -> RewriteResult<Rewrite> {
        let start_time = Instant::now();
        log_debug!(
            source = match source {
                LyricsSource::Manual(_) => "manual",
                LyricsSource::Song { .. } => "song",
            },
            mode = %mode,
            "Starting rewrite"
        );

        let rewrite = match source {
            LyricsSource::Manual(lyrics) => Rewrite {
                lyrics: lyrics.clone(),
                transformed: self.rewrite_text(lyrics, mode).await?,
                mode,
            },
            LyricsSource::Song { artist, title } => self.rewrite_song(artist, title, mode).await?,
        };

        log_info!(
            mode = %mode,
            lyrics_len = rewrite.lyrics.len(),
            transformed_len = rewrite.transformed.len(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Rewrite completed"
        );

        Ok(rewrite)
    }
}
