//! Lyrics and text-transformation providers
//!
//! - **genius**: song search + lyrics page scraping against the Genius API
//! - **together**: chat completion against Together AI's OpenAI-compatible API
//! - **openai_shared**: OpenAI-compatible request/response structures
//! - **http**: header construction and error mapping shared by both clients
//!
//! Both clients return typed [`RewriteError`](crate::error::RewriteError)s; it is
//! up to the caller whether a failure is persisted as an error record.

pub mod genius;
pub(crate) mod http;
pub mod openai_shared;
pub mod together;

use crate::error::RewriteResult;
use crate::mode::Mode;
use async_trait::async_trait;

pub use genius::GeniusProvider;
pub use together::TogetherProvider;

/// Source of song lyrics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Full lyric text for `title` by `artist`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::LyricsNotFound`](crate::error::RewriteError::LyricsNotFound)
    /// when the provider has no matching song.
    async fn fetch_lyrics(&self, artist: &str, title: &str) -> RewriteResult<String>;

    fn provider_name(&self) -> &'static str;
}

/// Rewrites text into a technical register.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextTransformer: Send + Sync {
    async fn transform(&self, lyrics: &str, mode: Mode) -> RewriteResult<String>;

    fn provider_name(&self) -> &'static str;
}
