//! Genius lyrics provider
//!
//! Lookup is two requests: an authenticated `/search` call to find the song,
//! then a plain GET of the song's public page, from which the lyric text is
//! scraped out of the `data-lyrics-container` blocks.

use super::http::{build_client, handle_error_response, read_json, read_text, send_error};
use super::LyricsProvider;
use crate::config::{GeniusConfig, ProviderConfig};
use crate::error::{RewriteError, RewriteResult};
use crate::logging::{log_debug, log_info};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;

const PROVIDER: &str = "genius";
const LYRICS_CONTAINER: &str = r#"div[data-lyrics-container="true"]"#;

// ============================================================================
// Search API types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSearchResponse {
    pub response: GeniusSearchBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSearchBody {
    #[serde(default)]
    pub hits: Vec<GeniusHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusHit {
    #[serde(rename = "type")]
    pub hit_type: String,
    pub result: GeniusSong,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusSong {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub primary_artist: GeniusArtist,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeniusArtist {
    pub name: String,
}

// ============================================================================
// Provider
// ============================================================================

/// Genius provider implementation
#[derive(Debug)]
pub struct GeniusProvider {
    http_client: reqwest::Client,
    config: GeniusConfig,
}

impl GeniusProvider {
    /// Create a new Genius provider.
    ///
    /// The API key is checked on the first lookup rather than here, so a
    /// pipeline that only rewrites manual input can be built without one.
    pub fn new(config: GeniusConfig) -> RewriteResult<Self> {
        log_debug!(
            provider = PROVIDER,
            has_api_key = config.api_key.is_some(),
            base_url = %config.base_url,
            "Creating Genius provider"
        );

        Ok(Self {
            http_client: build_client(PROVIDER, config.request_timeout())?,
            config,
        })
    }

    pub fn config(&self) -> &GeniusConfig {
        &self.config
    }

    /// Run the search query `"{title} {artist}"`.
    async fn search(&self, artist: &str, title: &str) -> RewriteResult<Vec<GeniusHit>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let query = format!("{title} {artist}");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_key().unwrap_or_default())
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, &url, e, self.config.request_timeout()))?;

        if !response.status().is_success() {
            return Err(handle_error_response(PROVIDER, response).await);
        }

        let body: GeniusSearchResponse = read_json(PROVIDER, response).await?;
        Ok(body.response.hits)
    }

    async fn fetch_page(&self, url: &str) -> RewriteResult<String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, url, e, self.config.request_timeout()))?;

        if !response.status().is_success() {
            return Err(handle_error_response(PROVIDER, response).await);
        }

        read_text(PROVIDER, response).await
    }
}

#[async_trait]
impl LyricsProvider for GeniusProvider {
    async fn fetch_lyrics(&self, artist: &str, title: &str) -> RewriteResult<String> {
        self.config.validate()?;

        let hits = self.search(artist, title).await?;
        let song = select_hit(&hits, artist)
            .ok_or_else(|| RewriteError::lyrics_not_found(artist, title))?;

        log_debug!(
            provider = PROVIDER,
            song_id = song.id,
            song_title = %song.title,
            song_artist = %song.primary_artist.name,
            url = %song.url,
            "Selected search hit"
        );

        let html = self.fetch_page(&song.url).await?;
        let lyrics = clean_lyrics(&extract_lyrics(&html));
        if lyrics.is_empty() {
            return Err(RewriteError::lyrics_not_found(artist, title));
        }

        log_info!(
            provider = PROVIDER,
            song_id = song.id,
            lyrics_len = lyrics.len(),
            "Fetched lyrics"
        );

        Ok(lyrics)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// ============================================================================
// Hit selection and page scraping
// ============================================================================

/// First song hit by `artist` (case-insensitive), else the first song hit.
pub fn select_hit<'a>(hits: &'a [GeniusHit], artist: &str) -> Option<&'a GeniusSong> {
    let wanted = artist.trim().to_lowercase();
    let mut songs = hits
        .iter()
        .filter(|hit| hit.hit_type == "song")
        .map(|hit| &hit.result);

    let first = songs.clone().next();
    songs
        .find(|song| song.primary_artist.name.trim().to_lowercase() == wanted)
        .or(first)
}

/// Text of every lyrics container on a song page, one container per line
/// group. Returns an empty string when the page has none.
pub fn extract_lyrics(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(LYRICS_CONTAINER) else {
        return String::new();
    };

    document
        .select(&selector)
        .map(|container| {
            let mut text = String::new();
            collect_text(container, &mut text);
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(el) if el.attr("data-exclude-from-selection") == Some("true") => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Strip page chrome that leaks into the container text: the
/// `"N Contributors… Lyrics"` header, inline "You might also like" blocks and
/// the trailing `"Embed"` marker.
pub fn clean_lyrics(raw: &str) -> String {
    let mut text = raw.to_string();

    if let Ok(regex) = Regex::new(r"(?s)^\s*\d*\s*Contributors?.*?Lyrics") {
        text = regex.replace(&text, "").into_owned();
    }
    if let Ok(regex) = Regex::new(r"You might also like") {
        text = regex.replace_all(&text, "").into_owned();
    }
    if let Ok(regex) = Regex::new(r"\d*\s*Embed\s*$") {
        text = regex.replace(&text, "").into_owned();
    }

    text.trim().to_string()
}
