//! Test helper utilities for song-rewriter integration tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use song_rewriter::{GeniusConfig, RetryPolicy, TogetherConfig};
use std::time::Duration;
use wiremock::ResponseTemplate;

/// Genius config pointed at a mock server.
pub fn genius_config(base_url: String) -> GeniusConfig {
    GeniusConfig {
        api_key: Some("test-genius-key".to_string()),
        base_url,
        request_timeout: Duration::from_secs(5),
    }
}

/// Together config pointed at a mock server, with a fast retry policy.
pub fn together_config(base_url: String) -> TogetherConfig {
    TogetherConfig {
        api_key: Some("test-together-key".to_string()),
        base_url,
        default_model: "test-model".to_string(),
        temperature: None,
        max_tokens: None,
        retry_policy: RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            total_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        },
    }
}

pub fn chat_completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52 }
    }))
}

/// Genius search body with one song hit per `(id, artist, url)`.
pub fn genius_search(hits: &[(u64, &str, String)]) -> ResponseTemplate {
    let hits: Vec<serde_json::Value> = hits
        .iter()
        .map(|(id, artist, url)| {
            serde_json::json!({
                "index": "song",
                "type": "song",
                "result": {
                    "id": id,
                    "title": "Here Comes the Sun",
                    "url": url,
                    "primary_artist": { "id": 1, "name": artist }
                }
            })
        })
        .collect();

    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "meta": { "status": 200 },
        "response": { "hits": hits }
    }))
}

pub fn song_page(lyrics_html: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!(
            r#"<!DOCTYPE html><html><head><title>Song</title></head><body>
<div class="SongHeader">Here Comes the Sun</div>
<div data-lyrics-container="true">{lyrics_html}</div>
<div class="Footer">Footer</div>
</body></html>"#
        ))
}
