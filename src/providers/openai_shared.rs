//! OpenAI-compatible chat completion structures
//!
//! Together AI speaks the OpenAI chat completion protocol, so these mirror the
//! subset of that schema the transformer needs.

use serde::{Deserialize, Serialize};

/// OpenAI-compatible message structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

impl OpenAIMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

/// Choice in OpenAI response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
}

/// Message in OpenAI response choice
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: String,
}

/// Usage information in OpenAI response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}
