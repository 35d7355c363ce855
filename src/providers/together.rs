//! Together AI text-transformation provider
//!
//! Sends one user message (see [`crate::prompt`]) to the OpenAI-compatible
//! `/v1/chat/completions` endpoint and returns the first choice's content.

use super::http::{
    build_auth_headers, build_client, handle_error_response, read_json, send_error,
};
use super::openai_shared::{OpenAIMessage, OpenAIRequest, OpenAIResponse};
use super::TextTransformer;
use crate::config::{ProviderConfig, TogetherConfig};
use crate::error::{RewriteError, RewriteResult};
use crate::logging::log_debug;
use crate::mode::Mode;
use crate::prompt::build_prompt;
use crate::retry::RetryExecutor;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Instant;

const PROVIDER: &str = "together";

/// Together AI provider implementation
#[derive(Debug)]
pub struct TogetherProvider {
    http_client: reqwest::Client,
    retry_executor: RetryExecutor,
    headers: HeaderMap,
    config: TogetherConfig,
}

impl TogetherProvider {
    /// Create a new Together provider instance
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Configuration`] if:
    /// - API key is missing or not a valid header value
    /// - Base URL or model name is invalid
    /// - HTTP client initialization fails
    pub fn new(config: TogetherConfig) -> RewriteResult<Self> {
        log_debug!(
            provider = PROVIDER,
            has_api_key = config.api_key.is_some(),
            base_url = %config.base_url,
            default_model = %config.default_model,
            max_attempts = config.retry_policy.max_attempts,
            "Creating Together provider"
        );

        config.validate()?;
        let headers = build_auth_headers(PROVIDER, config.api_key().unwrap_or_default())?;

        Ok(Self {
            http_client: build_client(PROVIDER, config.request_timeout())?,
            retry_executor: RetryExecutor::new(config.retry_policy.clone()),
            headers,
            config,
        })
    }

    pub fn config(&self) -> &TogetherConfig {
        &self.config
    }

    /// Build the chat completion request for `lyrics` in `mode`.
    pub fn create_request(&self, lyrics: &str, mode: Mode) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.default_model.clone(),
            messages: vec![OpenAIMessage::user(build_prompt(lyrics, mode))],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send request with retry logic
    async fn send_request(&self, request: &OpenAIRequest) -> RewriteResult<OpenAIResponse> {
        let url = self.endpoint();
        self.retry_executor
            .execute(|| self.execute_single_request(&url, request))
            .await
    }

    /// Execute a single HTTP request
    async fn execute_single_request(
        &self,
        url: &str,
        request: &OpenAIRequest,
    ) -> RewriteResult<OpenAIResponse> {
        let response = self
            .http_client
            .post(url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, url, e, self.config.request_timeout()))?;

        if !response.status().is_success() {
            return Err(handle_error_response(PROVIDER, response).await);
        }

        read_json(PROVIDER, response).await
    }

    /// First choice's content
    fn parse_response(&self, response: OpenAIResponse) -> RewriteResult<String> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RewriteError::response_parsing(PROVIDER, "No choices in response"))?;

        if choice.message.content.trim().is_empty() {
            return Err(RewriteError::response_parsing(
                PROVIDER,
                "Response contained no text",
            ));
        }

        Ok(choice.message.content)
    }
}

#[async_trait]
impl TextTransformer for TogetherProvider {
    async fn transform(&self, lyrics: &str, mode: Mode) -> RewriteResult<String> {
        if lyrics.trim().is_empty() {
            return Err(RewriteError::EmptyInput);
        }

        let request = self.create_request(lyrics, mode);
        log_debug!(
            provider = PROVIDER,
            model = %request.model,
            mode = %mode,
            lyrics_len = lyrics.len(),
            "Executing transformation request"
        );

        let start_time = Instant::now();
        let response = self.send_request(&request).await?;
        let usage = response.usage.clone();

        let content = self.parse_response(response)?;

        log_debug!(
            provider = PROVIDER,
            duration_ms = start_time.elapsed().as_millis() as u64,
            prompt_tokens = usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = usage.as_ref().map(|u| u.completion_tokens),
            response_len = content.len(),
            "Transformation completed"
        );

        Ok(content)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
