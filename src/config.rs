use crate::error::{RewriteError, RewriteResult};
use crate::log_store::LogFormat;
use crate::logging::log_debug;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "error.log";
pub const DEFAULT_ROTATE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Trait for provider-specific configuration
pub trait ProviderConfig: Send + Sync + Debug {
    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Validate provider configuration
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Configuration`] if required fields (usually the
    /// API key) are missing or malformed.
    fn validate(&self) -> RewriteResult<()>;

    /// Get the base URL for API calls
    fn base_url(&self) -> &str;

    /// Get the API key if required
    fn api_key(&self) -> Option<&str>;

    /// Per-request timeout
    fn request_timeout(&self) -> Duration;
}

fn require_api_key(provider: &str, api_key: Option<&str>, env_var: &str) -> RewriteResult<()> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(RewriteError::configuration(format!(
            "{provider} API key is required (set {env_var})"
        ))),
    }
}

fn require_base_url(provider: &str, base_url: &str) -> RewriteResult<()> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(())
    } else {
        Err(RewriteError::configuration(format!(
            "{provider} base URL must start with http:// or https://, got '{base_url}'"
        )))
    }
}

/// Genius lyrics API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeniusConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for GeniusConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.genius.com".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ProviderConfig for GeniusConfig {
    fn provider_name(&self) -> &'static str {
        "genius"
    }

    fn validate(&self) -> RewriteResult<()> {
        require_api_key("Genius", self.api_key.as_deref(), "GENIUS_API_KEY")?;
        require_base_url("Genius", &self.base_url)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Together AI (OpenAI-compatible) chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogetherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub retry_policy: RetryPolicy,
}

impl Default for TogetherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.together.xyz".to_string(),
            default_model: "meta-llama/Llama-3.3-70B-Instruct-Turbo".to_string(),
            temperature: None,
            max_tokens: None,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl ProviderConfig for TogetherConfig {
    fn provider_name(&self) -> &'static str {
        "together"
    }

    fn validate(&self) -> RewriteResult<()> {
        require_api_key("Together", self.api_key.as_deref(), "TOGETHER_API_KEY")?;
        require_base_url("Together", &self.base_url)?;
        if self.default_model.trim().is_empty() {
            return Err(RewriteError::configuration("Together model name is required"));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        self.retry_policy.request_timeout
    }
}

/// Where and how error records are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTarget {
    pub dir: PathBuf,
    pub file: String,
    pub format: LogFormat,
    /// Files strictly larger than this are rotated before the next append.
    pub rotate_size_bytes: u64,
}

impl Default for LogTarget {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file: DEFAULT_LOG_FILE.to_string(),
            format: LogFormat::Json,
            rotate_size_bytes: DEFAULT_ROTATE_SIZE_BYTES,
        }
    }
}

impl LogTarget {
    pub fn new(dir: impl Into<PathBuf>, file: impl Into<String>, format: LogFormat) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
            format,
            ..Self::default()
        }
    }

    pub fn with_rotate_size(mut self, bytes: u64) -> Self {
        self.rotate_size_bytes = bytes;
        self
    }

    /// `dir/file`
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

/// Application-wide settings shared by the CLI and the web server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub genius: GeniusConfig,
    pub together: TogetherConfig,
    pub log: LogTarget,
    /// Listen address for the web server
    pub bind_addr: Option<String>,
}

impl Settings {
    /// Load settings from environment variables.
    /// This is the ONLY method that should access environment variables.
    ///
    /// Nothing is validated here: a manual-lyrics CLI run never needs the
    /// Genius key, so each provider validates its own section when built.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(api_key) = std::env::var("GENIUS_API_KEY") {
            settings.genius.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("GENIUS_BASE_URL") {
            settings.genius.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var("TOGETHER_API_KEY") {
            settings.together.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("TOGETHER_BASE_URL") {
            settings.together.base_url = base_url;
        }
        if let Ok(model) = std::env::var("TOGETHER_MODEL") {
            settings.together.default_model = model;
        }
        if let Ok(dir) = std::env::var("SONG_REWRITER_LOG_DIR") {
            settings.log.dir = PathBuf::from(dir);
        }
        if let Ok(format) = std::env::var("SONG_REWRITER_LOG_FORMAT") {
            settings.log.format = LogFormat::from(format);
        }
        if let Ok(bind_addr) = std::env::var("SONG_REWRITER_BIND") {
            settings.bind_addr = Some(bind_addr);
        }

        log_debug!(
            has_genius_key = settings.genius.api_key.is_some(),
            has_together_key = settings.together.api_key.is_some(),
            together_model = %settings.together.default_model,
            log_path = %settings.log.path().display(),
            log_format = %settings.log.format,
            "Settings loaded from environment"
        );

        settings
    }

    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Validate every provider section.
    pub fn validate(&self) -> RewriteResult<()> {
        self.genius.validate()?;
        self.together.validate()
    }
}
