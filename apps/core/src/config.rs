//! Application settings loaded from the environment.
//!
//! Every value has a sensible default so the service boots with an empty
//! environment; the remote classifier simply stays disabled until an API key
//! is provided. Settings are built once in `main` and injected into the
//! components that need them.

use std::env;

/// Default upper bound on the text handed to the classifier, in characters.
const DEFAULT_MAX_CONTENT_LENGTH: usize = 10_000;

/// Default upper bound on uploaded files, in bytes (10 MB).
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Human-readable application name, used in health and root payloads.
    pub app_name: String,
    /// Application version, taken from the crate metadata.
    pub app_version: String,
    /// Address the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// Maximum number of characters classified per email.
    pub max_content_length: usize,
    /// Maximum accepted upload size in bytes.
    pub max_file_size: usize,
    /// API key for the remote classifier. `None` disables the remote path.
    pub openai_api_key: Option<String>,
    /// Model identifier sent to the remote classifier.
    pub openai_model: String,
    /// Override for the remote API base URL (used by tests and self-hosted
    /// gateways). Defaults to the public OpenAI endpoint.
    pub openai_base_url: Option<String>,
    /// Policy flag: attempt the remote classifier before the rule engine.
    pub use_openai: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "MailTriage Email Classifier API".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_base_url: None,
            use_openai: true,
        }
    }
}

impl Settings {
    /// Builds settings from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            app_name: env_or("APP_NAME", defaults.app_name),
            app_version: defaults.app_version,
            host: env_or("HOST", defaults.host),
            port: env_parsed("PORT", defaults.port),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .filter(|origins: &Vec<String>| !origins.is_empty())
                .unwrap_or(defaults.allowed_origins),
            max_content_length: env_parsed("MAX_CONTENT_LENGTH", defaults.max_content_length),
            max_file_size: env_parsed("MAX_FILE_SIZE", defaults.max_file_size),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_model: env_or("OPENAI_MODEL", defaults.openai_model),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|u| !u.is_empty()),
            use_openai: env_parsed("USE_OPENAI", defaults.use_openai),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
