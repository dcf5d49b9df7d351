use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// The CLI fails at startup if the API key is missing; library callers pass
/// the key directly to `LlmClient::new` instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Optional override for the email tagging pattern. Must be a valid
    /// regex; an invalid pattern surfaces as `ModelUnavailable`.
    pub email_pattern: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            email_pattern: std::env::var("RESUME_EMAIL_PATTERN").ok(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
