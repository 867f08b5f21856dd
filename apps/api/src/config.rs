use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub groq_api_key: String,
    /// Empty when unset: the secondary provider then has no credentials.
    pub gemini_api_key: String,
    pub disable_fallback: bool,
    pub port: u16,
    pub rust_log: String,
    pub analysis_workers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            groq_api_key: require_env("GROQ_API_KEY")?,
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            disable_fallback: parse_flag(std::env::var("STOP_GEMINI_FALLBACK").ok().as_deref()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analysis_workers: std::env::var("ANALYSIS_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("ANALYSIS_WORKERS must be a positive integer")?
                .max(1),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Only the literal `true` (any case) enables a flag.
fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
