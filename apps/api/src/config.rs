use anyhow::{Context, Result};
use std::str::FromStr;

use crate::scoring::policy::{SHORTLIST_AUTO_SCORE, SHORTLIST_MIN_SCORE};

/// Application configuration loaded from environment variables.
/// Fails at startup if `DATABASE_URL` is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Absent disables the hosted-model academic fallback.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub llm_timeout_secs: u64,
    pub shortlist_min_score: f64,
    pub shortlist_auto_score: f64,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 10)?,
            shortlist_min_score: parse_env("SHORTLIST_MIN_SCORE", SHORTLIST_MIN_SCORE)?,
            shortlist_auto_score: parse_env("SHORTLIST_AUTO_SCORE", SHORTLIST_AUTO_SCORE)?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.shortlist_min_score)
            || !(0.0..=10.0).contains(&self.shortlist_auto_score)
        {
            anyhow::bail!("Shortlist thresholds must lie within [0, 10]");
        }
        if self.shortlist_min_score > self.shortlist_auto_score {
            anyhow::bail!(
                "SHORTLIST_MIN_SCORE ({}) must not exceed SHORTLIST_AUTO_SCORE ({})",
                self.shortlist_min_score,
                self.shortlist_auto_score
            );
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
