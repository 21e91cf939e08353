use anyhow::{Context, Result};

use crate::seating::merge::MergeStrategy;
use crate::seating::SeatingDefaults;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub seating: SeatingDefaults,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = SeatingDefaults::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: positive_env("DB_MAX_CONNECTIONS", 10)
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            port: optional_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            seating: SeatingDefaults {
                merge_strategy: optional_env::<MergeStrategy>(
                    "SEATING_MERGE_STRATEGY",
                    defaults.merge_strategy,
                )
                .context("SEATING_MERGE_STRATEGY must be first_fit, best_fit or disabled")?,
                grid_columns: positive_env("SEATING_GRID_COLUMNS", defaults.grid_columns)
                    .context("SEATING_GRID_COLUMNS must be a positive integer")?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

fn positive_env(key: &str, default: u32) -> Result<u32> {
    match std::env::var(key) {
        Ok(raw) => parse_positive(&raw),
        Err(_) => Ok(default),
    }
}

fn parse_positive(raw: &str) -> Result<u32> {
    let value: u32 = raw.trim().parse()?;
    anyhow::ensure!(value > 0, "value must be greater than zero, got {value}");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_accepts_padded_number() {
        assert_eq!(parse_positive(" 12 ").unwrap(), 12);
    }

    #[test]
    fn test_parse_positive_rejects_zero() {
        assert!(parse_positive("0").is_err());
    }

    #[test]
    fn test_parse_positive_rejects_garbage() {
        assert!(parse_positive("-3").is_err());
        assert!(parse_positive("ten").is_err());
    }
}
