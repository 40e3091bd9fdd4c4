use bugline_common::error::{BuglineError, BuglineResult};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub session_ttl_hours: i64,
    pub cors_origins: Vec<String>,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> BuglineResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        let session_ttl_hours: i64 = get_var_or("SESSION_TTL_HOURS", "720")
            .parse()
            .map_err(|e| BuglineError::Config(format!("invalid SESSION_TTL_HOURS: {e}")))?;
        if session_ttl_hours <= 0 {
            return Err(BuglineError::Config(
                "SESSION_TTL_HOURS must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url: get_var("DATABASE_URL")?,
            host: get_var_or("HOST", "0.0.0.0"),
            port: get_var_or("PORT", "8080")
                .parse()
                .map_err(|e| BuglineError::Config(format!("invalid PORT: {e}")))?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            session_ttl_hours,
            cors_origins: parse_origins(&get_var_or("CORS_ORIGINS", "http://localhost:3000")),
            run_migrations: parse_bool("RUN_MIGRATIONS", &get_var_or("RUN_MIGRATIONS", "true"))?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var(key: &str) -> BuglineResult<String> {
    env::var(key).map_err(|_| BuglineError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> BuglineResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(BuglineError::Config(format!("invalid {key}: {other}"))),
    }
}
