use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_SOURCE_BASE_URL: &str = "https://api.moysklad.ru/api/remap/1.2";

/// Upper bound the inventory API accepts for the `limit` query parameter.
const MAX_SOURCE_PAGE_LIMIT: u32 = 1000;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let storage_url = require("SUPABASE_URL")?;
    let storage_key = require("SUPABASE_KEY")?;

    let env = parse_environment(&or_default("CATMIRROR_ENV", "development"))?;

    let bind_addr = or_default("CATMIRROR_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("CATMIRROR_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("CATMIRROR_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CATMIRROR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CATMIRROR_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CATMIRROR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let source_base_url = or_default("MS_BASE_URL", DEFAULT_SOURCE_BASE_URL)
        .trim_end_matches('/')
        .to_string();
    let source_token = lookup("MS_TOKEN")
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let source_page_limit = parse_u32("SOURCE_PAGE_LIMIT", "1000")?;
    if source_page_limit == 0 || source_page_limit > MAX_SOURCE_PAGE_LIMIT {
        return Err(invalid(
            "SOURCE_PAGE_LIMIT",
            format!("must be between 1 and {MAX_SOURCE_PAGE_LIMIT}"),
        ));
    }
    let source_request_timeout_secs = parse_u64("SOURCE_REQUEST_TIMEOUT_SECS", "30")?;
    let source_max_retries = parse_u32("SOURCE_MAX_RETRIES", "2")?;
    let source_retry_backoff_base_ms = parse_u64("SOURCE_RETRY_BACKOFF_BASE_MS", "500")?;

    let storage_bucket = or_default("SUPABASE_STORAGE_BUCKET", "images");

    let sync_interval_secs = parse_u64("SYNC_INTERVAL_SECONDS", "600")?;
    if sync_interval_secs == 0 {
        return Err(invalid(
            "SYNC_INTERVAL_SECONDS",
            "must be greater than zero".to_string(),
        ));
    }
    let sync_startup_delay_secs = parse_u64("SYNC_STARTUP_DELAY_SECS", "5")?;
    let sync_stage_pause_ms = parse_u64("SYNC_STAGE_PAUSE_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        source_base_url,
        source_token,
        source_page_limit,
        source_request_timeout_secs,
        source_max_retries,
        source_retry_backoff_base_ms,
        storage_url: storage_url.trim_end_matches('/').to_string(),
        storage_key,
        storage_bucket,
        sync_interval_secs,
        sync_startup_delay_secs,
        sync_stage_pause_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATMIRROR_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}
