use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let docstore_endpoint = require("DEALDESK_DOCSTORE_ENDPOINT")?;
    let docstore_project = require("DEALDESK_DOCSTORE_PROJECT")?;
    let database_id = require("DEALDESK_DATABASE_ID")?;
    let docstore_api_key = lookup("DEALDESK_DOCSTORE_API_KEY")
        .ok()
        .filter(|v| !v.is_empty());

    let env = parse_environment(&or_default("DEALDESK_ENV", "development"))?;
    let log_level = or_default("DEALDESK_LOG_LEVEL", "info");
    let deals_collection = or_default("DEALDESK_DEALS_COLLECTION", "deals");
    let products_collection = or_default("DEALDESK_PRODUCTS_COLLECTION", "products");
    let columns_path = PathBuf::from(or_default(
        "DEALDESK_COLUMNS_PATH",
        "./config/columns.yaml",
    ));

    let request_timeout_secs = parse_u64("DEALDESK_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEALDESK_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("DEALDESK_USER_AGENT", "dealdesk/0.1 (deal-board)");

    Ok(AppConfig {
        env,
        log_level,
        docstore_endpoint,
        docstore_project,
        docstore_api_key,
        database_id,
        deals_collection,
        products_collection,
        columns_path,
        request_timeout_secs,
        user_agent,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DEALDESK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
