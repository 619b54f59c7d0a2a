use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("DEALDESK_DOCSTORE_ENDPOINT", "https://cloud.example.test/v1");
    m.insert("DEALDESK_DOCSTORE_PROJECT", "crm-project");
    m.insert("DEALDESK_DATABASE_ID", "crm-db");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "DEALDESK_ENV"));
}

#[test]
fn build_app_config_fails_without_endpoint() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "DEALDESK_DOCSTORE_ENDPOINT"),
        "expected MissingEnvVar(DEALDESK_DOCSTORE_ENDPOINT), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_required_var_as_missing() {
    let mut map = full_env();
    map.insert("DEALDESK_DATABASE_ID", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "DEALDESK_DATABASE_ID"),
        "expected MissingEnvVar(DEALDESK_DATABASE_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.docstore_endpoint, "https://cloud.example.test/v1");
    assert_eq!(cfg.docstore_project, "crm-project");
    assert!(cfg.docstore_api_key.is_none());
    assert_eq!(cfg.database_id, "crm-db");
    assert_eq!(cfg.deals_collection, "deals");
    assert_eq!(cfg.products_collection, "products");
    assert_eq!(
        cfg.columns_path,
        std::path::PathBuf::from("./config/columns.yaml")
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "dealdesk/0.1 (deal-board)");
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("DEALDESK_ENV", "production");
    map.insert("DEALDESK_DOCSTORE_API_KEY", "secret-key");
    map.insert("DEALDESK_DEALS_COLLECTION", "pipeline");
    map.insert("DEALDESK_PRODUCTS_COLLECTION", "watchlist");
    map.insert("DEALDESK_REQUEST_TIMEOUT_SECS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.docstore_api_key.as_deref(), Some("secret-key"));
    assert_eq!(cfg.deals_collection, "pipeline");
    assert_eq!(cfg.products_collection, "watchlist");
    assert_eq!(cfg.request_timeout_secs, 5);
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = full_env();
    map.insert("DEALDESK_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALDESK_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(DEALDESK_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = full_env();
    map.insert("DEALDESK_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEALDESK_REQUEST_TIMEOUT_SECS"
    ));
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = full_env();
    map.insert("DEALDESK_DOCSTORE_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-key"));
    assert!(rendered.contains("[redacted]"));
}
