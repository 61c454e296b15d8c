use crate::app_config::{AppConfig, Environment, MAPS_API_KEY_VAR};
use crate::{ConfigError, Position};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u8 = |var: &str, default: &str| -> Result<u8, ConfigError> {
        or_default(var, default)
            .parse::<u8>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SHOPMAP_ENV", "development"))?;

    let bind_addr = or_default("SHOPMAP_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SHOPMAP_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SHOPMAP_LOG_LEVEL", "info");
    let data_source = or_default(
        "SHOPMAP_DATA_SOURCE",
        "./public/southern_shops_distributed.csv",
    );
    let schema_path = optional("SHOPMAP_SCHEMA_PATH").map(PathBuf::from);
    let maps_api_key = optional(MAPS_API_KEY_VAR).or_else(|| optional("GOOGLE_MAPS_API_KEY"));

    let zoom_threshold = parse_u8("SHOPMAP_ZOOM_THRESHOLD", "11")?;
    let initial_zoom = parse_u8("SHOPMAP_INITIAL_ZOOM", "8")?;

    let center_lat = parse_f64("SHOPMAP_CENTER_LAT", "8.5")?;
    let center_lng = parse_f64("SHOPMAP_CENTER_LNG", "99.0")?;
    let map_center = Position::try_new(center_lat, center_lng)
        .map_err(|e| invalid("SHOPMAP_CENTER_LAT/SHOPMAP_CENTER_LNG", e.to_string()))?;

    let fetch_timeout_secs = parse_u64("SHOPMAP_FETCH_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHOPMAP_USER_AGENT", "shopmap/0.1 (shop-visit-map)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_source,
        schema_path,
        maps_api_key,
        zoom_threshold,
        initial_zoom,
        map_center,
        fetch_timeout_secs,
        user_agent,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
