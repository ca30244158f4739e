//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9A-Fa-f]{3}|[0-9A-Fa-f]{4}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").unwrap()
});

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_HOST" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "SERVER_PORT" => {
            value.parse::<u16>().map_err(|_| "must be a port number (0-65535)")?;
        }
        "RATE_LIMIT_MAX_REQUESTS_PER_MINUTE" => validate_int_range(value, 1, 100_000)?,
        "DEBOUNCE_MS" => validate_int_range(value, 0, 10_000)?,
        "DEFAULT_WIDTH" => validate_int_range(value, 128, 1024)?,
        "DEFAULT_MARGIN" => validate_int_range(value, 0, 10)?,
        "DEFAULT_ERROR_CORRECTION" => {
            if !["L", "M", "Q", "H"].contains(&value.to_ascii_uppercase().as_str()) {
                return Err("must be L, M, Q or H".into());
            }
        }
        "DEFAULT_DARK_COLOR" | "DEFAULT_LIGHT_COLOR" => {
            if !RE_HEX_COLOR.is_match(value) {
                return Err("must be a hex color like #3A5233".into());
            }
        }
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, "ENABLE_VERBOSE_LOGGING" | "ENABLE_RATE_LIMITING")
}
