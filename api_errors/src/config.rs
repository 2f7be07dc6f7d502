//! Settings for the error handler.

use serde::Deserialize;

/// Environment variable that switches on the raw-error debug log.
pub const DEBUG_ENV: &str = "API_ERRORS_DEBUG";

/// Settings for [`crate::ErrorHandler`].
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ErrorHandlerConfig {
    /// Log every raw transport error at debug level before classifying it.
    pub debug: bool,
}

impl ErrorHandlerConfig {
    /// Reads the settings from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            debug: env_bool(DEBUG_ENV, false),
        }
    }
}

/// Parses `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|val| parse_bool(&val))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" on "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_to_quiet() {
        assert!(!ErrorHandlerConfig::default().debug);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let cfg: ErrorHandlerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ErrorHandlerConfig::default());

        let cfg: ErrorHandlerConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(cfg.debug);
    }
}
