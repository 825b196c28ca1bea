//! Server configuration from the environment.
//!
//! `HOST` and `PORT` pick the bind address (0.0.0.0:8080 by default so the app is
//! reachable on a VPS). `DEFAULT_BEST_OF` (1, 3 or 5) and `ADVANTAGE_SETS` (true/false)
//! set the match format for competitions created without an explicit one. Missing or
//! unparsable values fall back to the defaults.

use crate::models::{BestOf, MatchFormat};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub default_format: MatchFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_best_of() -> BestOf {
    BestOf::Three
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_format: MatchFormat {
                best_of: default_best_of(),
                advantage_sets: false,
            },
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST").unwrap_or_else(default_host);
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or_else(default_port);
        let best_of = lookup("DEFAULT_BEST_OF")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .and_then(|n| BestOf::try_from(n).ok())
            .unwrap_or_else(default_best_of);
        let advantage_sets = lookup("ADVANTAGE_SETS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self {
            host,
            port,
            default_format: MatchFormat {
                best_of,
                advantage_sets,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(AppConfig::from_lookup(lookup(&[])), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("DEFAULT_BEST_OF", "5"),
            ("ADVANTAGE_SETS", "true"),
        ]));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.default_format.best_of, BestOf::Five);
        assert!(cfg.default_format.advantage_sets);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = AppConfig::from_lookup(lookup(&[("PORT", "http"), ("DEFAULT_BEST_OF", "4")]));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.default_format.best_of, BestOf::Three);
    }
}
