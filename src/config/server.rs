//! HTTP server settings loaded from environment variables.
//!
//! `.env` is loaded by `main` before this runs, so values may come from either.

use crate::errors::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Longest accepted session lifetime: ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Runtime settings for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to (`LISTEN_ADDR`, default `0.0.0.0:8080`)
    pub listen_addr: SocketAddr,
    /// Session lifetime in hours (`SESSION_TTL_HOURS`, default 168)
    pub session_ttl_hours: i64,
    /// Adds `Secure` to the session cookie (`COOKIE_SECURE`, default false)
    pub cookie_secure: bool,
    /// Allowed CORS origins (`CORS_ALLOW_ORIGINS`, comma separated, default `*`)
    pub cors_allow: Vec<String>,
    /// Optional TOML seed file (`SEED_CONFIG`)
    pub seed_config: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            session_ttl_hours: 168,
            cookie_secure: false,
            cors_allow: vec!["*".to_string()],
            seed_config: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw.parse().map_err(|e| Error::Config {
                message: format!("Invalid LISTEN_ADDR {raw:?}: {e}"),
            })?,
            None => defaults.listen_addr,
        };

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => hours,
                _ => {
                    return Err(Error::Config {
                        message: format!(
                            "SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {raw:?}"
                        ),
                    });
                }
            },
            None => defaults.session_ttl_hours,
        };

        let cookie_secure = lookup("COOKIE_SECURE")
            .is_some_and(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "yes"));

        let cors_allow = lookup("CORS_ALLOW_ORIGINS").map_or(defaults.cors_allow, |raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let seed_config = lookup("SEED_CONFIG")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            listen_addr,
            session_ttl_hours,
            cookie_secure,
            cors_allow,
            seed_config,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.session_ttl_hours, 168);
        assert!(!config.cookie_secure);
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert!(config.seed_config.is_none());
    }

    #[test]
    fn test_parses_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("LISTEN_ADDR", "127.0.0.1:3000"),
            ("SESSION_TTL_HOURS", "12"),
            ("COOKIE_SECURE", "true"),
            ("CORS_ALLOW_ORIGINS", "https://a.example, https://b.example,"),
            ("SEED_CONFIG", "seed.toml"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.session_ttl_hours, 12);
        assert!(config.cookie_secure);
        assert_eq!(config.cors_allow.len(), 2);
        assert_eq!(config.seed_config, Some(PathBuf::from("seed.toml")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[("LISTEN_ADDR", "nope")])),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "0")])),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "3000000000")])),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ServerConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "87601")])),
            Err(Error::Config { .. })
        ));
        let longest = ServerConfig::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "87600")]))
            .unwrap();
        assert_eq!(longest.session_ttl_hours, MAX_SESSION_TTL_HOURS);
    }
}
