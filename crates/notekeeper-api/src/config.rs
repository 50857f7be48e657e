//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `JWT_SECRET` | required, at least 32 bytes |
//! | `JWT_EXPIRATION_SECS` | `3600` |
//! | `HOST` / `PORT` | `0.0.0.0` / `8080` |
//! | `STORAGE_BACKEND` | `postgres` (`postgres` or `memory`) |
//! | `DATABASE_URL` | `postgres://localhost/notekeeper` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `API_DOCS_ENABLED` | `true` |
//! | `CORS_ALLOWED_ORIGINS` | empty (comma-separated list) |
//! | `LOG_FORMAT` | `text` (`text` or `json`) |
//! | `LOG_FILE` | unset |
//! | `LOG_ANSI` | auto |

use std::net::SocketAddr;

use anyhow::{anyhow, bail, Context};
use chrono::Duration;

use notekeeper_core::{defaults, TokenCodec};

/// Where users and notes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_lifetime: Duration,
    pub storage: StorageBackend,
    pub database_url: String,
    pub db_max_connections: u32,
    pub docs_enabled: bool,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
    pub log_file: Option<String>,
    pub log_ansi: Option<bool>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_lifetime_secs", &self.token_lifetime.num_seconds())
            .field("storage", &self.storage)
            .field("db_max_connections", &self.db_max_connections)
            .field("docs_enabled", &self.docs_enabled)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => bail!("{key} must be true or false, got '{other}'"),
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let lifetime_secs = match lookup("JWT_EXPIRATION_SECS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .with_context(|| format!("JWT_EXPIRATION_SECS is not a number: '{v}'"))?,
            None => defaults::TOKEN_LIFETIME_SECS,
        };
        if lifetime_secs <= 0 {
            bail!("JWT_EXPIRATION_SECS must be positive, got {lifetime_secs}");
        }
        let token_lifetime = Duration::try_seconds(lifetime_secs)
            .ok_or_else(|| anyhow!("JWT_EXPIRATION_SECS is out of range: {lifetime_secs}"))?;

        let port = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: '{v}'"))?,
            None => defaults::PORT,
        };

        let storage = match lookup("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS is not a number: '{v}'"))?,
            None => defaults::DB_MAX_CONNECTIONS,
        };

        let docs_enabled = match lookup("API_DOCS_ENABLED") {
            Some(v) => parse_bool("API_DOCS_ENABLED", &v)?,
            None => true,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        };

        let log_ansi = match lookup("LOG_ANSI") {
            Some(v) => Some(parse_bool("LOG_ANSI", &v)?),
            None => None,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| defaults::HOST.to_string()),
            port,
            jwt_secret,
            token_lifetime,
            storage,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            db_max_connections,
            docs_enabled,
            cors_allowed_origins,
            log_format,
            log_file: lookup("LOG_FILE").filter(|s| !s.is_empty()),
            log_ansi,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Build the token codec from the configured secret and lifetime.
    pub fn token_codec(&self) -> anyhow::Result<TokenCodec> {
        TokenCodec::new(self.jwt_secret.as_bytes(), self.token_lifetime)
            .context("invalid JWT configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(cfg.host, defaults::HOST);
        assert_eq!(cfg.port, defaults::PORT);
        assert_eq!(cfg.token_lifetime, Duration::seconds(3600));
        assert_eq!(cfg.storage, StorageBackend::Postgres);
        assert_eq!(cfg.database_url, defaults::DATABASE_URL);
        assert!(cfg.docs_enabled);
        assert!(cfg.cors_allowed_origins.is_empty());
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert!(cfg.log_file.is_none());
        assert!(cfg.token_codec().is_ok());
    }

    #[test]
    fn test_secret_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn test_short_secret_fails_codec() {
        let cfg = config(&[("JWT_SECRET", "short")]).unwrap();
        assert!(cfg.token_codec().is_err());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_SECS", "60"),
            ("PORT", "9000"),
            ("STORAGE_BACKEND", "memory"),
            ("API_DOCS_ENABLED", "false"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(cfg.token_lifetime, Duration::seconds(60));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert!(!cfg.docs_enabled);
        assert_eq!(cfg.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config(&[("JWT_SECRET", SECRET), ("PORT", "eighty")]).is_err());
        assert!(config(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_SECS", "0")]).is_err());
        assert!(config(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_SECS", "9223372036854775807"),
        ])
        .is_err());
        assert!(config(&[("JWT_SECRET", SECRET), ("STORAGE_BACKEND", "redis")]).is_err());
        assert!(config(&[("JWT_SECRET", SECRET), ("API_DOCS_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cfg = config(&[("JWT_SECRET", SECRET)]).unwrap();
        assert!(!format!("{:?}", cfg).contains(SECRET));
    }
}
