//! # Configuration
//!
//! Built from environment variables at startup:
//!
//! | Variable              | Default     | Meaning                                  |
//! |-----------------------|-------------|------------------------------------------|
//! | `PORT`                | `5001`      | HTTP listen port                         |
//! | `JWT_SECRET`          | random      | Session token signing secret (≥ 32 bytes)|
//! | `TOKEN_TTL_SECS`      | `2592000`   | Session token lifetime (30 days)         |
//! | `DATABASE_URL`        | unset       | Postgres URL; unset means in-memory      |
//! | `ARGON2_MEMORY_KIB`   | argon2 default | Password hash memory cost             |
//! | `ARGON2_ITERATIONS`   | argon2 default | Password hash passes                  |
//! | `ARGON2_PARALLELISM`  | argon2 default | Password hash lanes                   |
//! | `LOG_FORMAT`          | text        | `json` switches to structured JSON logs  |

use std::str::FromStr;

use chrono::Duration;
use notes_crypto::{HasherConfig, TokenSecret};
use thiserror::Error;

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;
/// Ten years. Keeps `now + ttl` well inside chrono's timestamp range.
const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;
const MIN_SECRET_LEN: usize = 32;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    WeakSecret(usize),
}

/// Application configuration. `Debug` redacts the secret and database URL.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: TokenSecret,
    pub token_ttl: Duration,
    pub database_url: Option<String>,
    pub hasher: HasherConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl.num_seconds())
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("hasher", &self.hasher)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            jwt_secret: TokenSecret::generate(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            database_url: None,
            hasher: HasherConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns the value of a
    /// variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = HasherConfig::default();

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => {
                if secret.len() < MIN_SECRET_LEN {
                    return Err(ConfigError::WeakSecret(secret.len()));
                }
                TokenSecret::new(secret.into_bytes())
            }
            None => {
                tracing::warn!(
                    "JWT_SECRET not set, generating ephemeral secret. \
                     Issued session tokens will not survive a restart."
                );
                TokenSecret::generate()
            }
        };

        let ttl_secs: i64 = parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        let token_ttl = token_ttl(ttl_secs)?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let hasher = HasherConfig {
            memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            port,
            jwt_secret,
            token_ttl,
            database_url,
            hasher,
        })
    }
}

fn token_ttl(secs: i64) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "TOKEN_TTL_SECS",
        value: secs.to_string(),
        reason,
    };
    if secs <= 0 {
        return Err(invalid("must be positive".to_string()));
    }
    if secs > MAX_TOKEN_TTL_SECS {
        return Err(invalid(format!("must be at most {MAX_TOKEN_TTL_SECS}")));
    }
    Duration::try_seconds(secs).ok_or_else(|| invalid("out of range".to_string()))
}

/// Whether `LOG_FORMAT` asks for JSON logs. Read before [`AppConfig`] so
/// configuration warnings are already formatted correctly.
pub fn json_logs_requested(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup("LOG_FORMAT").is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
