use base64::{engine::general_purpose, Engine as _};
use common::secret::{duplicate_key, signing_key, SigningKey};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Minimum decoded length of the token signing secret (256 bits for HS256).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Default clock skew tolerance for `iat` validation, in seconds.
pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Largest clock skew we accept from configuration.
pub const MAX_JWT_CLOCK_SKEW_SECONDS: i64 = 600;

/// Default bcrypt cost factor (~200ms per hash).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Costs below 10 are too cheap to brute-force resistance.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Costs above 14 push login latency past a second.
pub const MAX_BCRYPT_COST: u32 = 14;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Service configuration, loaded once at process start.
///
/// `jwt_secret` is read-only for the life of the process; there is no
/// runtime rotation.
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: SigningKey,
    pub jwt_clock_skew_seconds: i64,
    pub bcrypt_cost: u32,
    pub db_max_connections: u32,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            database_url: self.database_url.clone(),
            bind_address: self.bind_address.clone(),
            jwt_secret: duplicate_key(&self.jwt_secret),
            jwt_clock_skew_seconds: self.jwt_clock_skew_seconds,
            bcrypt_cost: self.bcrypt_cost,
            db_max_connections: self.db_max_connections,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret_base64 = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let jwt_secret = general_purpose::STANDARD
            .decode(jwt_secret_base64.trim())
            .map_err(ConfigError::Base64Error)?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let jwt_clock_skew_seconds = parse_or_default(
            vars,
            "JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        )?;
        if !(1..=MAX_JWT_CLOCK_SKEW_SECONDS).contains(&jwt_clock_skew_seconds) {
            return Err(ConfigError::InvalidValue {
                name: "JWT_CLOCK_SKEW_SECONDS".to_string(),
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_JWT_CLOCK_SKEW_SECONDS, jwt_clock_skew_seconds
                ),
            });
        }

        let bcrypt_cost = parse_or_default(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                name: "BCRYPT_COST".to_string(),
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_BCRYPT_COST, MAX_BCRYPT_COST, bcrypt_cost
                ),
            });
        }

        let db_max_connections =
            parse_or_default(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DB_MAX_CONNECTIONS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret: signing_key(jwt_secret),
            jwt_clock_skew_seconds,
            bcrypt_cost,
            db_max_connections,
        })
    }
}

fn parse_or_default<T>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
    }
}
