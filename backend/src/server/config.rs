//! Environment-driven application configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use rand::RngCore as _;
use tracing::warn;

/// Environment variable naming the PostgreSQL connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable carrying the HMAC secret for bearer credentials.
pub const JWT_SECRET_VAR: &str = "FOODFLOW_JWT_SECRET";
/// Environment variable overriding the upload blob directory.
pub const UPLOAD_DIR_VAR: &str = "FOODFLOW_UPLOAD_DIR";
/// Environment variable overriding the listen address.
pub const BIND_ADDR_VAR: &str = "FOODFLOW_BIND_ADDR";
/// Environment variable overriding the database pool size.
pub const DB_POOL_SIZE_VAR: &str = "FOODFLOW_DB_POOL_SIZE";
/// Set to `1` to allow a generated throwaway credential secret.
pub const ALLOW_EPHEMERAL_SECRET_VAR: &str = "FOODFLOW_ALLOW_EPHEMERAL_SECRET";

const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_POOL_SIZE: u32 = 10;

/// Configuration errors raised while reading the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {name}")]
    MissingVar {
        /// Name of the absent variable.
        name: &'static str,
    },
    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidVar {
        /// Name of the offending variable.
        name: &'static str,
        /// What went wrong while parsing it.
        message: String,
    },
}

impl ConfigError {
    fn missing(name: &'static str) -> Self {
        Self::MissingVar { name }
    }

    fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidVar {
            name,
            message: message.into(),
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// HMAC secret used to sign and verify bearer credentials.
    pub jwt_secret: Vec<u8>,
    /// Directory where uploaded image blobs are written.
    pub upload_dir: PathBuf,
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Maximum number of pooled database connections.
    pub db_pool_size: u32,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::missing(DATABASE_URL_VAR))?;

        let jwt_secret = resolve_secret(&lookup)?;

        let upload_dir = PathBuf::from(
            lookup(UPLOAD_DIR_VAR).unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_owned()),
        );

        let bind_addr = lookup(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::invalid(BIND_ADDR_VAR, err.to_string()))?;

        let db_pool_size = match lookup(DB_POOL_SIZE_VAR) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|err| ConfigError::invalid(DB_POOL_SIZE_VAR, err.to_string()))?,
            None => DEFAULT_DB_POOL_SIZE,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            upload_dir,
            bind_addr,
            db_pool_size,
        })
    }
}

/// Resolve the credential secret, allowing a generated throwaway one in
/// debug builds or when explicitly opted in. A restart then invalidates all
/// outstanding credentials, which is acceptable only for development.
fn resolve_secret(lookup: &impl Fn(&str) -> Option<String>) -> Result<Vec<u8>, ConfigError> {
    if let Some(secret) = lookup(JWT_SECRET_VAR).filter(|value| !value.is_empty()) {
        return Ok(secret.into_bytes());
    }
    let allow_dev = lookup(ALLOW_EPHEMERAL_SECRET_VAR).as_deref() == Some("1");
    if cfg!(debug_assertions) || allow_dev {
        warn!("using a generated throwaway credential secret (dev only)");
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        return Ok(secret);
    }
    Err(ConfigError::missing(JWT_SECRET_VAR))
}
