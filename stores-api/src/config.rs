/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite connection string (default: `sqlite://app.db`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `JWT_SECRET_KEY`: Secret key for JWT signing, falls back to `SECRET_KEY`
/// - `JWT_ACCESS_TOKEN_EXPIRES`: Access token lifetime in seconds (default: 900)
/// - `JWT_REFRESH_TOKEN_EXPIRES`: Refresh token lifetime in seconds (default: 2592000)
/// - `TOKEN_REVOCATION_BACKEND`: `memory` or `database` (default: memory)
/// - `RUST_LOG`: Log level (default: info)
///
/// Values are read from `env/.env-prod` and `.env` first when those files exist.
///
/// # Example
///
/// ```no_run
/// use stores_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;

use stores_shared::auth::jwt::TokenLifetimes;
use stores_shared::auth::revocation::RevocationBackend;

/// Database URL used when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite://app.db";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access and refresh token lifetimes
    pub lifetimes: TokenLifetimes,

    /// Where revoked token IDs are kept
    pub revocation_backend: RevocationBackend,
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Neither `JWT_SECRET_KEY` nor `SECRET_KEY` is set
    /// - The JWT secret is shorter than 32 characters
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::from_filename("env/.env-prod").ok();
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = parse_var::<u16>("API_PORT", 5000)?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_var::<u32>("DATABASE_MAX_CONNECTIONS", 10)?;

        let jwt_secret = env::var("JWT_SECRET_KEY")
            .or_else(|_| env::var("SECRET_KEY"))
            .map_err(|_| {
                anyhow::anyhow!("JWT_SECRET_KEY (or SECRET_KEY) environment variable is required")
            })?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET_KEY must be at least 32 characters long");
        }

        let defaults = TokenLifetimes::default();
        let access_secs = parse_var::<i64>("JWT_ACCESS_TOKEN_EXPIRES", defaults.access.num_seconds())?;
        let refresh_secs =
            parse_var::<i64>("JWT_REFRESH_TOKEN_EXPIRES", defaults.refresh.num_seconds())?;

        if access_secs <= 0 || refresh_secs <= 0 {
            anyhow::bail!("Token lifetimes must be positive");
        }

        let revocation_backend =
            parse_var::<RevocationBackend>("TOKEN_REVOCATION_BACKEND", RevocationBackend::Memory)?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                lifetimes: TokenLifetimes {
                    access: chrono::Duration::seconds(access_secs),
                    refresh: chrono::Duration::seconds(refresh_secs),
                },
                revocation_backend,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
