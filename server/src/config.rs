//! Configuration management for the storefront server.
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, bail};
use std::env;
use std::net::{IpAddr, SocketAddr};

/// Secret used when `JWT_SECRET` is unset in development.
pub const DEVELOPMENT_JWT_SECRET: &str = "storefront-development-secret";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings; `None` runs on the in-memory store
    pub database: Option<DatabaseConfig>,
    /// Token signing settings
    pub auth: AuthConfig,
    /// Outgoing mail; `None` logs mail to the console
    pub smtp: Option<SmtpSettings>,
    /// Side-effect dispatcher settings
    pub outbox: OutboxConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: IpAddr,
    /// Port to bind to
    pub port: u16,
    /// Prometheus exporter port
    pub metrics_port: u16,
    /// Deployment environment name (`development`, `production`, ...)
    pub environment: String,
}

impl ServerConfig {
    /// Address the HTTP server listens on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Address the metrics exporter listens on.
    #[must_use]
    pub const fn metrics_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.metrics_port)
    }

    /// Whether this is a development deployment.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Whether the development secret is in use
    pub using_default_secret: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("using_default_secret", &self.using_default_secret)
            .finish()
    }
}

/// SMTP relay settings
#[derive(Clone)]
pub struct SmtpSettings {
    /// Relay host
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Login user, also the sender address
    pub username: String,
    /// Login password
    pub password: String,
    /// Sender display name
    pub from_name: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from_name", &self.from_name)
            .finish_non_exhaustive()
    }
}

/// Outbox configuration
#[derive(Debug, Clone, Copy)]
pub struct OutboxConfig {
    /// Queue capacity before `enqueue` waits
    pub capacity: usize,
    /// Delivery retries per effect
    pub max_retries: usize,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a variable does not parse, or when `JWT_SECRET` is missing
    /// outside development.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let server = ServerConfig {
            host: parse_or(&var, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(&var, "PORT", 3000)?,
            metrics_port: parse_or(&var, "METRICS_PORT", 9090)?,
            environment: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
        };

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
            }),
            None => None,
        };

        let (jwt_secret, using_default_secret) = match var("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if server.is_development() => (DEVELOPMENT_JWT_SECRET.to_string(), true),
            None => bail!("JWT_SECRET must be set when APP_ENV is {}", server.environment),
        };
        let auth = AuthConfig {
            jwt_secret,
            expires_in: parse_or(&var, "JWT_EXPIRES_IN", 3600)?,
            using_default_secret,
        };

        let smtp = match (var("EMAIL_USER"), var("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpSettings {
                host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: parse_or(&var, "SMTP_PORT", 465)?,
                username,
                password,
                from_name: var("MAIL_FROM_NAME").unwrap_or_else(|| "Test App".to_string()),
            }),
            _ => None,
        };

        let outbox = OutboxConfig {
            capacity: parse_or(&var, "OUTBOX_CAPACITY", 1024)?,
            max_retries: parse_or(&var, "OUTBOX_MAX_RETRIES", 3)?,
        };

        Ok(Self {
            server,
            database,
            auth,
            smtp,
            outbox,
        })
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw}"))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.server.addr(), "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.server.metrics_port, 9090);
        assert!(config.server.is_development());
        assert!(config.database.is_none());
        assert!(config.smtp.is_none());
        assert!(config.auth.using_default_secret);
        assert_eq!(config.auth.jwt_secret, DEVELOPMENT_JWT_SECRET);
        assert_eq!(config.auth.expires_in, 3600);
        assert_eq!(config.outbox.capacity, 1024);
        assert_eq!(config.outbox.max_retries, 3);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRES_IN", "60"),
            ("EMAIL_USER", "shop@example.com"),
            ("EMAIL_PASS", "app-password"),
            ("SMTP_PORT", "587"),
        ])
        .unwrap();

        assert_eq!(config.server.addr(), "127.0.0.1:8080".parse().unwrap());
        let database = config.database.unwrap();
        assert_eq!(database.url, "postgres://localhost/shop");
        assert_eq!(database.max_connections, 4);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert!(!config.auth.using_default_secret);
        assert_eq!(config.auth.expires_in, 60);
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.from_name, "Test App");
    }

    #[test]
    fn test_secret_required_in_production() {
        let err = load(&[("APP_ENV", "production")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        assert!(load(&[("APP_ENV", "production"), ("JWT_SECRET", "x")]).is_ok());
    }

    #[test]
    fn test_smtp_needs_both_credentials() {
        let config = load(&[("EMAIL_USER", "shop@example.com")]).unwrap();
        assert!(config.smtp.is_none());
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = load(&[("JWT_SECRET", "hunter2")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
