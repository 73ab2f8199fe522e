//! Authentication configuration.
//!
//! Values are provided by the application, not hardcoded.

/// JWT signing configuration.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret used to sign and verify tokens.
    pub secret: String,

    /// Token lifetime in seconds.
    ///
    /// Default: 3600 (one hour)
    pub expires_in_secs: i64,
}

impl TokenConfig {
    /// Create a token configuration with the default lifetime.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_in_secs: 3600,
        }
    }

    /// Set the token lifetime.
    #[must_use]
    pub const fn with_expires_in(mut self, seconds: i64) -> Self {
        self.expires_in_secs = seconds;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// SMTP relay configuration.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server address (e.g. "smtp.gmail.com").
    pub host: String,

    /// SMTP server port (465 for implicit TLS).
    pub port: u16,

    /// Authentication username; also the sender address.
    pub username: String,

    /// Authentication password.
    pub password: String,

    /// Display name in the "From" header.
    pub from_name: String,
}

impl SmtpConfig {
    /// Create a configuration for `host` with the given credentials.
    ///
    /// Defaults: port 465, sender name "Test App".
    #[must_use]
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 465,
            username: username.into(),
            password: password.into(),
            from_name: "Test App".to_string(),
        }
    }

    /// Set the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the sender display name.
    #[must_use]
    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = name.into();
        self
    }

    /// The "From" header value.
    #[must_use]
    pub fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.username)
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_name", &self.from_name)
            .finish()
    }
}
