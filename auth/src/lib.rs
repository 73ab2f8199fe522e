//! # Storefront Authentication & Authorization
//!
//! Credentials and access control for the storefront backend:
//!
//! - **Passwords**: bcrypt hashing on the blocking pool ([`password`])
//! - **Tokens**: HS256 JWTs carrying account, profile and role ([`token`])
//! - **Flows**: registration and login on top of the account service ([`service`])
//! - **Authorization**: role and ownership checks ([`authorize`])
//! - **Mail**: SMTP and console transports for the core `Mailer` trait ([`providers`])
//!
//! ## Example: Login
//!
//! ```rust,ignore
//! use storefront_auth::{AuthService, LoginRequest};
//!
//! let response = auth
//!     .login(LoginRequest {
//!         email: "ada@example.com".into(),
//!         password: "hunter2".into(),
//!     })
//!     .await?;
//!
//! let actor = auth.authenticate(&response.token)?;
//! assert_eq!(actor.role, response.user_type);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod authorize;
pub mod config;
pub mod error;
pub mod password;
pub mod providers;
pub mod service;
pub mod token;

// Re-export main types for convenience
pub use config::{SmtpConfig, TokenConfig};
pub use error::{AuthError, Result};
pub use password::PasswordHasher;
pub use service::{AuthService, LoginRequest, LoginResponse, RegisterRequest};
pub use token::{Claims, TokenService};
