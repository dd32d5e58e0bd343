//! Stateless session tokens for the Glance dashboard.
//!
//! A token is the base64 encoding of `expiry ‖ username hash ‖ signature`,
//! signed with a key derived from a process-wide [`SecretKey`]. Nothing is
//! stored on the server: a token is valid as long as its signature checks out
//! against the current secret and it has not expired.
//!
//! The current time is always passed in by the caller.
//!
//! # Usage
//!
//! ```rust
//! use chrono::Utc;
//! use glance_auth::{SecretKey, compute_username_hash, generate_session_token, verify_session_token};
//!
//! let secret = SecretKey::generate().unwrap();
//! let now = Utc::now();
//!
//! // At login
//! let token = generate_session_token("admin", &secret, now).unwrap();
//!
//! // On every request
//! let session = verify_session_token(&token, &secret, now).unwrap();
//! assert!(!session.should_regenerate);
//! assert_eq!(session.username_hash, compute_username_hash("admin", &secret).unwrap());
//! ```

pub mod config;
pub mod error;
mod keys;
pub mod prelude;
pub mod secret_key;
pub mod session;
pub mod token;
pub mod username_hash;

use chrono::TimeDelta;

pub use config::AuthConfig;
pub use secret_key::{SecretKey, make_secret_key};
pub use session::{SessionPolicy, VerifiedSession, generate_session_token, verify_session_token};
pub use token::SessionToken;
pub use username_hash::{UsernameHash, compute_username_hash};

/// Length in bytes of the raw secret key.
pub const SECRET_KEY_LENGTH: usize = 32;
/// Length in bytes of a username hash.
pub const USERNAME_HASH_LENGTH: usize = 32;
/// Length in bytes of a token signature (HMAC-SHA256).
pub const SIGNATURE_LENGTH: usize = 32;
/// Length in bytes of the encoded expiry (big-endian Unix seconds).
pub const EXPIRY_LENGTH: usize = 8;
/// Length in bytes of the signed part of a token.
pub const TOKEN_PAYLOAD_LENGTH: usize = EXPIRY_LENGTH + USERNAME_HASH_LENGTH;
/// Length in bytes of a decoded token.
pub const TOKEN_LENGTH: usize = TOKEN_PAYLOAD_LENGTH + SIGNATURE_LENGTH;

/// How long a token stays valid after it is issued.
pub const AUTH_TOKEN_VALID_PERIOD: TimeDelta = TimeDelta::days(14);
/// How long before expiry a token should be replaced.
pub const AUTH_TOKEN_REGEN_BEFORE: TimeDelta = TimeDelta::days(7);

/// Cookie the HTTP layer stores the session token in.
pub const AUTH_SESSION_COOKIE_NAME: &str = "session_token";
