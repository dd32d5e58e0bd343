//! Session token signing and verification.
//!
//! This module issues tokens at login and checks them on every request. It is
//! pure: the secret and the current time are always passed in, nothing is
//! stored, and identical inputs always give identical results.
//!
//! # Usage
//!
//! - [`generate_session_token`]: issue a token for an authenticated user
//! - [`verify_session_token`]: check a token and learn whether to replace it
//!
//! Both use the default [`SessionPolicy`]; build a custom one with
//! [`SessionPolicy::new`] to change the token lifetime.
//!
//! # Examples
//!
//! ```rust
//! use chrono::{DateTime, TimeDelta};
//! use glance_auth::prelude::Error;
//! use glance_auth::{
//!     AUTH_TOKEN_REGEN_BEFORE, AUTH_TOKEN_VALID_PERIOD, SecretKey, generate_session_token,
//!     verify_session_token,
//! };
//!
//! let secret = SecretKey::generate().unwrap();
//! let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
//! let token = generate_session_token("admin", &secret, issued).unwrap();
//!
//! // Fresh
//! let session = verify_session_token(&token, &secret, issued).unwrap();
//! assert!(!session.should_regenerate);
//!
//! // Inside the regeneration window: still valid, but should be replaced
//! let later = issued + AUTH_TOKEN_VALID_PERIOD - AUTH_TOKEN_REGEN_BEFORE + TimeDelta::seconds(2);
//! assert!(verify_session_token(&token, &secret, later).unwrap().should_regenerate);
//!
//! // Past expiry
//! let expired = issued + AUTH_TOKEN_VALID_PERIOD + TimeDelta::seconds(2);
//! assert!(matches!(
//!     verify_session_token(&token, &secret, expired),
//!     Err(Error::TokenExpired)
//! ));
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use hmac::Mac;

use crate::keys::{KeyPurpose, keyed_mac};
use crate::prelude::*;
use crate::secret_key::SecretKey;
use crate::token::{SessionToken, encode_payload};
use crate::username_hash::{UsernameHash, compute_username_hash};
use crate::{AUTH_TOKEN_REGEN_BEFORE, AUTH_TOKEN_VALID_PERIOD, SIGNATURE_LENGTH};

/// Result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    /// Identity the token was issued for.
    pub username_hash: UsernameHash,
    /// The token is inside its regeneration window and should be replaced.
    pub should_regenerate: bool,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Token lifetime rules.
///
/// Always satisfies `0 < regen_before < valid_period`, both in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    valid_period: TimeDelta,
    regen_before: TimeDelta,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            valid_period: AUTH_TOKEN_VALID_PERIOD,
            regen_before: AUTH_TOKEN_REGEN_BEFORE,
        }
    }
}

impl SessionPolicy {
    /// Creates a policy.
    ///
    /// # Arguments
    ///
    /// * `valid_period` - How long a token is accepted after it is issued
    /// * `regen_before` - How long before expiry the caller is told to replace it
    ///
    /// # Returns
    ///
    /// * `Ok(SessionPolicy)` - The policy
    /// * `Err(Error::InvalidLifetime)` - Unless `0 < regen_before < valid_period`
    ///   and both are whole seconds
    pub fn new(valid_period: TimeDelta, regen_before: TimeDelta) -> Result<Self> {
        if regen_before <= TimeDelta::zero() {
            return Err(Error::InvalidLifetime(String::from(
                "regeneration window must be positive",
            )));
        }
        // Expiry is stored in whole seconds
        if valid_period.subsec_nanos() != 0 || regen_before.subsec_nanos() != 0 {
            return Err(Error::InvalidLifetime(String::from(
                "periods must be a whole number of seconds",
            )));
        }
        if regen_before >= valid_period {
            return Err(Error::InvalidLifetime(format!(
                "regeneration window ({}s) must be shorter than the valid period ({}s)",
                regen_before.num_seconds(),
                valid_period.num_seconds()
            )));
        }
        Ok(Self {
            valid_period,
            regen_before,
        })
    }

    pub fn valid_period(&self) -> TimeDelta {
        self.valid_period
    }

    pub fn regen_before(&self) -> TimeDelta {
        self.regen_before
    }

    /// Issues a token for `username`, valid from `now` for the policy's
    /// valid period.
    ///
    /// The expiry is stored with one second resolution, rounded down.
    pub fn generate_token(
        &self,
        username: &str,
        secret: &SecretKey,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let expiry = now
            .checked_add_signed(self.valid_period)
            .and_then(|expiry| u64::try_from(expiry.timestamp()).ok())
            .ok_or(Error::ExpiryOutOfRange)?;

        let username_hash = compute_username_hash(username, secret)?;
        let signature = sign(&encode_payload(expiry, &username_hash), secret)?;

        log::trace!("Issued session token expiring at {expiry}");
        Ok(SessionToken::new(expiry, username_hash, signature).encode())
    }

    /// Checks `token` against `secret` at time `now`.
    ///
    /// The checks run in a fixed order: decoding, signature, expiry. A
    /// failure at any step rejects the token.
    ///
    /// # Returns
    ///
    /// * `Ok(VerifiedSession)` - Token is authentic and not expired
    /// * `Err(Error::MalformedToken)` - Not base64, or wrong decoded length
    /// * `Err(Error::InvalidSignature)` - Tampered, or signed with another secret
    /// * `Err(Error::TokenExpired)` - `now` is past the token's expiry
    pub fn verify_token(
        &self,
        token: &str,
        secret: &SecretKey,
        now: DateTime<Utc>,
    ) -> Result<VerifiedSession> {
        let token = SessionToken::decode(token).inspect_err(|_| {
            log::debug!("Rejected malformed session token");
        })?;

        verify_signature(&token, secret)?;

        let expires_at = i64::try_from(token.expiry())
            .ok()
            .and_then(|expiry| DateTime::from_timestamp(expiry, 0))
            .ok_or(Error::MalformedToken)?;

        if now > expires_at {
            log::debug!("Rejected session token that expired at {expires_at}");
            return Err(Error::TokenExpired);
        }

        let should_regenerate = expires_at
            .checked_sub_signed(self.regen_before)
            .is_none_or(|regen_at| now > regen_at);

        Ok(VerifiedSession {
            username_hash: *token.username_hash(),
            should_regenerate,
            expires_at,
        })
    }
}

/// Issues a token for `username` using the default [`SessionPolicy`].
///
/// Call this only after the user's credentials have been checked.
pub fn generate_session_token(
    username: &str,
    secret: &SecretKey,
    now: DateTime<Utc>,
) -> Result<String> {
    SessionPolicy::default().generate_token(username, secret, now)
}

/// Verifies `token` using the default [`SessionPolicy`].
///
/// See [`SessionPolicy::verify_token`].
pub fn verify_session_token(
    token: &str,
    secret: &SecretKey,
    now: DateTime<Utc>,
) -> Result<VerifiedSession> {
    SessionPolicy::default().verify_token(token, secret, now)
}

fn sign(payload: &[u8], secret: &SecretKey) -> Result<[u8; SIGNATURE_LENGTH]> {
    let mut mac = keyed_mac(secret, KeyPurpose::SessionSignature)?;
    mac.update(payload);

    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(&mac.finalize().into_bytes());
    Ok(signature)
}

fn verify_signature(token: &SessionToken, secret: &SecretKey) -> Result<()> {
    let mut mac = keyed_mac(secret, KeyPurpose::SessionSignature)?;
    mac.update(&token.payload());
    // verify_slice compares in constant time
    mac.verify_slice(token.signature()).map_err(|_| {
        log::warn!("Rejected session token with an invalid signature");
        Error::InvalidSignature
    })
}
