//! Keyed username hashing.
//!
//! Tokens carry `HMAC-SHA256(K_user, username)` instead of the username so
//! the plaintext name never leaves the server, while the server can still
//! recompute it and check who a token belongs to.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::Mac;
use subtle::ConstantTimeEq;

use crate::USERNAME_HASH_LENGTH;
use crate::keys::{KeyPurpose, keyed_mac};
use crate::prelude::*;
use crate::secret_key::SecretKey;

/// Opaque identity embedded in a session token.
///
/// Comparisons are constant-time.
#[derive(Clone, Copy)]
pub struct UsernameHash([u8; USERNAME_HASH_LENGTH]);

impl UsernameHash {
    pub(crate) fn from_array(bytes: [u8; USERNAME_HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; USERNAME_HASH_LENGTH] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Checks whether this hash belongs to `username` under `secret`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glance_auth::{SecretKey, compute_username_hash};
    ///
    /// let secret = SecretKey::generate().unwrap();
    /// let hash = compute_username_hash("admin", &secret).unwrap();
    /// assert!(hash.matches("admin", &secret).unwrap());
    /// assert!(!hash.matches("guest", &secret).unwrap());
    /// ```
    pub fn matches(&self, username: &str, secret: &SecretKey) -> Result<bool> {
        Ok(*self == compute_username_hash(username, secret)?)
    }
}

impl PartialEq for UsernameHash {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for UsernameHash {}

impl fmt::Debug for UsernameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UsernameHash({self})")
    }
}

/// Lowercase hex.
impl fmt::Display for UsernameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Computes the keyed hash of `username`.
///
/// Deterministic: the same `(username, secret)` pair always yields the same
/// hash, and different secrets yield unrelated hashes.
///
/// # Examples
///
/// ```rust
/// use glance_auth::{SecretKey, compute_username_hash};
///
/// let secret = SecretKey::generate().unwrap();
/// let first = compute_username_hash("admin", &secret).unwrap();
/// let second = compute_username_hash("admin", &secret).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(first.to_string().len(), 64);
/// ```
pub fn compute_username_hash(username: &str, secret: &SecretKey) -> Result<UsernameHash> {
    let mut mac = keyed_mac(secret, KeyPurpose::UsernameHash)?;
    mac.update(username.as_bytes());

    let mut hash = [0u8; USERNAME_HASH_LENGTH];
    hash.copy_from_slice(&mac.finalize().into_bytes());
    Ok(UsernameHash(hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SECRET_KEY_LENGTH;

    fn secret(fill: u8) -> SecretKey {
        SecretKey::from_bytes(&[fill; SECRET_KEY_LENGTH]).unwrap()
    }

    #[test]
    fn deterministic() {
        let secret = secret(3);
        let hashes: Vec<_> = (0..10)
            .map(|_| compute_username_hash("admin", &secret).unwrap())
            .collect();
        assert!(hashes.iter().all(|hash| *hash == hashes[0]));
    }

    #[test]
    fn depends_on_username() {
        let secret = secret(3);
        assert_ne!(
            compute_username_hash("admin", &secret).unwrap(),
            compute_username_hash("Admin", &secret).unwrap()
        );
        assert_ne!(
            compute_username_hash("admin", &secret).unwrap(),
            compute_username_hash("", &secret).unwrap()
        );
    }

    #[test]
    fn depends_on_secret() {
        assert_ne!(
            compute_username_hash("admin", &secret(1)).unwrap(),
            compute_username_hash("admin", &secret(2)).unwrap()
        );
    }

    #[test]
    fn matches_checks_username_and_secret() {
        let hash = compute_username_hash("admin", &secret(9)).unwrap();
        assert!(hash.matches("admin", &secret(9)).unwrap());
        assert!(!hash.matches("admin ", &secret(9)).unwrap());
        assert!(!hash.matches("admin", &secret(8)).unwrap());
    }

    #[test]
    fn display_is_hex() {
        let hash = UsernameHash::from_array([0xAB; USERNAME_HASH_LENGTH]);
        assert_eq!(hash.to_string(), "ab".repeat(USERNAME_HASH_LENGTH));
        assert_eq!(format!("{hash:?}"), format!("UsernameHash({hash})"));
    }

    #[test]
    fn base64_encodes_raw_bytes() {
        let hash = compute_username_hash("admin", &secret(4)).unwrap();
        let encoded = hash.to_base64();
        assert_eq!(encoded.len(), 44);
        assert_eq!(STANDARD.decode(&encoded).unwrap(), hash.as_bytes());
    }
}
