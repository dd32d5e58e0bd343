//! Process-wide secret key used to sign and verify session tokens.
//!
//! The key is generated once at startup (or decoded from its base64 form) and
//! then only ever read. It is zeroized on drop and never printed.
//!
//! # Examples
//!
//! ```rust
//! use glance_auth::secret_key::{SecretKey, make_secret_key};
//! use glance_auth::SECRET_KEY_LENGTH;
//!
//! // Produce a key suitable for storing in a config file
//! let encoded = make_secret_key(SECRET_KEY_LENGTH).unwrap();
//!
//! // Later, load it back
//! let secret = SecretKey::from_base64(&encoded).unwrap();
//! assert_eq!(secret.to_base64(), encoded);
//!
//! // Anything that is not exactly SECRET_KEY_LENGTH bytes is rejected
//! let short = make_secret_key(16).unwrap();
//! assert!(SecretKey::from_base64(&short).is_err());
//! ```

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use crate::SECRET_KEY_LENGTH;
use crate::prelude::*;

/// Raw secret key bytes.
#[derive(Clone)]
pub struct SecretKey {
    bytes: Zeroizing<[u8; SECRET_KEY_LENGTH]>,
}

impl SecretKey {
    /// Generates a new key from the OS random source.
    ///
    /// # Returns
    ///
    /// * `Ok(SecretKey)` - A fresh random key
    /// * `Err(Error::KeyGeneration)` - The OS random source failed
    pub fn generate() -> Result<Self> {
        let mut bytes = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        fill_random(&mut bytes[..])?;
        Ok(Self { bytes })
    }

    /// Builds a key from raw bytes.
    ///
    /// `bytes` must be exactly [`SECRET_KEY_LENGTH`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SECRET_KEY_LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidSecretKeyLength {
                expected: SECRET_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self {
            bytes: Zeroizing::new(bytes),
        })
    }

    /// Decodes a key from its standard base64 form.
    ///
    /// Surrounding whitespace is ignored; the decoded length must be exactly
    /// [`SECRET_KEY_LENGTH`].
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(Error::InvalidSecretKeyEncoding)?,
        );
        Self::from_bytes(&decoded)
    }

    /// Encodes the key as standard base64 for storage.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes[..])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Generates `length` random bytes and returns them as standard base64.
///
/// Callers decode the result with [`SecretKey::from_base64`] before use,
/// which only accepts keys of [`SECRET_KEY_LENGTH`] bytes.
///
/// # Example
///
/// ```rust
/// use base64::{Engine as _, engine::general_purpose::STANDARD};
/// use glance_auth::make_secret_key;
///
/// let encoded = make_secret_key(48).unwrap();
/// assert_eq!(STANDARD.decode(encoded).unwrap().len(), 48);
/// ```
pub fn make_secret_key(length: usize) -> Result<String> {
    let mut bytes = Zeroizing::new(vec![0u8; length]);
    fill_random(&mut bytes[..])?;
    Ok(STANDARD.encode(&bytes[..]))
}

fn fill_random(dest: &mut [u8]) -> Result<()> {
    OsRng.try_fill_bytes(dest).map_err(|err| {
        log::error!("Failed to read from the OS random source {err}");
        Error::KeyGeneration(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_secret_key_decodes_to_requested_length() {
        for length in [0, 1, 16, SECRET_KEY_LENGTH, 64, 100] {
            let encoded = make_secret_key(length).unwrap();
            assert_eq!(STANDARD.decode(encoded).unwrap().len(), length);
        }
    }

    #[test]
    fn generated_keys_differ() {
        let a = SecretKey::generate().unwrap();
        let b = SecretKey::generate().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn base64_round_trip() {
        let encoded = make_secret_key(SECRET_KEY_LENGTH).unwrap();
        let secret = SecretKey::from_base64(&encoded).unwrap();
        assert_eq!(secret.to_base64(), encoded);
        assert_eq!(secret.as_bytes().len(), SECRET_KEY_LENGTH);
    }

    #[test]
    fn from_base64_ignores_surrounding_whitespace() {
        let encoded = make_secret_key(SECRET_KEY_LENGTH).unwrap();
        let secret = SecretKey::from_base64(&format!("  {encoded}\n")).unwrap();
        assert_eq!(secret.to_base64(), encoded);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = SecretKey::from_bytes(&[0u8; SECRET_KEY_LENGTH - 1]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSecretKeyLength {
                expected: SECRET_KEY_LENGTH,
                actual: 31
            }
        ));

        let encoded = make_secret_key(SECRET_KEY_LENGTH + 1).unwrap();
        assert!(matches!(
            SecretKey::from_base64(&encoded),
            Err(Error::InvalidSecretKeyLength { actual: 33, .. })
        ));
    }

    #[test]
    fn rejects_invalid_encoding() {
        assert!(matches!(
            SecretKey::from_base64("not base64!"),
            Err(Error::InvalidSecretKeyEncoding(_))
        ));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let secret = SecretKey::from_bytes(&[0xAB; SECRET_KEY_LENGTH]).unwrap();
        let printed = format!("{secret:?}");
        assert_eq!(printed, "SecretKey(<redacted>)");
        assert!(!printed.contains(&secret.to_base64()));
    }
}
