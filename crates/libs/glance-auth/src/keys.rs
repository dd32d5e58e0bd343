//! Purpose-bound sub-keys derived from the secret key.
//!
//! The username hash and the token signature never use the same key
//! material: each is keyed with its own HKDF-SHA256 expansion of the secret.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::prelude::*;
use crate::secret_key::SecretKey;

pub(crate) type HmacSha256 = Hmac<Sha256>;

const SUB_KEY_LENGTH: usize = 32;

/// What a derived key is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyPurpose {
    UsernameHash,
    SessionSignature,
}

impl KeyPurpose {
    fn info(self) -> &'static [u8] {
        match self {
            Self::UsernameHash => b"glance-auth/v1/username-hash",
            Self::SessionSignature => b"glance-auth/v1/session-signature",
        }
    }
}

/// Creates an HMAC-SHA256 instance keyed for `purpose`.
pub(crate) fn keyed_mac(secret: &SecretKey, purpose: KeyPurpose) -> Result<HmacSha256> {
    let hk = Hkdf::<Sha256>::new(None, secret.as_bytes());
    let mut okm = Zeroizing::new([0u8; SUB_KEY_LENGTH]);
    hk.expand(purpose.info(), &mut okm[..])
        .map_err(|_| Error::KeyDerivation)?;
    HmacSha256::new_from_slice(&okm[..]).map_err(|_| Error::KeyDerivation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(secret: &SecretKey, purpose: KeyPurpose, data: &[u8]) -> Vec<u8> {
        let mut mac = keyed_mac(secret, purpose).unwrap();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    #[test]
    fn purposes_use_distinct_keys() {
        let secret = SecretKey::from_bytes(&[7u8; crate::SECRET_KEY_LENGTH]).unwrap();
        let a = tag(&secret, KeyPurpose::UsernameHash, b"admin");
        let b = tag(&secret, KeyPurpose::SessionSignature, b"admin");
        assert_ne!(a, b);
    }

    #[test]
    fn derivation_is_stable() {
        let secret = SecretKey::from_bytes(&[42u8; crate::SECRET_KEY_LENGTH]).unwrap();
        assert_eq!(
            tag(&secret, KeyPurpose::SessionSignature, b"payload"),
            tag(&secret, KeyPurpose::SessionSignature, b"payload")
        );
    }

    #[test]
    fn raw_secret_is_not_used_directly() {
        let secret = SecretKey::from_bytes(&[1u8; crate::SECRET_KEY_LENGTH]).unwrap();
        let mut raw = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        raw.update(b"admin");
        let raw = raw.finalize().into_bytes().to_vec();
        assert_ne!(raw, tag(&secret, KeyPurpose::UsernameHash, b"admin"));
        assert_ne!(raw, tag(&secret, KeyPurpose::SessionSignature, b"admin"));
    }
}
