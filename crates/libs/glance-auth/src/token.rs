//! Fixed-layout session token codec.
//!
//! A decoded token is always exactly [`TOKEN_LENGTH`] bytes:
//!
//! ```text
//! +----------------+----------------------+-----------------+
//! | expiry (8, BE) | username hash (32)   | signature (32)  |
//! +----------------+----------------------+-----------------+
//! |<------------ signed payload --------->|
//! ```
//!
//! On the wire it is the standard base64 encoding of those bytes. This module
//! only packs and unpacks; it does not check the signature or the expiry.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::prelude::*;
use crate::username_hash::UsernameHash;
use crate::{
    EXPIRY_LENGTH, SIGNATURE_LENGTH, TOKEN_LENGTH, TOKEN_PAYLOAD_LENGTH, USERNAME_HASH_LENGTH,
};

/// Unpacked session token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    expiry: u64,
    username_hash: UsernameHash,
    signature: [u8; SIGNATURE_LENGTH],
}

impl SessionToken {
    pub(crate) fn new(
        expiry: u64,
        username_hash: UsernameHash,
        signature: [u8; SIGNATURE_LENGTH],
    ) -> Self {
        Self {
            expiry,
            username_hash,
            signature,
        }
    }

    /// Expiry as Unix seconds.
    pub fn expiry(&self) -> u64 {
        self.expiry
    }

    pub fn username_hash(&self) -> &UsernameHash {
        &self.username_hash
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    /// The bytes covered by the signature: `expiry ‖ username hash`.
    pub fn payload(&self) -> [u8; TOKEN_PAYLOAD_LENGTH] {
        encode_payload(self.expiry, &self.username_hash)
    }

    pub fn to_bytes(&self) -> [u8; TOKEN_LENGTH] {
        let mut bytes = [0u8; TOKEN_LENGTH];
        bytes[..TOKEN_PAYLOAD_LENGTH].copy_from_slice(&self.payload());
        bytes[TOKEN_PAYLOAD_LENGTH..].copy_from_slice(&self.signature);
        bytes
    }

    /// Unpacks raw token bytes.
    ///
    /// Fails with [`Error::MalformedToken`] unless `bytes` is exactly
    /// [`TOKEN_LENGTH`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; TOKEN_LENGTH] = bytes.try_into().map_err(|_| Error::MalformedToken)?;

        let (expiry, rest) = bytes.split_at(EXPIRY_LENGTH);
        let (username_hash, signature) = rest.split_at(USERNAME_HASH_LENGTH);

        let mut expiry_bytes = [0u8; EXPIRY_LENGTH];
        expiry_bytes.copy_from_slice(expiry);
        let mut hash_bytes = [0u8; USERNAME_HASH_LENGTH];
        hash_bytes.copy_from_slice(username_hash);
        let mut signature_bytes = [0u8; SIGNATURE_LENGTH];
        signature_bytes.copy_from_slice(signature);

        Ok(Self {
            expiry: u64::from_be_bytes(expiry_bytes),
            username_hash: UsernameHash::from_array(hash_bytes),
            signature: signature_bytes,
        })
    }

    /// Encodes the token for transport.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes a token received from a client.
    ///
    /// Fails with [`Error::MalformedToken`] on invalid base64 or a decoded
    /// length other than [`TOKEN_LENGTH`].
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = STANDARD.decode(token).map_err(|_| Error::MalformedToken)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("expiry", &self.expiry)
            .field("username_hash", &self.username_hash)
            .finish_non_exhaustive()
    }
}

pub(crate) fn encode_payload(
    expiry: u64,
    username_hash: &UsernameHash,
) -> [u8; TOKEN_PAYLOAD_LENGTH] {
    let mut payload = [0u8; TOKEN_PAYLOAD_LENGTH];
    payload[..EXPIRY_LENGTH].copy_from_slice(&expiry.to_be_bytes());
    payload[EXPIRY_LENGTH..].copy_from_slice(username_hash.as_bytes());
    payload
}
