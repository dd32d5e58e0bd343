//! Authentication error types.

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The OS random source could not produce key material.
    #[error("Secure random source unavailable: {0}")]
    KeyGeneration(String),

    /// A sub-key could not be derived from the secret key.
    #[error("Key derivation failed")]
    KeyDerivation,

    #[error("Invalid secret key length: expected {expected} bytes, got {actual}")]
    InvalidSecretKeyLength { expected: usize, actual: usize },

    #[error("Invalid secret key encoding {0}")]
    InvalidSecretKeyEncoding(base64::DecodeError),

    #[error("Malformed Token")]
    MalformedToken,
    #[error("Invalid Token Signature")]
    InvalidSignature,
    #[error("Token Expired")]
    TokenExpired,

    /// The token expiry cannot be represented as unsigned Unix seconds.
    #[error("Token expiry out of range")]
    ExpiryOutOfRange,

    #[error("Invalid token lifetime: {0}")]
    InvalidLifetime(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error means "the presented token was rejected".
    ///
    /// The HTTP layer should treat every rejection the same way (deny and ask
    /// for a new login) and only use the specific kind for server side logs.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken | Self::InvalidSignature | Self::TokenExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rejections() {
        assert!(Error::MalformedToken.is_token_rejection());
        assert!(Error::InvalidSignature.is_token_rejection());
        assert!(Error::TokenExpired.is_token_rejection());
        assert!(!Error::KeyDerivation.is_token_rejection());
        assert!(!Error::ExpiryOutOfRange.is_token_rejection());
    }
}
