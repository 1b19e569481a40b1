//! Error types for token creation and decoding.
//!
//! Creation failures are [`TokenError`]s and are surfaced to the caller.
//! A token that does not verify comes back as `Err(DecodeFailure)`. That is
//! an expected outcome, not a `TokenError`, and callers treat it as
//! "unauthenticated".

use thiserror::Error;

/// Errors raised while creating tokens or building encoders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    // Creation errors
    /// The principal does not expose the configured identity attribute,
    /// or exposes it as null.
    #[error("Unable to resolve identity attribute '{field}' on principal")]
    IdentityResolution { field: String },

    /// The encoder could not turn the payload into a token.
    #[error("Token encoding failed: {0}")]
    Encoding(String),

    /// A header parameter cannot be represented by the encoder.
    #[error("Unsupported header parameter: {0}")]
    UnsupportedHeader(String),

    // Key errors
    /// Signing or verification key is invalid or malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // Configuration errors
    /// Required configuration variable is missing.
    #[error("Configuration missing: {var}")]
    ConfigMissing { var: String },

    /// Configuration value is invalid.
    #[error("Configuration invalid for {var}: {reason}")]
    ConfigInvalid { var: String, reason: String },
}

impl TokenError {
    /// Check if this error comes from identity resolution.
    #[must_use]
    pub fn is_identity_error(&self) -> bool {
        matches!(self, TokenError::IdentityResolution { .. })
    }

    /// Check if this error was raised by the encoder while encoding.
    #[must_use]
    pub fn is_encoding_error(&self) -> bool {
        matches!(
            self,
            TokenError::Encoding(_) | TokenError::UnsupportedHeader(_)
        )
    }

    /// Check if this error is a configuration or key-loading problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TokenError::ConfigMissing { .. }
                | TokenError::ConfigInvalid { .. }
                | TokenError::InvalidKey(_)
        )
    }
}

/// Reason a presented token was not accepted.
///
/// This is an expected outcome of decoding, not a system fault.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Token could not be parsed.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Signature does not match the verification key.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    Expired,

    /// Standard claims failed validation (issuer, audience, algorithm...).
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    /// A decode hook marked the payload as invalid.
    #[error("Token rejected by policy")]
    Rejected,
}

impl DecodeFailure {
    /// Check if the failure was detected by the encoder (structural or
    /// cryptographic) rather than by a policy hook.
    #[must_use]
    pub fn is_encoder_failure(&self) -> bool {
        !matches!(self, DecodeFailure::Rejected)
    }

    /// Check if this failure indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, DecodeFailure::Expired)
    }
}
