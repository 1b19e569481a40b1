//! Encoder capability.
//!
//! An encoder turns a claim payload into a wire token and back. Plain
//! encoders only see claims; header-aware encoders also receive the header
//! mapping hooks built during creation. The manager holds one [`Encoder`]
//! and picks the right call for its variant.

pub mod signed;
pub mod unsigned;

use crate::claims::{ClaimPayload, HeaderMap};
use crate::error::{DecodeFailure, TokenError};
use std::fmt;
use std::sync::Arc;

pub use signed::SignedEncoder;
pub use unsigned::UnsignedEncoder;

/// Claims-only encoder.
///
/// `decode` must not panic on any input: malformed, forged or expired
/// tokens are reported as a [`DecodeFailure`].
pub trait JwtEncoder: Send + Sync {
    /// Encode claims into a token string.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if the claims cannot be encoded.
    fn encode(&self, claims: &ClaimPayload) -> Result<String, TokenError>;

    /// Decode and verify a token string.
    fn decode(&self, token: &str) -> Result<ClaimPayload, DecodeFailure>;
}

/// Encoder that also writes header parameters.
pub trait HeaderAwareJwtEncoder: JwtEncoder {
    /// Encode claims with the given header parameters.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` or `TokenError::UnsupportedHeader`.
    fn encode_with_header(
        &self,
        claims: &ClaimPayload,
        header: &HeaderMap,
    ) -> Result<String, TokenError>;
}

/// The encoder held by a manager, tagged by capability.
#[derive(Clone)]
pub enum Encoder {
    /// Claims only; header mappings are ignored.
    Plain(Arc<dyn JwtEncoder>),
    /// Claims and header parameters.
    HeaderAware(Arc<dyn HeaderAwareJwtEncoder>),
}

impl Encoder {
    /// Wrap a claims-only encoder.
    pub fn plain(encoder: impl JwtEncoder + 'static) -> Self {
        Encoder::Plain(Arc::new(encoder))
    }

    /// Wrap a header-aware encoder.
    pub fn header_aware(encoder: impl HeaderAwareJwtEncoder + 'static) -> Self {
        Encoder::HeaderAware(Arc::new(encoder))
    }

    /// Check if headers reach the encoder.
    #[must_use]
    pub fn is_header_aware(&self) -> bool {
        matches!(self, Encoder::HeaderAware(_))
    }

    /// Short name used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Encoder::Plain(_) => "plain",
            Encoder::HeaderAware(_) => "header_aware",
        }
    }

    /// Encode claims, handing the header mapping over only when the
    /// encoder supports it.
    ///
    /// # Errors
    ///
    /// Propagates the encoder's error.
    pub fn encode(&self, claims: &ClaimPayload, header: &HeaderMap) -> Result<String, TokenError> {
        match self {
            Encoder::Plain(encoder) => encoder.encode(claims),
            Encoder::HeaderAware(encoder) => encoder.encode_with_header(claims, header),
        }
    }

    /// Decode a token with the wrapped encoder.
    pub fn decode(&self, token: &str) -> Result<ClaimPayload, DecodeFailure> {
        match self {
            Encoder::Plain(encoder) => encoder.decode(token),
            Encoder::HeaderAware(encoder) => encoder.decode(token),
        }
    }
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Encoder").field(&self.kind()).finish()
    }
}

impl From<UnsignedEncoder> for Encoder {
    fn from(encoder: UnsignedEncoder) -> Self {
        Encoder::plain(encoder)
    }
}

impl From<SignedEncoder> for Encoder {
    fn from(encoder: SignedEncoder) -> Self {
        Encoder::header_aware(encoder)
    }
}
