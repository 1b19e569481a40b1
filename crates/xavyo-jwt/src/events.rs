//! Events dispatched around token creation and decoding.
//!
//! | Channel         | Event               | Hooks may                          |
//! |-----------------|---------------------|------------------------------------|
//! | `JWT_CREATED`   | [`JwtCreatedEvent`] | rewrite payload and header         |
//! | `JWT_ENCODED`   | [`JwtEncodedEvent`] | observe the final token            |
//! | `JWT_DECODED`   | [`JwtDecodedEvent`] | rewrite payload, mark it invalid   |

use crate::claims::{ClaimPayload, HeaderMap};
use crate::principal::Principal;
use std::fmt;

/// Dispatched after the payload is built, before encoding.
pub const JWT_CREATED: &str = "xavyo.jwt.created";

/// Dispatched after encoding, with the token string.
pub const JWT_ENCODED: &str = "xavyo.jwt.encoded";

/// Dispatched after the encoder accepted a token.
pub const JWT_DECODED: &str = "xavyo.jwt.decoded";

/// Extension point a hook subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Created,
    Encoded,
    Decoded,
}

impl Channel {
    /// Channel name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => JWT_CREATED,
            Self::Encoded => JWT_ENCODED,
            Self::Decoded => JWT_DECODED,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Draft payload and header for a token being created.
pub struct JwtCreatedEvent<'a> {
    data: ClaimPayload,
    header: HeaderMap,
    principal: &'a dyn Principal,
}

impl<'a> JwtCreatedEvent<'a> {
    /// Create the event for a principal.
    pub fn new(data: ClaimPayload, principal: &'a dyn Principal) -> Self {
        Self {
            data,
            header: HeaderMap::new(),
            principal,
        }
    }

    /// Claims that will be encoded.
    #[must_use]
    pub fn data(&self) -> &ClaimPayload {
        &self.data
    }

    /// Mutable access to the claims.
    pub fn data_mut(&mut self) -> &mut ClaimPayload {
        &mut self.data
    }

    /// Replace the claims.
    pub fn set_data(&mut self, data: ClaimPayload) {
        self.data = data;
    }

    /// Header parameters. Only header-aware encoders read them.
    #[must_use]
    pub fn header(&self) -> &HeaderMap {
        &self.header
    }

    /// Mutable access to the header parameters.
    pub fn header_mut(&mut self) -> &mut HeaderMap {
        &mut self.header
    }

    /// Replace the header parameters.
    pub fn set_header(&mut self, header: HeaderMap) {
        self.header = header;
    }

    /// Principal the token is issued for.
    #[must_use]
    pub fn principal(&self) -> &'a dyn Principal {
        self.principal
    }

    pub(crate) fn into_parts(self) -> (ClaimPayload, HeaderMap) {
        (self.data, self.header)
    }
}

impl fmt::Debug for JwtCreatedEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtCreatedEvent")
            .field("data", &self.data)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// The token produced by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtEncodedEvent {
    token: String,
}

impl JwtEncodedEvent {
    pub fn new(token: String) -> Self {
        Self { token }
    }

    /// The encoded token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn into_token(self) -> String {
        self.token
    }
}

/// Claims recovered from a token, pending policy checks.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtDecodedEvent {
    payload: ClaimPayload,
    valid: bool,
}

impl JwtDecodedEvent {
    /// Create a valid event for decoded claims.
    pub fn new(payload: ClaimPayload) -> Self {
        Self {
            payload,
            valid: true,
        }
    }

    #[must_use]
    pub fn payload(&self) -> &ClaimPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut ClaimPayload {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: ClaimPayload) {
        self.payload = payload;
    }

    /// Reject the token. Later hooks still run and can see the flag.
    pub fn mark_as_invalid(&mut self) {
        self.valid = false;
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn into_payload(self) -> ClaimPayload {
        self.payload
    }
}
