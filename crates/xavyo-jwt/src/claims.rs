//! Claim payload and header mapping types.
//!
//! A [`ClaimPayload`] is an insertion-ordered JSON object; a [`HeaderMap`]
//! carries string header parameters for header-aware encoders.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Claim name used for the principal's roles.
pub const ROLES_CLAIM: &str = "roles";

/// Default identity claim and identity attribute.
pub const DEFAULT_IDENTITY_FIELD: &str = "username";

/// Ordered mapping from claim name to value.
pub type ClaimPayload = Map<String, Value>;

/// Mapping from header parameter name to value.
pub type HeaderMap = BTreeMap<String, String>;

/// Typed read helpers over a [`ClaimPayload`].
pub trait ClaimsExt {
    /// Get a claim as a string slice, if it is a JSON string.
    fn str_claim(&self, name: &str) -> Option<&str>;

    /// Get a claim as an integer timestamp, if it is a JSON integer.
    fn timestamp_claim(&self, name: &str) -> Option<i64>;

    /// Roles listed in the `roles` claim. Non-string entries are skipped.
    fn roles(&self) -> Vec<&str>;

    /// Check if the `roles` claim contains a specific role.
    fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| *r == role)
    }
}

impl ClaimsExt for ClaimPayload {
    fn str_claim(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    fn timestamp_claim(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    fn roles(&self) -> Vec<&str> {
        match self.get(ROLES_CLAIM) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}
