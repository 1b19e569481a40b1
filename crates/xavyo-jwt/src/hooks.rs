//! Stock policy hooks.
//!
//! ```
//! use std::sync::Arc;
//! use xavyo_jwt::hooks::{token_id, RequiredClaims, RevocationList};
//! use xavyo_jwt::HookDispatcher;
//!
//! let dispatcher = HookDispatcher::new();
//! let revoked = Arc::new(RevocationList::new());
//!
//! dispatcher.subscribe_created("token-id", 0, token_id());
//! dispatcher.subscribe_decoded("revocation", 10, revoked.hook());
//! let required = RequiredClaims::new(vec!["jti"]);
//! dispatcher.subscribe_decoded("required-claims", 0, required.into_hook());
//! ```

use crate::claims::ClaimsExt;
use crate::events::{JwtCreatedEvent, JwtDecodedEvent};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// JWT ID claim.
pub const JTI_CLAIM: &str = "jti";

/// Creation hook stamping a UUID v4 `jti` on tokens that have none.
pub fn token_id() -> impl Fn(&mut JwtCreatedEvent<'_>) + Send + Sync + 'static {
    |event: &mut JwtCreatedEvent<'_>| {
        event
            .data_mut()
            .entry(JTI_CLAIM)
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    }
}

/// Set of revoked token IDs checked on decode.
///
/// Tokens without a `jti` claim are not affected.
#[derive(Debug, Default)]
pub struct RevocationList {
    revoked: RwLock<HashSet<String>>,
}

impl RevocationList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a token ID. Returns false if it was already revoked.
    pub fn revoke(&self, jti: impl Into<String>) -> bool {
        self.revoked.write().insert(jti.into())
    }

    /// Lift a revocation. Returns false if the ID was not revoked.
    pub fn restore(&self, jti: &str) -> bool {
        self.revoked.write().remove(jti)
    }

    #[must_use]
    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.read().contains(jti)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.revoked.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revoked.read().is_empty()
    }

    /// Mark the event invalid if its `jti` is revoked.
    pub fn check(&self, event: &mut JwtDecodedEvent) {
        let revoked = event
            .payload()
            .str_claim(JTI_CLAIM)
            .is_some_and(|jti| self.is_revoked(jti));

        if revoked {
            debug!("Rejecting revoked token");
            event.mark_as_invalid();
        }
    }

    /// Decode hook sharing this list.
    pub fn hook(self: &Arc<Self>) -> impl Fn(&mut JwtDecodedEvent) + Send + Sync + 'static {
        let list = Arc::clone(self);
        move |event: &mut JwtDecodedEvent| list.check(event)
    }
}

/// Decode policy rejecting payloads that miss any of the listed claims.
#[derive(Debug, Clone)]
pub struct RequiredClaims {
    claims: Vec<String>,
}

impl RequiredClaims {
    pub fn new(claims: Vec<impl Into<String>>) -> Self {
        Self {
            claims: claims.into_iter().map(Into::into).collect(),
        }
    }

    /// Mark the event invalid if a required claim is absent.
    pub fn check(&self, event: &mut JwtDecodedEvent) {
        let missing = self
            .claims
            .iter()
            .find(|claim| !event.payload().contains_key(claim.as_str()));

        if let Some(claim) = missing {
            debug!(claim = %claim, "Rejecting token without required claim");
            event.mark_as_invalid();
        }
    }

    /// Turn the policy into a decode hook.
    pub fn into_hook(self) -> impl Fn(&mut JwtDecodedEvent) + Send + Sync + 'static {
        move |event: &mut JwtDecodedEvent| self.check(event)
    }
}
