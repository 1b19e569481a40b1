//! Token creation and decoding pipeline.
//!
//! `create` builds the payload from a principal, lets `JWT_CREATED` hooks
//! amend it, encodes it and reports the token on `JWT_ENCODED`. `decode`
//! asks the encoder to verify a token, then lets `JWT_DECODED` hooks amend
//! or reject the claims.

use crate::claims::{ClaimPayload, ROLES_CLAIM};
use crate::config::ManagerConfig;
use crate::dispatcher::{EventDispatcher, HookDispatcher};
use crate::encoder::Encoder;
use crate::error::{DecodeFailure, TokenError};
use crate::events::{JwtCreatedEvent, JwtDecodedEvent, JwtEncodedEvent};
use crate::principal::Principal;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Creates and decodes tokens around a pluggable [`Encoder`].
///
/// The manager is `Sync` and meant to be shared across request handlers.
/// Configuration is read once per `create` call, so a concurrent
/// [`set_identity_field`](Self::set_identity_field) is seen either entirely
/// or not at all by that call.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use xavyo_jwt::{HookDispatcher, JwtManager, SimplePrincipal, UnsignedEncoder};
///
/// let manager = JwtManager::new(UnsignedEncoder::new(), Arc::new(HookDispatcher::new()));
/// let alice = SimplePrincipal::new("alice").with_roles(vec!["ROLE_USER"]);
///
/// let token = manager.create(&alice).unwrap();
/// let claims = manager.decode(&token).unwrap();
///
/// assert_eq!(claims["username"], json!("alice"));
/// assert_eq!(claims["roles"], json!(["ROLE_USER"]));
/// ```
pub struct JwtManager<D = HookDispatcher> {
    encoder: Encoder,
    dispatcher: Arc<D>,
    config: RwLock<ManagerConfig>,
}

impl<D: EventDispatcher> JwtManager<D> {
    /// Create a manager with the default identity configuration.
    pub fn new(encoder: impl Into<Encoder>, dispatcher: Arc<D>) -> Self {
        Self::with_config(encoder, dispatcher, ManagerConfig::default())
    }

    /// Create a manager with an explicit identity configuration.
    pub fn with_config(
        encoder: impl Into<Encoder>,
        dispatcher: Arc<D>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            encoder: encoder.into(),
            dispatcher,
            config: RwLock::new(config),
        }
    }

    /// Create a token for a principal.
    ///
    /// # Errors
    ///
    /// - `TokenError::IdentityResolution` - the principal lacks the identity attribute
    /// - `TokenError::ConfigInvalid` - the identity claim would overwrite `roles`
    /// - `TokenError::Encoding` / `TokenError::UnsupportedHeader` - the encoder failed
    #[instrument(skip_all, fields(encoder = self.encoder.kind()))]
    pub fn create(&self, principal: &dyn Principal) -> Result<String, TokenError> {
        let config = self.config.read().clone();

        let mut payload = ClaimPayload::new();
        payload.insert(ROLES_CLAIM.to_string(), Value::from(principal.roles()));
        add_identity(&config, principal, &mut payload)?;

        let mut created = JwtCreatedEvent::new(payload, principal);
        self.dispatcher.dispatch_created(&mut created);
        let (payload, header) = created.into_parts();

        let token = self.encoder.encode(&payload, &header).map_err(|e| {
            error!(error = %e, "Failed to encode JWT");
            e
        })?;

        let encoded = JwtEncodedEvent::new(token);
        self.dispatcher.dispatch_encoded(&encoded);

        debug!(
            identity_claim = config.identity_claim(),
            claims = payload.len(),
            "Token created"
        );
        Ok(encoded.into_token())
    }

    /// Verify a token and return its claims.
    ///
    /// A token the encoder does not accept, whose payload is empty, or that a
    /// decode hook marks invalid, yields a [`DecodeFailure`]. This is the normal outcome for
    /// bad credentials.
    #[instrument(skip_all, fields(encoder = self.encoder.kind()))]
    pub fn decode(&self, token: &str) -> Result<ClaimPayload, DecodeFailure> {
        let payload = self.encoder.decode(token).map_err(|failure| {
            debug!(reason = %failure, "Encoder rejected token");
            failure
        })?;

        if payload.is_empty() {
            debug!("Encoder returned an empty payload");
            return Err(DecodeFailure::Malformed("Empty token payload".to_string()));
        }

        let mut event = JwtDecodedEvent::new(payload);
        self.dispatcher.dispatch_decoded(&mut event);

        if !event.is_valid() {
            debug!("Token rejected by decode hooks");
            return Err(DecodeFailure::Rejected);
        }

        Ok(event.into_payload())
    }

    /// Principal attribute read as the identity value.
    #[must_use]
    pub fn identity_field(&self) -> String {
        self.config.read().identity_field.clone()
    }

    /// Change the principal attribute read as the identity value.
    pub fn set_identity_field(&self, field: impl Into<String>) {
        self.config.write().identity_field = field.into();
    }

    /// Identity claim override, if configured.
    #[must_use]
    pub fn id_claim(&self) -> Option<String> {
        self.config.read().id_claim.clone()
    }

    /// The encoder in use.
    #[must_use]
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The dispatcher hooks are registered on.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<D> {
        &self.dispatcher
    }
}

/// Write the identity value under the identity claim.
fn add_identity(
    config: &ManagerConfig,
    principal: &dyn Principal,
    payload: &mut ClaimPayload,
) -> Result<(), TokenError> {
    let claim = config.identity_claim();
    if claim == ROLES_CLAIM {
        return Err(TokenError::ConfigInvalid {
            var: "identity_claim".to_string(),
            reason: format!("'{ROLES_CLAIM}' is reserved for the principal's roles"),
        });
    }

    let value = principal
        .attribute(&config.identity_field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| TokenError::IdentityResolution {
            field: config.identity_field.clone(),
        })?;

    payload.insert(claim.to_string(), value);
    Ok(())
}
