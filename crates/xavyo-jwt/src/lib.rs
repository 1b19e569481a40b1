//! JWT issuance and verification pipeline for xavyo.
//!
//! This crate provides:
//! - [`JwtManager`], which builds a token payload from a principal and
//!   verifies presented tokens
//! - Ordered hooks at three extension points (`JWT_CREATED`, `JWT_ENCODED`,
//!   `JWT_DECODED`) through [`HookDispatcher`]
//! - Swappable encoders: [`SignedEncoder`] (HMAC/RSA/EC/EdDSA via
//!   `jsonwebtoken`) and the unsigned reference [`UnsignedEncoder`]
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use xavyo_jwt::{
//!     Algorithm, EncoderConfig, HookDispatcher, JwtManager, SignedEncoder, SimplePrincipal,
//! };
//!
//! let encoder = SignedEncoder::new(&EncoderConfig::hmac(Algorithm::HS256, "change-me"))?;
//! let dispatcher = Arc::new(HookDispatcher::new());
//! dispatcher.subscribe_created("issuer", 0, |event| {
//!     event.data_mut().insert("iss".to_string(), json!("xavyo"));
//! });
//!
//! let manager = JwtManager::new(encoder, dispatcher);
//! let token = manager.create(&SimplePrincipal::new("alice").with_roles(vec!["ROLE_USER"]))?;
//!
//! let claims = manager.decode(&token).expect("token verifies");
//! assert_eq!(claims["iss"], json!("xavyo"));
//! # Ok::<(), xavyo_jwt::TokenError>(())
//! ```

pub mod claims;
pub mod config;
pub mod dispatcher;
pub mod encoder;
mod error;
pub mod events;
pub mod hooks;
mod manager;
mod principal;

// Re-export public API
pub use claims::{ClaimPayload, ClaimsExt, HeaderMap};
pub use config::{EncoderConfig, ManagerConfig};
pub use dispatcher::{EventDispatcher, HookDispatcher, DEFAULT_PRIORITY};
pub use encoder::signed::extract_kid;
pub use encoder::{Encoder, HeaderAwareJwtEncoder, JwtEncoder, SignedEncoder, UnsignedEncoder};
pub use error::{DecodeFailure, TokenError};
pub use events::{Channel, JwtCreatedEvent, JwtDecodedEvent, JwtEncodedEvent};
pub use manager::JwtManager;
pub use principal::{Principal, SimplePrincipal};

pub use jsonwebtoken::Algorithm;
