//! Manager and encoder configuration.
//!
//! Both structs can be built in code or loaded from environment variables.

use crate::claims::DEFAULT_IDENTITY_FIELD;
use crate::error::TokenError;
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default token time-to-live in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Identity claim configuration for [`JwtManager`](crate::JwtManager).
///
/// Deserializes from a settings file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Principal attribute read as the identity value.
    pub identity_field: String,
    /// Claim name the identity value is written under. Falls back to
    /// `identity_field` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_claim: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            id_claim: None,
        }
    }
}

impl ManagerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `JWT_USER_IDENTITY_FIELD`: principal attribute (default: "username")
    /// - `JWT_USER_ID_CLAIM`: identity claim override
    pub fn from_env() -> Result<Self, TokenError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identity_field = match lookup("JWT_USER_IDENTITY_FIELD") {
            Some(v) => non_empty("JWT_USER_IDENTITY_FIELD", v)?,
            None => DEFAULT_IDENTITY_FIELD.to_string(),
        };

        let id_claim = lookup("JWT_USER_ID_CLAIM")
            .map(|v| non_empty("JWT_USER_ID_CLAIM", v))
            .transpose()?;

        Ok(Self {
            identity_field,
            id_claim,
        })
    }

    /// Set the principal attribute used as identity.
    #[must_use]
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    /// Set the identity claim override.
    #[must_use]
    pub fn with_id_claim(mut self, claim: impl Into<String>) -> Self {
        self.id_claim = Some(claim.into());
        self
    }

    /// Claim name the identity value is written under. An empty override
    /// counts as unset.
    #[must_use]
    pub fn identity_claim(&self) -> &str {
        self.id_claim
            .as_deref()
            .filter(|claim| !claim.is_empty())
            .unwrap_or(&self.identity_field)
    }
}

/// Key material and validation settings for
/// [`SignedEncoder`](crate::SignedEncoder).
#[derive(Clone)]
pub struct EncoderConfig {
    /// Signature algorithm.
    pub algorithm: Algorithm,
    /// HMAC secret, or PEM-encoded private key for asymmetric algorithms.
    pub secret_key: Vec<u8>,
    /// PEM-encoded public key for asymmetric algorithms.
    pub public_key: Option<Vec<u8>>,
    /// Lifetime stamped into `exp` when the payload has none. `None`
    /// leaves expiry to hooks.
    pub token_ttl: Option<u64>,
    /// Leeway in seconds for exp/nbf validation (clock skew tolerance).
    pub clock_skew: u64,
    /// Expected issuer (if set, tokens without a matching issuer are rejected).
    pub issuer: Option<String>,
    /// Expected audience (if set, tokens without a matching audience are rejected).
    pub audience: Option<Vec<String>>,
}

impl fmt::Debug for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderConfig")
            .field("algorithm", &self.algorithm)
            .field("secret_key", &"<redacted>")
            .field("public_key", &self.public_key.as_ref().map(|_| "<pem>"))
            .field("token_ttl", &self.token_ttl)
            .field("clock_skew", &self.clock_skew)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Check if an algorithm signs with a shared secret.
#[must_use]
pub fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

impl EncoderConfig {
    /// HMAC configuration with a shared secret.
    #[must_use]
    pub fn hmac(algorithm: Algorithm, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            secret_key: secret.into(),
            public_key: None,
            token_ttl: Some(DEFAULT_TOKEN_TTL_SECS),
            clock_skew: 0,
            issuer: None,
            audience: None,
        }
    }

    /// Asymmetric configuration from PEM-encoded keys.
    #[must_use]
    pub fn asymmetric(
        algorithm: Algorithm,
        private_key_pem: impl Into<Vec<u8>>,
        public_key_pem: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            public_key: Some(public_key_pem.into()),
            ..Self::hmac(algorithm, private_key_pem)
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `JWT_SECRET_KEY`: HMAC secret, or path to a PEM private key
    ///
    /// Optional:
    /// - `JWT_SIGNATURE_ALGORITHM`: default RS256
    /// - `JWT_PUBLIC_KEY`: path to a PEM public key (required unless HMAC)
    /// - `JWT_TOKEN_TTL`: seconds, default 3600, `0` disables
    /// - `JWT_CLOCK_SKEW`: seconds, default 0
    /// - `JWT_ISSUER`: expected and stamped issuer
    /// - `JWT_AUDIENCE`: comma-separated expected audience
    pub fn from_env() -> Result<Self, TokenError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = match lookup("JWT_SIGNATURE_ALGORITHM") {
            Some(v) => Algorithm::from_str(v.trim()).map_err(|_| TokenError::ConfigInvalid {
                var: "JWT_SIGNATURE_ALGORITHM".to_string(),
                reason: format!("Unknown algorithm: {v}"),
            })?,
            None => Algorithm::RS256,
        };

        let secret = lookup("JWT_SECRET_KEY").ok_or_else(|| TokenError::ConfigMissing {
            var: "JWT_SECRET_KEY".to_string(),
        })?;

        let mut config = if is_hmac(algorithm) {
            Self::hmac(algorithm, non_empty("JWT_SECRET_KEY", secret)?.into_bytes())
        } else {
            let public =
                lookup("JWT_PUBLIC_KEY").ok_or_else(|| TokenError::ConfigMissing {
                    var: "JWT_PUBLIC_KEY".to_string(),
                })?;
            Self::asymmetric(
                algorithm,
                read_key_file("JWT_SECRET_KEY", &secret)?,
                read_key_file("JWT_PUBLIC_KEY", &public)?,
            )
        };

        if let Some(v) = lookup("JWT_TOKEN_TTL") {
            let ttl = parse_secs("JWT_TOKEN_TTL", &v)?;
            config.token_ttl = (ttl > 0).then_some(ttl);
        }

        if let Some(v) = lookup("JWT_CLOCK_SKEW") {
            config.clock_skew = parse_secs("JWT_CLOCK_SKEW", &v)?;
        }

        config.issuer = lookup("JWT_ISSUER").filter(|v| !v.is_empty());
        config.audience = lookup("JWT_AUDIENCE")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|aud| !aud.is_empty());

        Ok(config)
    }

    /// Set the token lifetime in seconds.
    #[must_use]
    pub fn with_ttl(mut self, secs: u64) -> Self {
        self.token_ttl = Some(secs);
        self
    }

    /// Do not stamp `iat`/`exp` on encode.
    #[must_use]
    pub fn without_ttl(mut self) -> Self {
        self.token_ttl = None;
        self
    }

    /// Set the clock skew tolerance in seconds.
    #[must_use]
    pub fn with_clock_skew(mut self, secs: u64) -> Self {
        self.clock_skew = secs;
        self
    }

    /// Set the expected issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.issuer = Some(iss.into());
        self
    }

    /// Set the expected audience.
    #[must_use]
    pub fn audience(mut self, aud: Vec<impl Into<String>>) -> Self {
        self.audience = Some(aud.into_iter().map(Into::into).collect());
        self
    }
}

fn non_empty(var: &str, value: String) -> Result<String, TokenError> {
    if value.trim().is_empty() {
        return Err(TokenError::ConfigInvalid {
            var: var.to_string(),
            reason: "Value must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn parse_secs(var: &str, value: &str) -> Result<u64, TokenError> {
    value.trim().parse().map_err(|_| TokenError::ConfigInvalid {
        var: var.to_string(),
        reason: format!("Expected a number of seconds, got '{value}'"),
    })
}

fn read_key_file(var: &str, path: &str) -> Result<Vec<u8>, TokenError> {
    std::fs::read(path).map_err(|e| TokenError::ConfigInvalid {
        var: var.to_string(),
        reason: format!("Cannot read key file {path}: {e}"),
    })
}
