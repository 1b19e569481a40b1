//! Principal capability.
//!
//! The manager never inspects a concrete user type. It asks the principal
//! for its roles and for one attribute, looked up by a configurable name.
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Value};
//! use xavyo_jwt::Principal;
//!
//! struct Account {
//!     login: String,
//!     email: String,
//! }
//!
//! impl Principal for Account {
//!     fn roles(&self) -> Vec<String> {
//!         vec!["ROLE_USER".to_string()]
//!     }
//!
//!     fn attribute(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "username" => Some(json!(self.login)),
//!             "email" => Some(json!(self.email)),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use serde_json::{Map, Value};

/// Capability surface of an authenticated entity.
///
/// This trait is object-safe; events carry it as `&dyn Principal`.
pub trait Principal: Send + Sync {
    /// Roles granted to the principal.
    fn roles(&self) -> Vec<String>;

    /// Read a named attribute. Returns `None` if the attribute does not
    /// exist or cannot be read.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// In-memory principal backed by a JSON attribute map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimplePrincipal {
    roles: Vec<String>,
    attributes: Map<String, Value>,
}

impl SimplePrincipal {
    /// Create a principal with a `username` attribute.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self::default().with_attribute("username", Value::String(username.into()))
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the roles.
    #[must_use]
    pub fn with_roles(mut self, roles: Vec<impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Add a single role.
    #[must_use]
    pub fn add_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

impl Principal for SimplePrincipal {
    fn roles(&self) -> Vec<String> {
        self.roles.clone()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_principal_attributes() {
        let principal = SimplePrincipal::new("alice")
            .with_attribute("email", "alice@example.com")
            .with_attribute("uid", 42);

        assert_eq!(principal.attribute("username"), Some(json!("alice")));
        assert_eq!(
            principal.attribute("email"),
            Some(json!("alice@example.com"))
        );
        assert_eq!(principal.attribute("uid"), Some(json!(42)));
        assert_eq!(principal.attribute("phone"), None);
    }

    #[test]
    fn test_simple_principal_roles() {
        let principal = SimplePrincipal::new("bob")
            .with_roles(vec!["ROLE_USER"])
            .add_role("ROLE_ADMIN");

        assert_eq!(principal.roles(), vec!["ROLE_USER", "ROLE_ADMIN"]);
    }

    #[test]
    fn test_trait_is_object_safe() {
        let principal = SimplePrincipal::new("carol");
        let dyn_principal: &dyn Principal = &principal;
        assert_eq!(dyn_principal.attribute("username"), Some(json!("carol")));
    }
}
