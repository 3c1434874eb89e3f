//! Authentication module for the CLU client.
//!
//! The prediction endpoint authenticates with a resource subscription key
//! sent in the `Ocp-Apim-Subscription-Key` header.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use crate::config::key_hint;
use crate::errors::CluError;

/// Header carrying the subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Authentication provider trait.
///
/// Implementations of this trait provide authentication credentials
/// for API requests.
pub trait AuthProvider: Send + Sync {
    /// Apply authentication to request headers.
    fn apply_auth(&self, headers: &mut HashMap<String, String>);

    /// Get the authentication scheme name.
    fn scheme(&self) -> &str;

    /// Validate the credentials.
    fn validate(&self) -> Result<(), CluError>;
}

/// Subscription key authentication provider.
pub struct SubscriptionKeyAuth {
    key: SecretString,
}

impl SubscriptionKeyAuth {
    /// Creates a new subscription key provider.
    pub fn new(key: SecretString) -> Self {
        Self { key }
    }

    /// Creates from a string key.
    pub fn from_string(key: impl Into<String>) -> Self {
        Self {
            key: SecretString::new(key.into()),
        }
    }

    /// Gets a hint of the key for debugging (last 4 characters).
    pub fn key_hint(&self) -> String {
        key_hint(self.key.expose_secret())
    }
}

impl AuthProvider for SubscriptionKeyAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            SUBSCRIPTION_KEY_HEADER.to_string(),
            self.key.expose_secret().clone(),
        );
    }

    fn scheme(&self) -> &str {
        "SubscriptionKey"
    }

    fn validate(&self) -> Result<(), CluError> {
        let key = self.key.expose_secret();

        if key.is_empty() {
            return Err(CluError::configuration("Subscription key cannot be empty"));
        }

        if key.chars().any(char::is_whitespace) {
            return Err(CluError::configuration(
                "Subscription key cannot contain whitespace",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for SubscriptionKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionKeyAuth")
            .field("key", &"[REDACTED]")
            .field("key_hint", &self.key_hint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_key_apply() {
        let auth = SubscriptionKeyAuth::from_string("0123456789abcdef");
        let mut headers = HashMap::new();

        auth.apply_auth(&mut headers);

        assert_eq!(
            headers.get(SUBSCRIPTION_KEY_HEADER),
            Some(&"0123456789abcdef".to_string())
        );
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn test_subscription_key_scheme() {
        let auth = SubscriptionKeyAuth::from_string("key");
        assert_eq!(auth.scheme(), "SubscriptionKey");
    }

    #[test]
    fn test_validate() {
        assert!(SubscriptionKeyAuth::from_string("0123456789abcdef")
            .validate()
            .is_ok());
        assert!(SubscriptionKeyAuth::from_string("").validate().is_err());
        assert!(SubscriptionKeyAuth::from_string("abc def").validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let auth = SubscriptionKeyAuth::from_string("0123456789abcdef");
        let debug_str = format!("{:?}", auth);

        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("...cdef"));
        assert!(!debug_str.contains("0123456789abcdef"));
    }
}
