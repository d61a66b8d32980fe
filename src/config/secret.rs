//! Raw Data API token storage
//!
//! Tokens live in a [`SecretString`]: zeroed on drop, redacted in `Debug`.
//!
//! # Example
//!
//! ```rust
//! use hdxctl::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("my-token".to_string());
//! assert_eq!(token.expose_secret().as_ref(), "my-token");
//! assert!(!format!("{token:?}").contains("my-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// Token text held inside a [`SecretString`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// True for an empty or whitespace-only token
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self)
    }
}

/// Access token as stored in [`ApiConfig`](super::ApiConfig)
pub type SecretString = Secret<SecretValue>;

/// Wraps a String in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_token_is_exposed_on_request() {
        let token = secret_string("hot-osm-token".to_string());
        assert_eq!(token.expose_secret().as_ref(), "hot-osm-token");
    }

    #[test]
    fn test_token_redacted_in_config_debug() {
        let api = crate::config::ApiConfig {
            access_token: Some(secret_string("hot-osm-token".to_string())),
            ..Default::default()
        };
        assert!(!format!("{api:?}").contains("hot-osm-token"));
    }

    #[test]
    fn test_secret_is_blank() {
        assert!(secret_string("  ".to_string()).expose_secret().is_blank());
        assert!(!secret_string("x".to_string()).expose_secret().is_blank());
    }

    #[test]
    fn test_secret_deserialize() {
        #[derive(Deserialize)]
        struct Api {
            access_token: SecretString,
        }

        let api: Api = toml::from_str("access_token = \"abc\"").unwrap();
        assert_eq!(api.access_token.expose_secret().as_ref(), "abc");
    }
}
