//! Credential wrappers built on the secrecy crate
//!
//! Database passwords and git tokens are held in [`SecretString`] so they
//! are zeroed on drop and print as `[REDACTED]` in debug output.
//!
//! # Example
//!
//! ```rust
//! use object_tracker::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("tiger");
//! assert_eq!(password.expose_secret().as_ref(), "tiger");
//! assert!(!format!("{password:?}").contains("tiger"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload that can live inside a [`Secret`]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A string secret; access requires `expose_secret()`
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string into a [`SecretString`]
pub fn secret_string(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue::from(value.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_debug_is_redacted() {
        let secret = secret_string("hunter2");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_expose_secret() {
        let secret = secret_string("hunter2");
        assert_eq!(secret.expose_secret().as_ref(), "hunter2");
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            password: SecretString,
        }

        let parsed: Wrapper = toml::from_str("password = \"tiger\"").unwrap();
        assert_eq!(parsed.password.expose_secret().as_ref(), "tiger");
    }
}
