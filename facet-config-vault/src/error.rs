use core::fmt;

use serde_json::Value;

use crate::ClientError;

/// Error setting up a [`VaultProvider`](crate::VaultProvider).
#[derive(Debug)]
#[non_exhaustive]
pub enum VaultError {
    /// Not exactly one authentication method is configured
    InvalidAuthConfig,
    /// The client could not be set up for the store's address
    Connection(ClientError),
    /// Logging in failed
    Auth(ClientError),
    /// Reading the secret failed
    SecretFetch(ClientError),
    /// The secret holds a value that is not a string
    SecretValueType {
        /// Key of the offending value
        key: String,
        /// The value itself
        value: Value,
    },
    /// Two keys of the secret are the same once upper-cased
    DuplicateKey {
        /// The key as the secret spells it
        key: String,
        /// The upper-cased key it collides on
        normalized: String,
    },
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultError::InvalidAuthConfig => {
                write!(f, "Exactly one of AppRole or Kubernetes auth must be configured")
            }
            VaultError::Connection(e) => write!(f, "Could not connect to the secret store: {e}"),
            VaultError::Auth(e) => write!(f, "Could not authenticate with the secret store: {e}"),
            VaultError::SecretFetch(e) => write!(f, "Could not read secret: {e}"),
            // The value is left out: it may well be a secret.
            VaultError::SecretValueType { key, value } => write!(
                f,
                "Secret '{key}' holds a {}, expected a string",
                kind_of(value)
            ),
            VaultError::DuplicateKey { key, normalized } => {
                write!(f, "Secret key '{key}' collides with another key as '{normalized}'")
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl core::error::Error for VaultError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            VaultError::Connection(e) | VaultError::Auth(e) | VaultError::SecretFetch(e) => {
                Some(e.as_ref())
            }
            VaultError::InvalidAuthConfig
            | VaultError::SecretValueType { .. }
            | VaultError::DuplicateKey { .. } => None,
        }
    }
}
