use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

use crate::ConfigPath;

/// The error type providers return from [`Provider::resolve`](crate::Provider::resolve).
///
/// The engine never inspects it: it is carried inside [`ConfigErrorKind::Provider`]
/// and handed back to the caller unchanged.
pub type ProviderError = Box<dyn core::error::Error + Send + Sync>;

/// Error populating a configuration struct.
pub struct ConfigError {
    /// Type of error
    pub kind: ConfigErrorKind,
    /// Path of the field being processed when the error occurred
    path: ConfigPath,
}

/// Type of error.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    /// A field is neither a `String` nor a (boxed) struct
    SchemaType {
        /// Name of the offending field
        field: String,
        /// Its type, as facet describes it
        type_name: String,
    },
    /// A provider failed while resolving a path
    Provider {
        /// Name of the provider that failed
        provider: String,
        /// The provider's error, untouched
        source: ProviderError,
    },
    /// A `required` field got no value from any provider and has no fallback
    MissingSource {
        /// Name of the field
        field: String,
    },
    /// A `path` attribute contains an empty segment
    InvalidPath {
        /// Name of the field
        field: String,
        /// The attribute as written
        declared: String,
    },
    /// The type handed to the engine is not a struct
    NotARecord {
        /// The type we got instead
        type_name: String,
    },
    /// Any error from facet
    Reflect(String),
}

impl ConfigError {
    /// Create a new error.
    pub fn new(kind: ConfigErrorKind, path: ConfigPath) -> Self {
        Self { kind, path }
    }

    pub(crate) fn reflect(error: impl fmt::Display, path: &ConfigPath) -> Self {
        Self::new(ConfigErrorKind::Reflect(error.to_string()), path.clone())
    }

    /// Path of the field being processed when the error occurred.
    pub fn path(&self) -> &ConfigPath {
        &self.path
    }

    /// The provider's own error, if a provider is what failed.
    pub fn provider_error(&self) -> Option<&(dyn core::error::Error + Send + Sync + 'static)> {
        match &self.kind {
            ConfigErrorKind::Provider { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Consumes the error, returning the provider's own error if a provider is what failed.
    pub fn into_provider_error(self) -> Result<ProviderError, Self> {
        match self.kind {
            ConfigErrorKind::Provider { source, .. } => Ok(source),
            kind => Err(Self::new(kind, self.path)),
        }
    }

    /// The message for this specific error.
    pub fn message(&self) -> String {
        match &self.kind {
            ConfigErrorKind::SchemaType { field, type_name } => format!(
                "Field '{field}' has type '{type_name}', expected String or a nested struct"
            ),
            ConfigErrorKind::Provider { provider, source } => {
                format!("Provider '{provider}' failed: {source}")
            }
            ConfigErrorKind::MissingSource { field } => {
                format!("No provider value or fallback for required field '{field}'")
            }
            ConfigErrorKind::InvalidPath { field, declared } => {
                format!("Field '{field}' declares an invalid path '{declared}'")
            }
            ConfigErrorKind::NotARecord { type_name } => {
                format!("Expected a struct, got '{type_name}'")
            }
            ConfigErrorKind::Reflect(message) => {
                format!("Error while reflecting type: {message}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message(), self.path)
    }
}

impl fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl core::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            ConfigErrorKind::Provider { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
