#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod error;

pub use error::JsonError;

use std::io::Read;
use std::path::Path;

use facet_config::{ConfigPath, Provider, ProviderError};
use log::{debug, trace};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

/// Resolves paths against a JSON5 document.
///
/// Each path segment selects a key of the object reached so far, so
/// `["db", "url"]` reads `{"db": {"url": "..."}}`. A missing key, or a segment
/// that would have to look inside something that is not an object, resolves
/// to an empty string, and so does `null`. A string is returned as-is. Any
/// other value at the end of the path is an error: only strings are
/// configuration values.
#[derive(Debug, Clone)]
pub struct JsonProvider {
    root: Map<String, Value>,
}

impl JsonProvider {
    /// Parses a JSON5 document whose top level is an object.
    ///
    /// Plain JSON is valid JSON5, so comments, trailing commas, unquoted keys
    /// and single-quoted strings are accepted on top of it.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, JsonError> {
        let root = json5::from_str::<Map<String, Value>>(json).map_err(JsonError::Parse)?;
        Ok(Self::from_map(root))
    }

    /// Parses a document from raw bytes, which must be UTF-8.
    pub fn from_slice(json: &[u8]) -> Result<Self, JsonError> {
        let json = core::str::from_utf8(json).map_err(JsonError::Utf8)?;
        Self::from_str(json)
    }

    /// Reads and parses a document.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, JsonError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents).map_err(JsonError::Io)?;
        Self::from_str(&contents)
    }

    /// Reads and parses the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, JsonError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display().blue());
        let contents = std::fs::read_to_string(path).map_err(JsonError::Io)?;
        Self::from_str(&contents)
    }

    /// Wraps an already-parsed document.
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Finds the value at `path`, if any.
    fn lookup(&self, path: &ConfigPath) -> Option<&Value> {
        let mut segments = path.iter();
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

impl Provider for JsonProvider {
    fn name(&self) -> &str {
        "json"
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        match self.lookup(path) {
            None | Some(Value::Null) => {
                trace!("No JSON value at {}", path.yellow());
                Ok(String::new())
            }
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(Box::new(JsonError::InvalidValue(other.clone()))),
        }
    }
}
