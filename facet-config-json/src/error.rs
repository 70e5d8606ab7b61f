use core::fmt;

use serde_json::Value;

/// Error loading or reading a JSON configuration document.
#[derive(Debug)]
#[non_exhaustive]
pub enum JsonError {
    /// The document could not be read
    Io(std::io::Error),
    /// The document is not valid UTF-8
    Utf8(core::str::Utf8Error),
    /// The document is not a JSON5 object
    Parse(json5::Error),
    /// A path leads to something other than a string or `null`
    InvalidValue(Value),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::Io(e) => write!(f, "Could not read JSON document: {e}"),
            JsonError::Utf8(e) => write!(f, "JSON document is not UTF-8: {e}"),
            JsonError::Parse(e) => write!(f, "Invalid JSON document: {e}"),
            JsonError::InvalidValue(value) => write!(f, "got invalid value: {value}"),
        }
    }
}

impl core::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            JsonError::Io(e) => Some(e),
            JsonError::Utf8(e) => Some(e),
            JsonError::Parse(e) => Some(e),
            JsonError::InvalidValue(_) => None,
        }
    }
}
