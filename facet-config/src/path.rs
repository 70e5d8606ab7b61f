use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// The fully-qualified path of a configuration leaf: the segments declared by
/// every record on the way from the root down to the field, in that order.
///
/// Providers receive this as-is. A path handed to a provider is never empty.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// The empty path of the root record.
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Builds a path out of already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the path of a child: this path followed by `declared`.
    ///
    /// Segments are appended verbatim, never reordered or deduplicated.
    pub fn join<S: AsRef<str>>(&self, declared: &[S]) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + declared.len());
        segments.extend(self.segments.iter().cloned());
        segments.extend(declared.iter().map(|s| s.as_ref().to_string()));
        Self { segments }
    }

    /// The segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Iterates over the segments as string slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments joined with dots, e.g. `database.primary.url`.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "$");
        }
        write!(f, "{}", self.dotted())
    }
}

impl fmt::Debug for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.segments.iter()).finish()
    }
}

impl<const N: usize> PartialEq<[&str; N]> for ConfigPath {
    fn eq(&self, other: &[&str; N]) -> bool {
        self.segments.iter().map(String::as_str).eq(other.iter().copied())
    }
}

impl PartialEq<[&str]> for ConfigPath {
    fn eq(&self, other: &[&str]) -> bool {
        self.segments.iter().map(String::as_str).eq(other.iter().copied())
    }
}

/// A declared path that contains an empty segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmptySegment;

/// Splits a declared path attribute such as `"super.secret.password"` into
/// its segments. Every segment must be non-empty.
pub(crate) fn split_declared(declared: &str) -> Result<Vec<String>, EmptySegment> {
    declared
        .split('.')
        .map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                Err(EmptySegment)
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}
