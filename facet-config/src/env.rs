use alloc::string::String;
use alloc::vec::Vec;
use std::collections::HashMap;

use crate::{ConfigPath, Provider, ProviderError};

/// Reads values from environment variables.
///
/// A path maps to a variable name by replacing `.` with `_` inside each
/// segment, joining the segments with `_`, and upper-casing the result:
/// `["database", "url"]` reads `DATABASE_URL`. An optional prefix is prepended
/// the same way (`APP` gives `APP_DATABASE_URL`).
///
/// Unset variables, and variables that are not valid unicode, resolve to an
/// empty string.
#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    prefix: Option<String>,
    source: EnvSource,
}

#[derive(Debug, Clone, Default)]
enum EnvSource {
    /// The live process environment
    #[default]
    Process,
    /// A captured set of variables
    Snapshot(HashMap<String, String>),
}

impl EnvProvider {
    /// Reads the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the process environment, with every variable name prefixed by
    /// `prefix` and an underscore.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new().prefixed(prefix)
    }

    /// Reads from the given variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: None,
            source: EnvSource::Snapshot(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Sets the prefix.
    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The variable this provider reads for `path`.
    pub fn variable_name(&self, path: &ConfigPath) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(path.len() + 1);
        if let Some(prefix) = &self.prefix {
            parts.push(prefix.replace('.', "_"));
        }
        parts.extend(path.iter().map(|segment| segment.replace('.', "_")));
        parts.join("_").to_uppercase()
    }
}

impl Provider for EnvProvider {
    fn name(&self) -> &str {
        "env"
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        let name = self.variable_name(path);
        let value = match &self.source {
            EnvSource::Process => std::env::var(&name).unwrap_or_default(),
            EnvSource::Snapshot(vars) => vars.get(&name).cloned().unwrap_or_default(),
        };
        Ok(value)
    }
}
