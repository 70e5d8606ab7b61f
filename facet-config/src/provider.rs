use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use log::{debug, trace};
use owo_colors::OwoColorize;

use crate::{ConfigError, ConfigErrorKind, ConfigPath, ProviderError};

/// A source of configuration values.
///
/// A provider answers one question: what value corresponds to this path. It
/// returns `Ok(String::new())` when it has no value, and reserves `Err` for
/// genuine failures (I/O, malformed backing data). How it gets at its data is
/// its own business; so is caching.
pub trait Provider {
    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }

    /// Resolves `path`, which is never empty.
    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        (**self).resolve(path)
    }
}

impl<P: Provider + ?Sized> Provider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        (**self).resolve(path)
    }
}

/// Providers in registration order.
///
/// Every provider is asked about every path, even after an earlier one has
/// answered: a later non-empty answer overrides an earlier one, an empty
/// answer never does. The first error stops the lookup.
#[derive(Default)]
pub struct ProviderChain<'p> {
    providers: Vec<Box<dyn Provider + 'p>>,
}

impl<'p> ProviderChain<'p> {
    /// An empty chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Appends a provider; it takes precedence over everything already registered.
    pub fn push(&mut self, provider: impl Provider + 'p) {
        debug!(
            "Registering provider {} at position {}",
            provider.name().cyan(),
            self.providers.len()
        );
        self.providers.push(Box::new(provider));
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }

    /// Resolves `path` against every provider. An empty string means no
    /// provider had a value.
    pub fn resolve(&self, path: &ConfigPath) -> Result<String, ConfigError> {
        let mut value = String::new();
        for provider in &self.providers {
            let candidate = provider.resolve(path).map_err(|source| {
                debug!(
                    "Provider {} failed on {}: {}",
                    provider.name().cyan(),
                    path.yellow(),
                    source.red()
                );
                ConfigError::new(
                    ConfigErrorKind::Provider {
                        provider: provider.name().to_string(),
                        source,
                    },
                    path.clone(),
                )
            })?;
            if candidate.is_empty() {
                trace!("{} has nothing for {}", provider.name().cyan(), path.yellow());
                continue;
            }
            trace!("{} answers {}", provider.name().cyan(), path.yellow());
            value = candidate;
        }
        Ok(value)
    }
}
