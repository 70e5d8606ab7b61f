#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod error;
mod options;

pub use error::VaultError;
pub use options::{AppRoleAuth, AuthMethod, KubernetesAuth, VaultOptions};

use std::collections::HashMap;
use std::time::Duration;

use facet_config::{ConfigPath, Provider, ProviderError};
use log::{debug, trace};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

/// Error returned by a [`SecretClient`].
pub type ClientError = Box<dyn core::error::Error + Send + Sync>;

/// The calls [`VaultProvider`] makes against a secret store.
///
/// Implement this over whatever HTTP client the application already uses.
pub trait SecretClient {
    /// Points the client at `url`; every later request uses `request_timeout`.
    fn initialize(&mut self, url: &str, request_timeout: Duration) -> Result<(), ClientError>;

    /// Logs in with AppRole credentials.
    fn app_role_login(&mut self, role_id: &str, secret_id: &str) -> Result<(), ClientError>;

    /// Logs in with a Kubernetes service account token.
    fn kubernetes_login(&mut self, jwt: &str, role: &str) -> Result<(), ClientError>;

    /// Reads every key of the secret at `path` in the KV engine mounted at
    /// `mount_path`.
    fn get_values(&mut self, path: &str, mount_path: &str) -> Result<Map<String, Value>, ClientError>;
}

/// Resolves paths against a secret read once from a secret store.
///
/// Path segments are joined with `_` and upper-cased, so `["db", "password"]`
/// reads the key `DB_PASSWORD`. Keys of the secret are upper-cased too, which
/// makes the lookup case-insensitive. Keys that are absent resolve to an empty
/// string.
#[derive(Clone, Default)]
pub struct VaultProvider {
    data: HashMap<String, String>,
}

impl VaultProvider {
    /// Validates `options`, logs in through `client` and reads the secret.
    ///
    /// This is the only time the store is contacted.
    pub fn connect(mut client: impl SecretClient, options: &VaultOptions) -> Result<Self, VaultError> {
        let auth = options.validate()?;
        setup_client(&mut client, options, auth)?;
        let data = fetch_secret(&mut client, options)?;
        Self::from_data(data)
    }

    /// Builds a provider over already-fetched key/value pairs.
    ///
    /// Two keys that only differ in case would shadow each other once
    /// upper-cased, so they are rejected.
    pub fn from_data<I, K, V>(data: I) -> Result<Self, VaultError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (key, value) in data {
            let key = key.as_ref();
            let upper = key.to_uppercase();
            if map.insert(upper.clone(), value.into()).is_some() {
                return Err(VaultError::DuplicateKey {
                    key: key.to_string(),
                    normalized: upper,
                });
            }
        }
        Ok(Self { data: map })
    }

    /// The key this provider looks up for `path`.
    pub fn key_for(path: &ConfigPath) -> String {
        path.segments().join("_").to_uppercase()
    }

    /// Number of keys in the secret.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the secret has no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl core::fmt::Debug for VaultProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut keys: Vec<&String> = self.data.keys().collect();
        keys.sort();
        f.debug_struct("VaultProvider").field("keys", &keys).finish()
    }
}

impl Provider for VaultProvider {
    fn name(&self) -> &str {
        "vault"
    }

    fn resolve(&self, path: &ConfigPath) -> Result<String, ProviderError> {
        let key = Self::key_for(path);
        match self.data.get(&key) {
            Some(value) => Ok(value.clone()),
            None => {
                trace!("No secret {} for {}", key.cyan(), path.yellow());
                Ok(String::new())
            }
        }
    }
}

fn setup_client(
    client: &mut impl SecretClient,
    options: &VaultOptions,
    auth: AuthMethod<'_>,
) -> Result<(), VaultError> {
    client
        .initialize(&options.url, options.request_timeout)
        .map_err(VaultError::Connection)?;

    let login = match auth {
        AuthMethod::AppRole(creds) => {
            debug!("Logging in to {} with AppRole", options.url.blue());
            client.app_role_login(&creds.role_id, &creds.secret_id)
        }
        AuthMethod::Kubernetes(creds) => {
            debug!("Logging in to {} as Kubernetes role {}", options.url.blue(), creds.role.cyan());
            client.kubernetes_login(&creds.jwt, &creds.role)
        }
    };
    login.map_err(VaultError::Auth)
}

fn fetch_secret(
    client: &mut impl SecretClient,
    options: &VaultOptions,
) -> Result<Vec<(String, String)>, VaultError> {
    let values = client
        .get_values(&options.path, &options.mount_path)
        .map_err(VaultError::SecretFetch)?;

    let data = values
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            value => Err(VaultError::SecretValueType { key, value }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Read {} keys from {}/{}",
        data.len(),
        options.mount_path.blue(),
        options.path.blue()
    );
    Ok(data)
}
