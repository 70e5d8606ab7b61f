use core::fmt;
use core::time::Duration;

use crate::VaultError;

const SECRET_MASK: &str = "******";

/// Where the secrets live and how to authenticate.
#[derive(Debug, Clone)]
pub struct VaultOptions {
    /// Address of the secret store, e.g. `https://vault.internal:8200`
    pub url: String,
    /// Mount path of the KV engine
    pub mount_path: String,
    /// Path of the secret inside the mount
    pub path: String,
    /// Timeout applied to every request made to the store
    pub request_timeout: Duration,
    /// AppRole credentials
    pub app_role_auth: Option<AppRoleAuth>,
    /// Kubernetes service account credentials
    pub kubernetes_auth: Option<KubernetesAuth>,
}

impl Default for VaultOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            mount_path: String::new(),
            path: String::new(),
            request_timeout: Duration::from_secs(15),
            app_role_auth: None,
            kubernetes_auth: None,
        }
    }
}

/// The authentication method selected by a valid set of options.
#[derive(Debug, Clone, Copy)]
pub enum AuthMethod<'a> {
    /// Log in with a role id and a secret id
    AppRole(&'a AppRoleAuth),
    /// Log in with a service account token
    Kubernetes(&'a KubernetesAuth),
}

impl VaultOptions {
    /// Checks that exactly one authentication method is configured and
    /// returns it.
    pub fn validate(&self) -> Result<AuthMethod<'_>, VaultError> {
        match (&self.app_role_auth, &self.kubernetes_auth) {
            (Some(app_role), None) => Ok(AuthMethod::AppRole(app_role)),
            (None, Some(kubernetes)) => Ok(AuthMethod::Kubernetes(kubernetes)),
            _ => Err(VaultError::InvalidAuthConfig),
        }
    }
}

/// AppRole credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AppRoleAuth {
    /// The role id
    pub role_id: String,
    /// The secret id, masked in debug output
    pub secret_id: String,
}

impl fmt::Debug for AppRoleAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppRoleAuth")
            .field("role_id", &self.role_id)
            .field("secret_id", &SECRET_MASK)
            .finish()
    }
}

/// Kubernetes service account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct KubernetesAuth {
    /// The service account token, masked in debug output
    pub jwt: String,
    /// The role to log in as
    pub role: String,
}

impl fmt::Debug for KubernetesAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubernetesAuth")
            .field("jwt", &SECRET_MASK)
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_role() -> AppRoleAuth {
        AppRoleAuth {
            role_id: "test-role-id".to_string(),
            secret_id: "test-secret-id".to_string(),
        }
    }

    fn kubernetes() -> KubernetesAuth {
        KubernetesAuth {
            jwt: "test-jwt".to_string(),
            role: "test-role".to_string(),
        }
    }

    #[test]
    fn app_role_alone_is_valid() {
        let options = VaultOptions {
            app_role_auth: Some(app_role()),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Ok(AuthMethod::AppRole(_))));
    }

    #[test]
    fn kubernetes_alone_is_valid() {
        let options = VaultOptions {
            kubernetes_auth: Some(kubernetes()),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Ok(AuthMethod::Kubernetes(_))));
    }

    #[test]
    fn both_methods_are_rejected() {
        let options = VaultOptions {
            app_role_auth: Some(app_role()),
            kubernetes_auth: Some(kubernetes()),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(VaultError::InvalidAuthConfig)));
    }

    #[test]
    fn no_method_is_rejected() {
        let options = VaultOptions::default();
        assert!(matches!(options.validate(), Err(VaultError::InvalidAuthConfig)));
    }

    #[test]
    fn credentials_are_masked_in_debug_output() {
        let rendered = format!("{:?}", app_role());
        assert!(!rendered.contains("test-secret-id"));
        assert!(rendered.contains("test-role-id"));

        let rendered = format!("{:?}", kubernetes());
        assert!(!rendered.contains("test-jwt"));
    }
}
