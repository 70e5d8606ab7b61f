use std::time::Duration;

use facet::Facet;
use facet_config::{ConfigPath, Configurator, Provider};
use facet_config_vault::{
    AppRoleAuth, ClientError, KubernetesAuth, SecretClient, VaultError, VaultOptions, VaultProvider,
};
use facet_testhelpers::test;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Initialize(String, Duration),
    AppRoleLogin(String, String),
    KubernetesLogin(String, String),
    GetValues(String, String),
}

/// Records every call, and fails the call made for the `fail_on` step.
struct MockClient<'a> {
    calls: &'a mut Vec<Call>,
    fail_on: Option<&'static str>,
    secret: Value,
}

impl<'a> MockClient<'a> {
    fn new(calls: &'a mut Vec<Call>, secret: Value) -> Self {
        Self {
            calls,
            fail_on: None,
            secret,
        }
    }

    fn failing_on(mut self, step: &'static str) -> Self {
        self.fail_on = Some(step);
        self
    }

    fn record(&mut self, step: &'static str, call: Call) -> Result<(), ClientError> {
        self.calls.push(call);
        if self.fail_on == Some(step) {
            return Err("something went wrong".into());
        }
        Ok(())
    }
}

impl SecretClient for MockClient<'_> {
    fn initialize(&mut self, url: &str, request_timeout: Duration) -> Result<(), ClientError> {
        self.record("initialize", Call::Initialize(url.to_string(), request_timeout))
    }

    fn app_role_login(&mut self, role_id: &str, secret_id: &str) -> Result<(), ClientError> {
        self.record(
            "login",
            Call::AppRoleLogin(role_id.to_string(), secret_id.to_string()),
        )
    }

    fn kubernetes_login(&mut self, jwt: &str, role: &str) -> Result<(), ClientError> {
        self.record("login", Call::KubernetesLogin(jwt.to_string(), role.to_string()))
    }

    fn get_values(&mut self, path: &str, mount_path: &str) -> Result<Map<String, Value>, ClientError> {
        self.record(
            "get_values",
            Call::GetValues(path.to_string(), mount_path.to_string()),
        )?;
        match &self.secret {
            Value::Object(map) => Ok(map.clone()),
            _ => Ok(Map::new()),
        }
    }
}

fn kubernetes_options() -> VaultOptions {
    VaultOptions {
        url: "test-url".to_string(),
        mount_path: "test-mount-path".to_string(),
        path: "test-path".to_string(),
        request_timeout: Duration::from_secs(15),
        app_role_auth: None,
        kubernetes_auth: Some(KubernetesAuth {
            jwt: "test-jwt".to_string(),
            role: "test-role".to_string(),
        }),
    }
}

fn app_role_options() -> VaultOptions {
    VaultOptions {
        app_role_auth: Some(AppRoleAuth {
            role_id: "test-role-id".to_string(),
            secret_id: "test-secret-id".to_string(),
        }),
        kubernetes_auth: None,
        ..kubernetes_options()
    }
}

fn path(segments: &[&str]) -> ConfigPath {
    ConfigPath::from_segments(segments.iter().copied())
}

#[test]
fn kubernetes_login_sequence() {
    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({ "TEST": "value" }));
    let vault = VaultProvider::connect(client, &kubernetes_options())?;

    assert_eq!(vault.len(), 1);
    assert_eq!(
        calls,
        [
            Call::Initialize("test-url".to_string(), Duration::from_secs(15)),
            Call::KubernetesLogin("test-jwt".to_string(), "test-role".to_string()),
            Call::GetValues("test-path".to_string(), "test-mount-path".to_string()),
        ]
    );
}

#[test]
fn app_role_login_sequence() {
    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({}));
    VaultProvider::connect(client, &app_role_options())?;

    assert_eq!(
        calls[1],
        Call::AppRoleLogin("test-role-id".to_string(), "test-secret-id".to_string())
    );
}

#[test]
fn invalid_auth_config_contacts_nothing() {
    let mut calls = Vec::new();
    let options = VaultOptions {
        kubernetes_auth: None,
        ..kubernetes_options()
    };
    let err = VaultProvider::connect(MockClient::new(&mut calls, json!({})), &options).unwrap_err();

    assert!(matches!(err, VaultError::InvalidAuthConfig));
    assert!(calls.is_empty());
}

#[test]
fn initialize_failure_is_a_connection_error() {
    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({})).failing_on("initialize");
    let err = VaultProvider::connect(client, &kubernetes_options()).unwrap_err();

    assert!(matches!(err, VaultError::Connection(_)));
    assert_eq!(calls.len(), 1);
    insta::assert_snapshot!(err, @"Could not connect to the secret store: something went wrong");
}

#[test]
fn login_failure_is_an_auth_error() {
    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({})).failing_on("login");
    let err = VaultProvider::connect(client, &kubernetes_options()).unwrap_err();

    assert!(matches!(err, VaultError::Auth(_)));
    assert_eq!(calls.len(), 2);
}

#[test]
fn fetch_failure_is_a_secret_fetch_error() {
    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({})).failing_on("get_values");
    let err = VaultProvider::connect(client, &kubernetes_options()).unwrap_err();

    assert!(matches!(err, VaultError::SecretFetch(_)));
}

#[test]
fn non_string_secret_is_rejected() {
    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({ "test": "value", "invalid": 100 }));
    let err = VaultProvider::connect(client, &kubernetes_options()).unwrap_err();

    match &err {
        VaultError::SecretValueType { key, .. } => assert_eq!(key, "invalid"),
        other => panic!("unexpected error: {other:?}"),
    }
    insta::assert_snapshot!(err, @"Secret 'invalid' holds a number, expected a string");
}

#[test]
fn fetched_values_are_kept() {
    let mut calls = Vec::new();
    let client = MockClient::new(
        &mut calls,
        json!({ "test": "value", "another": "value", "otherTest": "data" }),
    );
    let vault = VaultProvider::connect(client, &kubernetes_options())?;

    assert_eq!(vault.resolve(&path(&["test"])).unwrap(), "value");
    assert_eq!(vault.resolve(&path(&["another"])).unwrap(), "value");
    assert_eq!(vault.resolve(&path(&["otherTest"])).unwrap(), "data");
}

#[test]
fn resolves_joined_upper_cased_keys() {
    let vault = VaultProvider::from_data([
        ("SOME_KEY", "some_value"),
        ("ANOTHER_KEY_MULTIPLE_PARTS", "foo"),
        ("MIXED_CASING", "something"),
    ])?;

    assert_eq!(vault.resolve(&path(&["some", "key"])).unwrap(), "some_value");
    assert_eq!(
        vault
            .resolve(&path(&["another", "key", "multiple", "parts"]))
            .unwrap(),
        "foo"
    );
    assert_eq!(vault.resolve(&path(&["mIxEd", "CASING"])).unwrap(), "something");
    assert_eq!(vault.resolve(&path(&["not", "found"])).unwrap(), "");
}

#[test]
fn keys_differing_only_in_case_are_rejected() {
    let err = VaultProvider::from_data([("db_url", "a"), ("DB_URL", "b")]).unwrap_err();
    insta::assert_snapshot!(err, @"Secret key 'DB_URL' collides with another key as 'DB_URL'");

    let mut calls = Vec::new();
    let client = MockClient::new(&mut calls, json!({ "Token": "a", "TOKEN": "b" }));
    let err = VaultProvider::connect(client, &kubernetes_options()).unwrap_err();
    match &err {
        VaultError::DuplicateKey { normalized, .. } => assert_eq!(normalized, "TOKEN"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn debug_output_lists_keys_only() {
    let vault = VaultProvider::from_data([("db_password", "hunter2")])?;
    let rendered = format!("{vault:?}");
    assert!(rendered.contains("DB_PASSWORD"));
    assert!(!rendered.contains("hunter2"));
}

#[derive(Facet, Debug)]
struct Database {
    #[facet(sensitive)]
    password: String,
    #[facet(fallback = "db.internal")]
    host: String,
}

#[derive(Facet, Debug)]
struct Config {
    #[facet(path = "db")]
    database: Box<Database>,
}

#[test]
fn populates_secrets() {
    let vault = VaultProvider::from_data([("DB_PASSWORD", "hunter2")])?;
    let config: Config = Configurator::new().with_provider(vault).load()?;

    assert_eq!(config.database.password, "hunter2");
    assert_eq!(config.database.host, "db.internal");
}
