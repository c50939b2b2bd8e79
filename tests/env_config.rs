//! Environment Configuration Tests
//!
//! Tests for loading credentials and client options from
//! `APP_STORE_CONNECT_*` environment variables. Environment access is
//! process-global, so every test runs serially.

use appstore_connect_sdk::config::{
    ENV_BASE_URL, ENV_ISSUER_ID, ENV_KEY_ID, ENV_KEY_PATH, ENV_SWALLOW_TRANSPORT_ERRORS,
    ENV_TIMEOUT_SECS,
};
use appstore_connect_sdk::{AppStoreError, Authenticator, ClientConfig, ConnectClient, Credential};
use serial_test::serial;
use std::time::Duration;

const FIXTURE_KEY_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ec_pkcs8.p8");

fn clear_env() {
    for name in [
        ENV_BASE_URL,
        ENV_TIMEOUT_SECS,
        ENV_SWALLOW_TRANSPORT_ERRORS,
        ENV_KEY_ID,
        ENV_ISSUER_ID,
        ENV_KEY_PATH,
    ] {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_credential_from_env() {
    clear_env();
    std::env::set_var(ENV_KEY_ID, "2X9R4HXF34");
    std::env::set_var(ENV_ISSUER_ID, "issuer-uuid");
    std::env::set_var(ENV_KEY_PATH, FIXTURE_KEY_PATH);

    let credential = Credential::from_env().unwrap();
    assert_eq!(credential.key_id(), "2X9R4HXF34");
    assert_eq!(credential.issuer_id(), "issuer-uuid");

    clear_env();
}

#[test]
#[serial]
fn test_credential_from_env_missing_variable() {
    clear_env();
    std::env::set_var(ENV_KEY_ID, "2X9R4HXF34");
    std::env::set_var(ENV_KEY_PATH, FIXTURE_KEY_PATH);

    match Credential::from_env() {
        Err(AppStoreError::Config(message)) => assert!(message.contains(ENV_ISSUER_ID)),
        other => panic!("expected Config error, got {:?}", other),
    }

    clear_env();
}

#[test]
#[serial]
fn test_client_from_env_config() {
    clear_env();
    std::env::set_var(ENV_BASE_URL, "http://localhost:8080/");
    std::env::set_var(ENV_TIMEOUT_SECS, "5");
    std::env::set_var(ENV_SWALLOW_TRANSPORT_ERRORS, "no");
    std::env::set_var(ENV_KEY_ID, "2X9R4HXF34");
    std::env::set_var(ENV_ISSUER_ID, "issuer-uuid");
    std::env::set_var(ENV_KEY_PATH, FIXTURE_KEY_PATH);

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    assert!(!config.swallow_transport_errors);

    let client =
        ConnectClient::with_config(Authenticator::new(Credential::from_env().unwrap()), config)
            .unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(
        client.resource_url("devices"),
        "http://localhost:8080/v1/devices"
    );

    clear_env();
}

#[test]
#[serial]
fn test_invalid_flag_rejected() {
    clear_env();
    std::env::set_var(ENV_SWALLOW_TRANSPORT_ERRORS, "sometimes");

    assert!(matches!(
        ClientConfig::from_env(),
        Err(AppStoreError::Config(_))
    ));

    clear_env();
}
