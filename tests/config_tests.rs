//! Configuration Tests
//!
//! Tests for loading client configuration from TOML files.

use std::io::Write;

use tempfile::NamedTempFile;

use ticketlink::protocol::Encoding;
use ticketlink::{ClientConfig, ClientError};

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
base_uri = "https://tickets.example.com/api"
protocol_id = "tickets"
encoding = "binary"
login_path = "auth/login"
logout_path = "auth/logout"
connect_timeout_ms = 1000
request_timeout_ms = 2000
user_agent = "tests"
"#,
    );
    let config = ClientConfig::load(file.path()).unwrap();

    assert_eq!(config.encoding, Encoding::Binary);
    assert_eq!(config.request_timeout_ms, 2000);
    assert_eq!(config.login_path, "auth/login");
    assert_eq!(
        config.base_url().unwrap().as_str(),
        "https://tickets.example.com/api/"
    );
}

#[test]
fn test_absent_keys_take_defaults() {
    let file = write_config("base_uri = \"http://localhost:8080/\"\n");
    let config = ClientConfig::load(file.path()).unwrap();

    let defaults = ClientConfig::default();
    assert_eq!(config.base_uri, "http://localhost:8080/");
    assert_eq!(config.protocol_id, defaults.protocol_id);
    assert_eq!(config.encoding, Encoding::Text);
    assert_eq!(config.login_path, "login");
}

#[test]
fn test_empty_file_is_default() {
    let file = write_config("");
    assert_eq!(ClientConfig::load(file.path()).unwrap(), ClientConfig::default());
}

#[test]
fn test_unknown_key_rejected() {
    let file = write_config("base_uri = \"http://localhost/\"\nretries = 3\n");
    let err = ClientConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
    assert!(err.to_string().contains("retries"));
}

#[test]
fn test_bad_encoding_rejected() {
    let file = write_config("encoding = \"xml\"\n");
    assert!(matches!(
        ClientConfig::load(file.path()),
        Err(ClientError::Config(_))
    ));
}

#[test]
fn test_invalid_values_rejected() {
    for text in [
        "base_uri = \"mailto:someone@example.com\"",
        "protocol_id = \"  \"",
        "request_timeout_ms = 0",
    ] {
        let file = write_config(text);
        let err = ClientConfig::load(file.path()).unwrap_err();
        assert_eq!(err.code().as_str(), "error-configuration", "{text}");
    }
}

#[test]
fn test_base_url_gains_trailing_slash() {
    let config = ClientConfig::builder()
        .base_uri("http://localhost:8080/api")
        .build();
    assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:8080/api/");
}

#[test]
fn test_invalid_base_uri() {
    let config = ClientConfig::builder().base_uri("not a uri").build();
    assert!(matches!(config.base_url(), Err(ClientError::Config(_))));
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}
