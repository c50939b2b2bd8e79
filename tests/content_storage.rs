//! Downloaded Content Tests
//!
//! Tests for decoding base64 certificate and profile content and writing it
//! to disk, either directly or through a storage backend.

use appstore_connect_sdk::{
    AppStoreError, Certificate, FilesystemStorage, Profile, StorageBackend, StorageError,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;
use tempfile::TempDir;

fn certificate_with_content(content: &[u8]) -> Certificate {
    serde_json::from_value(json!({
        "type": "certificates",
        "id": "C1",
        "attributes": {
            "certificateContent": BASE64.encode(content),
            "certificateType": "DEVELOPMENT"
        }
    }))
    .unwrap()
}

fn profile_with_content(content: &[u8]) -> Profile {
    serde_json::from_value(json!({
        "type": "profiles",
        "id": "P1",
        "attributes": {
            "name": "Dev",
            "profileContent": BASE64.encode(content)
        }
    }))
    .unwrap()
}

// ============================================================================
// Direct File Tests
// ============================================================================

#[tokio::test]
async fn test_certificate_saved_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dev.cer");
    let der = b"\x30\x82\x05\xa4\x30\x82\x04\x8c\xa0\x03\x02\x01\x02";

    certificate_with_content(der)
        .save_content_to_file(&path)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), der);
}

#[tokio::test]
async fn test_profile_overwrites_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dev.mobileprovision");
    std::fs::write(&path, b"an older, longer profile that must disappear").unwrap();

    profile_with_content(b"new profile")
        .save_content_to_file(&path)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"new profile");
}

#[tokio::test]
async fn test_save_into_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("dev.cer");

    let result = certificate_with_content(b"der")
        .save_content_to_file(&path)
        .await;
    assert!(matches!(result, Err(AppStoreError::Io(_))));
}

#[tokio::test]
async fn test_invalid_base64_is_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.cer");

    let certificate: Certificate = serde_json::from_value(json!({
        "type": "certificates",
        "id": "C9",
        "attributes": {"certificateContent": "%%%"}
    }))
    .unwrap();

    let result = certificate.save_content_to_file(&path).await;
    assert!(matches!(result, Err(AppStoreError::Decode(_))));
    assert!(!path.exists());
}

// ============================================================================
// Storage Backend Tests
// ============================================================================

#[tokio::test]
async fn test_save_through_filesystem_storage() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(temp_dir.path()).unwrap();
    let content = vec![0u8, 1, 2, 254, 255];

    profile_with_content(&content)
        .save_content(&storage, "profiles/P1.mobileprovision")
        .await
        .unwrap();

    assert!(storage.exists("profiles/P1.mobileprovision"));
    let stored = storage
        .read_bytes("profiles/P1.mobileprovision")
        .await
        .unwrap();
    assert_eq!(stored, content);
}

#[tokio::test]
async fn test_storage_rejects_escaping_path() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(temp_dir.path().join("root")).unwrap();

    let result = certificate_with_content(b"der")
        .save_content(&storage, "../escape.cer")
        .await;
    assert!(matches!(
        result,
        Err(AppStoreError::Storage(StorageError::Path(_)))
    ));
}
