use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// App Store Connect SDK error type
///
/// Represents all possible errors that can occur when loading credentials,
/// minting bearer tokens, or talking to the App Store Connect API.
#[derive(Debug)]
pub enum AppStoreError {
    /// The key file did not contain a PEM block
    InvalidKeyFormat,
    /// The key parsed but is not an elliptic-curve private key
    UnsupportedKeyType(String),
    /// The key bytes could not be parsed as PKCS#8 or SEC1
    KeyParse(String),
    /// Signing a bearer token failed
    Signing(String),
    /// A bearer token failed signature or claim verification
    Verification(String),
    /// JSON encoding or decoding failed
    Json(serde_json::Error),
    /// File I/O failed
    Io(std::io::Error),
    /// Storage backend operation failed
    Storage(crate::storage::StorageError),
    /// Network-level failure (connection, timeout, TLS)
    Transport(String),
    /// Response body could not be read or decoded
    Decode(String),
    /// The API answered with an `errors` envelope
    Api(ErrorResponse),
    /// Configuration error
    Config(String),
}

impl fmt::Display for AppStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppStoreError::InvalidKeyFormat => {
                write!(f, "Invalid key format: AuthKey must be a valid .p8 PEM file")
            }
            AppStoreError::UnsupportedKeyType(kind) => write!(
                f,
                "Unsupported key type: AuthKey must be an ECDSA private key, found {}",
                kind
            ),
            AppStoreError::KeyParse(msg) => write!(f, "Key parse error: {}", msg),
            AppStoreError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
            AppStoreError::Verification(msg) => write!(f, "Token verification failed: {}", msg),
            AppStoreError::Json(err) => write!(f, "JSON error: {}", err),
            AppStoreError::Io(err) => write!(f, "IO error: {}", err),
            AppStoreError::Storage(err) => write!(f, "Storage error: {}", err),
            AppStoreError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppStoreError::Decode(msg) => write!(f, "Decode error: {}", msg),
            AppStoreError::Api(resp) => write!(f, "API error: {}", resp),
            AppStoreError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppStoreError::Json(err) => Some(err),
            AppStoreError::Io(err) => Some(err),
            AppStoreError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppStoreError {
    fn from(err: serde_json::Error) -> Self {
        AppStoreError::Json(err)
    }
}

impl From<std::io::Error> for AppStoreError {
    fn from(err: std::io::Error) -> Self {
        AppStoreError::Io(err)
    }
}

impl From<crate::storage::StorageError> for AppStoreError {
    fn from(err: crate::storage::StorageError) -> Self {
        AppStoreError::Storage(err)
    }
}

impl From<base64::DecodeError> for AppStoreError {
    fn from(err: base64::DecodeError) -> Self {
        AppStoreError::Decode(format!("Invalid base64 content: {}", err))
    }
}

impl From<reqwest::Error> for AppStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppStoreError::Transport("Request timeout".to_string())
        } else if err.is_connect() {
            AppStoreError::Transport(format!("Connection failed: {}", err))
        } else if err.is_body() || err.is_decode() {
            AppStoreError::Decode(err.to_string())
        } else {
            AppStoreError::Transport(err.to_string())
        }
    }
}

/// Error envelope returned by App Store Connect for failed requests
///
/// HTTP status codes are not inspected by the client, so callers that want to
/// distinguish failures decode the body and look for this envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<HashMap<String, String>>,
}

impl ErrorResponse {
    /// Returns true if the envelope carries at least one error
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} {} ({}): {}", e.status, e.code, e.title, e.detail))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}
