use crate::config::{ENV_ISSUER_ID, ENV_KEY_ID, ENV_KEY_PATH};
use crate::connect_api::types::AppStoreError;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::der::pem;
use p256::pkcs8::{EncodePrivateKey, ObjectIdentifier, PrivateKeyInfo};
use p256::SecretKey;
use std::fmt;
use std::path::Path;

/// id-ecPublicKey, the PKCS#8 algorithm identifier for elliptic-curve keys
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// Parse a P-256 private key from a PEM document
///
/// The PEM block is decoded and its contents tried as a PKCS#8
/// `PrivateKeyInfo` (the format of `.p8` files downloaded from App Store
/// Connect), then as a SEC1 `EC PRIVATE KEY`.
///
/// # Errors
///
/// - [`AppStoreError::InvalidKeyFormat`] if the input holds no PEM block
/// - [`AppStoreError::UnsupportedKeyType`] if the PKCS#8 key is not an EC key
/// - [`AppStoreError::KeyParse`] if neither PKCS#8 nor SEC1 parsing succeeds
pub fn parse_private_key(pem_bytes: impl AsRef<[u8]>) -> Result<SecretKey, AppStoreError> {
    let (label, der) = pem::decode_vec(pem_bytes.as_ref()).map_err(|e| {
        tracing::debug!("No PEM block found in key material: {}", e);
        AppStoreError::InvalidKeyFormat
    })?;
    tracing::debug!("Decoded PEM block with label {}", label);
    let der = der.as_slice();

    match PrivateKeyInfo::try_from(der) {
        Ok(info) => {
            let oid = info.algorithm.oid;
            if oid != EC_PUBLIC_KEY_OID {
                return Err(AppStoreError::UnsupportedKeyType(describe_algorithm(oid)));
            }
            SecretKey::try_from(info)
                .map_err(|e| AppStoreError::KeyParse(format!("Invalid P-256 PKCS#8 key: {}", e)))
        }
        Err(pkcs8_err) => {
            tracing::debug!(
                "Key is not PKCS#8 ({}), falling back to SEC1 EC private key",
                pkcs8_err
            );
            SecretKey::from_sec1_der(der)
                .map_err(|e| AppStoreError::KeyParse(format!("Invalid EC private key: {}", e)))
        }
    }
}

fn describe_algorithm(oid: ObjectIdentifier) -> String {
    if oid == RSA_ENCRYPTION_OID {
        "RSA".to_string()
    } else if oid == ED25519_OID {
        "Ed25519".to_string()
    } else {
        format!("algorithm {}", oid)
    }
}

/// App Store Connect API key
///
/// The private signing key plus the key identifier (`kid`) and issuer
/// (`iss`) used to mint bearer tokens. Immutable once loaded.
#[derive(Clone)]
pub struct Credential {
    key_id: String,
    issuer_id: String,
    secret_key: SecretKey,
}

impl Credential {
    /// Load a credential from PEM-encoded key bytes (the contents of a `.p8` file)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use appstore_connect_sdk::Credential;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pem = std::fs::read("AuthKey_ABC123DEFG.p8")?;
    /// let credential = Credential::from_pem(
    ///     "ABC123DEFG",
    ///     "57246542-96fe-1a63-e053-0824d011072a",
    ///     &pem,
    /// )?;
    /// assert_eq!(credential.key_id(), "ABC123DEFG");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_pem(
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        pem_bytes: impl AsRef<[u8]>,
    ) -> Result<Self, AppStoreError> {
        let secret_key = parse_private_key(pem_bytes)?;
        Ok(Self {
            key_id: key_id.into(),
            issuer_id: issuer_id.into(),
            secret_key,
        })
    }

    /// Load a credential from a `.p8` file on disk
    pub fn from_file(
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, AppStoreError> {
        let path = path.as_ref();
        tracing::debug!("Loading App Store Connect key from {:?}", path);
        let bytes = std::fs::read(path)?;
        Self::from_pem(key_id, issuer_id, bytes)
    }

    /// Load a credential using `APP_STORE_CONNECT_KEY_ID`,
    /// `APP_STORE_CONNECT_ISSUER_ID` and `APP_STORE_CONNECT_KEY_PATH`
    pub fn from_env() -> Result<Self, AppStoreError> {
        let key_id = required_env(ENV_KEY_ID)?;
        let issuer_id = required_env(ENV_ISSUER_ID)?;
        let key_path = required_env(ENV_KEY_PATH)?;
        Self::from_file(key_id, issuer_id, key_path)
    }

    /// Key identifier, sent as the `kid` header
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Issuer identifier, sent as the `iss` claim
    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    /// PKCS#8 DER encoding of the private key, as expected by the JWT signer
    pub(crate) fn pkcs8_der(&self) -> Result<Vec<u8>, AppStoreError> {
        self.secret_key
            .to_pkcs8_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| AppStoreError::Signing(format!("Failed to encode private key: {}", e)))
    }

    /// Affine coordinates of the public key (uncompressed, big-endian)
    pub(crate) fn public_coordinates(&self) -> Result<(Vec<u8>, Vec<u8>), AppStoreError> {
        let point = self.secret_key.public_key().to_encoded_point(false);
        match (point.x(), point.y()) {
            (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
            _ => Err(AppStoreError::Signing(
                "Public key is the point at infinity".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("issuer_id", &self.issuer_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

fn required_env(name: &str) -> Result<String, AppStoreError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppStoreError::Config(format!(
            "Environment variable {} is not set",
            name
        ))),
    }
}
