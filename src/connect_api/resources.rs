use crate::connect_api::types::AppStoreError;
use crate::storage::StorageBackend;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BUNDLE_IDS: &str = "bundleIds";
pub const CERTIFICATES: &str = "certificates";
pub const DEVICES: &str = "devices";
pub const PROFILES: &str = "profiles";

// ============================================================================
// Enumerations
// ============================================================================

/// Bundle ID platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Ios,
    MacOs,
    /// A platform this crate does not model, such as `UNIVERSAL`
    #[serde(other)]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "IOS",
            Platform::MacOs => "MAC_OS",
            Platform::Unknown => "UNKNOWN",
        }
    }
}

/// Certificate type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    IosDevelopment,
    IosDistribution,
    MacAppDistribution,
    MacInstallerDistribution,
    MacAppDevelopment,
    DeveloperIdKext,
    DeveloperIdApplication,
    Development,
    Distribution,
    /// A type newer than this crate
    #[serde(other)]
    Unknown,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::IosDevelopment => "IOS_DEVELOPMENT",
            CertificateType::IosDistribution => "IOS_DISTRIBUTION",
            CertificateType::MacAppDistribution => "MAC_APP_DISTRIBUTION",
            CertificateType::MacInstallerDistribution => "MAC_INSTALLER_DISTRIBUTION",
            CertificateType::MacAppDevelopment => "MAC_APP_DEVELOPMENT",
            CertificateType::DeveloperIdKext => "DEVELOPER_ID_KEXT",
            CertificateType::DeveloperIdApplication => "DEVELOPER_ID_APPLICATION",
            CertificateType::Development => "DEVELOPMENT",
            CertificateType::Distribution => "DISTRIBUTION",
            CertificateType::Unknown => "UNKNOWN",
        }
    }
}

/// Device registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatus {
    Enabled,
    Disabled,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Enabled => "ENABLED",
            DeviceStatus::Disabled => "DISABLED",
        }
    }
}

/// Hardware family of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceClass {
    AppleWatch,
    Ipad,
    Iphone,
    Ipod,
    AppleTv,
    Mac,
    #[serde(other)]
    Unknown,
}

/// Provisioning profile state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileState {
    Active,
    Invalid,
}

impl ProfileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileState::Active => "ACTIVE",
            ProfileState::Invalid => "INVALID",
        }
    }
}

/// Provisioning profile type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileType {
    IosAppDevelopment,
    IosAppStore,
    IosAppAdhoc,
    IosAppInhouse,
    MacAppDevelopment,
    MacAppStore,
    MacAppDirect,
    TvosAppDevelopment,
    TvosAppStore,
    TvosAppAdhoc,
    TvosAppInhouse,
    #[serde(other)]
    Unknown,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::IosAppDevelopment => "IOS_APP_DEVELOPMENT",
            ProfileType::IosAppStore => "IOS_APP_STORE",
            ProfileType::IosAppAdhoc => "IOS_APP_ADHOC",
            ProfileType::IosAppInhouse => "IOS_APP_INHOUSE",
            ProfileType::MacAppDevelopment => "MAC_APP_DEVELOPMENT",
            ProfileType::MacAppStore => "MAC_APP_STORE",
            ProfileType::MacAppDirect => "MAC_APP_DIRECT",
            ProfileType::TvosAppDevelopment => "TVOS_APP_DEVELOPMENT",
            ProfileType::TvosAppStore => "TVOS_APP_STORE",
            ProfileType::TvosAppAdhoc => "TVOS_APP_ADHOC",
            ProfileType::TvosAppInhouse => "TVOS_APP_INHOUSE",
            ProfileType::Unknown => "UNKNOWN",
        }
    }
}

// ============================================================================
// Shared document pieces
// ============================================================================

/// `{ "type": ..., "id": ... }` linkage object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Links of a single resource or document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Links of a paged document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedDocumentLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Links of a relationship
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Total number of resources matching the request
    #[serde(default)]
    pub total: u32,
    /// Page size, 0 to 200
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInformation {
    #[serde(default)]
    pub paging: Paging,
}

/// To-many relationship as returned in responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToManyRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<ResourceIdentifier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PagingInformation>,
}

/// To-one relationship as returned in responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToOneRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
}

/// Single-resource response document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub links: DocumentLinks,
    /// Included related resources; their type depends on the `include` parameter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<serde_json::Value>,
}

/// Paged collection response document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedDocument<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PagedDocumentLinks,
    #[serde(default)]
    pub meta: PagingInformation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<serde_json::Value>,
}

// ============================================================================
// Bundle IDs
// ============================================================================

/// Bundle ID resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleId {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: BundleIdAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BundleIdRelationships>,
    #[serde(default)]
    pub links: DocumentLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleIdAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleIdRelationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<ToManyRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id_capabilities: Option<ToManyRelationship>,
}

pub type BundleIdResponse = Document<BundleId>;
pub type BundleIdsResponse = PagedDocument<BundleId>;

/// Body of `POST /v1/bundleIds`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleIdCreateRequest {
    pub data: BundleIdCreateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleIdCreateData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: BundleIdCreateAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleIdCreateAttributes {
    pub identifier: String,
    pub name: String,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_id: Option<String>,
}

impl BundleIdCreateRequest {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        Self {
            data: BundleIdCreateData {
                resource_type: BUNDLE_IDS.to_string(),
                attributes: BundleIdCreateAttributes {
                    identifier: identifier.into(),
                    name: name.into(),
                    platform,
                    seed_id: None,
                },
            },
        }
    }
}

/// Body of `PATCH /v1/bundleIds/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleIdUpdateRequest {
    pub data: BundleIdUpdateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleIdUpdateData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: BundleIdUpdateAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleIdUpdateAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BundleIdUpdateRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data: BundleIdUpdateData {
                resource_type: BUNDLE_IDS.to_string(),
                id: id.into(),
                attributes: BundleIdUpdateAttributes {
                    name: Some(name.into()),
                },
            },
        }
    }
}

// ============================================================================
// Certificates
// ============================================================================

/// Certificate resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: CertificateAttributes,
    #[serde(default)]
    pub links: DocumentLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAttributes {
    /// Base64-encoded DER certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<CertificateType>,
}

impl Certificate {
    /// Decode `certificateContent` into DER bytes
    pub fn decode_content(&self) -> Result<Vec<u8>, AppStoreError> {
        decode_content("certificateContent", self.attributes.certificate_content.as_deref())
    }

    /// Decode the certificate and write it through a storage backend
    pub async fn save_content(
        &self,
        storage: &dyn StorageBackend,
        path: &str,
    ) -> Result<(), AppStoreError> {
        let bytes = self.decode_content()?;
        storage.write_bytes(path, &bytes).await?;
        tracing::info!("Saved certificate {} to {}", self.id, path);
        Ok(())
    }

    /// Decode the certificate and write it to `path`, replacing any existing file
    pub async fn save_content_to_file(&self, path: impl AsRef<Path>) -> Result<(), AppStoreError> {
        let bytes = self.decode_content()?;
        tokio::fs::write(path.as_ref(), bytes).await?;
        tracing::info!("Saved certificate {} to {:?}", self.id, path.as_ref());
        Ok(())
    }
}

pub type CertificateResponse = Document<Certificate>;
pub type CertificatesResponse = PagedDocument<Certificate>;

/// Body of `POST /v1/certificates`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateCreateRequest {
    pub data: CertificateCreateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateCreateData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: CertificateCreateAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateCreateAttributes {
    pub certificate_type: CertificateType,
    /// PEM or base64 certificate signing request
    pub csr_content: String,
}

impl CertificateCreateRequest {
    pub fn new(csr_content: impl Into<String>, certificate_type: CertificateType) -> Self {
        Self {
            data: CertificateCreateData {
                resource_type: CERTIFICATES.to_string(),
                attributes: CertificateCreateAttributes {
                    certificate_type,
                    csr_content: csr_content.into(),
                },
            },
        }
    }
}

// ============================================================================
// Devices
// ============================================================================

/// Device resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: DeviceAttributes,
    #[serde(default)]
    pub links: DocumentLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<String>,
}

pub type DeviceResponse = Document<Device>;
pub type DevicesResponse = PagedDocument<Device>;

/// Body of `POST /v1/devices`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreateRequest {
    pub data: DeviceCreateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreateData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: DeviceCreateAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCreateAttributes {
    pub name: String,
    pub platform: Platform,
    pub udid: String,
}

impl DeviceCreateRequest {
    pub fn new(udid: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        Self {
            data: DeviceCreateData {
                resource_type: DEVICES.to_string(),
                attributes: DeviceCreateAttributes {
                    name: name.into(),
                    platform,
                    udid: udid.into(),
                },
            },
        }
    }
}

/// Body of `PATCH /v1/devices/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceUpdateRequest {
    pub data: DeviceUpdateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceUpdateData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub attributes: DeviceUpdateAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceUpdateAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
}

impl DeviceUpdateRequest {
    pub fn new(id: impl Into<String>, name: Option<String>, status: Option<DeviceStatus>) -> Self {
        Self {
            data: DeviceUpdateData {
                resource_type: DEVICES.to_string(),
                id: id.into(),
                attributes: DeviceUpdateAttributes { name, status },
            },
        }
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Provisioning profile resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: ProfileAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<ProfileRelationships>,
    #[serde(default)]
    pub links: DocumentLinks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Base64-encoded `.mobileprovision` payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_state: Option<ProfileState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<ProfileType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRelationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<ToOneRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificates: Option<ToManyRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<ToManyRelationship>,
}

impl Profile {
    /// Decode `profileContent` into the raw provisioning profile
    pub fn decode_content(&self) -> Result<Vec<u8>, AppStoreError> {
        decode_content("profileContent", self.attributes.profile_content.as_deref())
    }

    /// Decode the profile and write it through a storage backend
    pub async fn save_content(
        &self,
        storage: &dyn StorageBackend,
        path: &str,
    ) -> Result<(), AppStoreError> {
        let bytes = self.decode_content()?;
        storage.write_bytes(path, &bytes).await?;
        tracing::info!("Saved profile {} to {}", self.id, path);
        Ok(())
    }

    /// Decode the profile and write it to `path`, replacing any existing file
    pub async fn save_content_to_file(&self, path: impl AsRef<Path>) -> Result<(), AppStoreError> {
        let bytes = self.decode_content()?;
        tokio::fs::write(path.as_ref(), bytes).await?;
        tracing::info!("Saved profile {} to {:?}", self.id, path.as_ref());
        Ok(())
    }
}

pub type ProfileResponse = Document<Profile>;
pub type ProfilesResponse = PagedDocument<Profile>;

/// Body of `POST /v1/profiles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreateRequest {
    pub data: ProfileCreateData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreateData {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: ProfileCreateAttributes,
    pub relationships: ProfileCreateRelationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreateAttributes {
    pub name: String,
    pub profile_type: ProfileType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreateRelationships {
    pub bundle_id: RelationshipData<ResourceIdentifier>,
    pub certificates: RelationshipData<Vec<ResourceIdentifier>>,
    #[serde(default)]
    pub devices: RelationshipData<Vec<ResourceIdentifier>>,
}

/// `{ "data": ... }` wrapper used by request relationships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipData<T> {
    pub data: T,
}

impl ProfileCreateRequest {
    pub fn new(
        name: impl Into<String>,
        profile_type: ProfileType,
        bundle_id: impl Into<String>,
        certificate_ids: &[String],
        device_ids: &[String],
    ) -> Self {
        let certificates = certificate_ids
            .iter()
            .map(|id| ResourceIdentifier::new(CERTIFICATES, id.as_str()))
            .collect();
        let devices = device_ids
            .iter()
            .map(|id| ResourceIdentifier::new(DEVICES, id.as_str()))
            .collect();

        Self {
            data: ProfileCreateData {
                resource_type: PROFILES.to_string(),
                attributes: ProfileCreateAttributes {
                    name: name.into(),
                    profile_type,
                },
                relationships: ProfileCreateRelationships {
                    bundle_id: RelationshipData {
                        data: ResourceIdentifier::new(BUNDLE_IDS, bundle_id),
                    },
                    certificates: RelationshipData { data: certificates },
                    devices: RelationshipData { data: devices },
                },
            },
        }
    }
}

fn decode_content(field: &str, content: Option<&str>) -> Result<Vec<u8>, AppStoreError> {
    let content = content.ok_or_else(|| {
        AppStoreError::Decode(format!("Resource has no {} attribute", field))
    })?;
    Ok(BASE64.decode(content.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_platform_serialization() {
        assert_eq!(serde_json::to_value(Platform::Ios).unwrap(), json!("IOS"));
        assert_eq!(serde_json::to_value(Platform::MacOs).unwrap(), json!("MAC_OS"));
        assert_eq!(
            serde_json::from_value::<Platform>(json!("UNIVERSAL")).unwrap(),
            Platform::Unknown
        );
    }

    #[test]
    fn test_enum_as_str_matches_serde() {
        for profile_type in [
            ProfileType::IosAppAdhoc,
            ProfileType::TvosAppInhouse,
            ProfileType::MacAppDirect,
        ] {
            assert_eq!(
                serde_json::to_value(profile_type).unwrap(),
                json!(profile_type.as_str())
            );
        }
        assert_eq!(
            serde_json::to_value(CertificateType::DeveloperIdKext).unwrap(),
            json!(CertificateType::DeveloperIdKext.as_str())
        );
    }

    #[test]
    fn test_unknown_profile_type_tolerated() {
        let parsed: ProfileType =
            serde_json::from_value(json!("MAC_CATALYST_APP_DEVELOPMENT")).unwrap();
        assert_eq!(parsed, ProfileType::Unknown);
        assert!(serde_json::from_value::<ProfileState>(json!("EXPIRED")).is_err());
    }

    #[test]
    fn test_unknown_certificate_type_tolerated() {
        let parsed: CertificateType = serde_json::from_value(json!("PASS_TYPE_ID")).unwrap();
        assert_eq!(parsed, CertificateType::Unknown);
    }

    #[test]
    fn test_decode_content_missing() {
        let cert = Certificate {
            resource_type: CERTIFICATES.to_string(),
            id: "C1".to_string(),
            attributes: CertificateAttributes::default(),
            links: DocumentLinks::default(),
        };
        assert!(matches!(cert.decode_content(), Err(AppStoreError::Decode(_))));
    }

    #[test]
    fn test_decode_content_invalid_base64() {
        let mut cert = Certificate {
            resource_type: CERTIFICATES.to_string(),
            id: "C1".to_string(),
            attributes: CertificateAttributes::default(),
            links: DocumentLinks::default(),
        };
        cert.attributes.certificate_content = Some("***not base64***".to_string());
        assert!(matches!(cert.decode_content(), Err(AppStoreError::Decode(_))));
    }

    #[test]
    fn test_profile_create_request_shape() {
        let request = ProfileCreateRequest::new(
            "Dev Profile",
            ProfileType::IosAppDevelopment,
            "BUNDLE1",
            &["CERT1".to_string()],
            &["DEV1".to_string(), "DEV2".to_string()],
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "data": {
                    "type": "profiles",
                    "attributes": {
                        "name": "Dev Profile",
                        "profileType": "IOS_APP_DEVELOPMENT"
                    },
                    "relationships": {
                        "bundleId": {"data": {"type": "bundleIds", "id": "BUNDLE1"}},
                        "certificates": {"data": [{"type": "certificates", "id": "CERT1"}]},
                        "devices": {"data": [
                            {"type": "devices", "id": "DEV1"},
                            {"type": "devices", "id": "DEV2"}
                        ]}
                    }
                }
            })
        );
    }

    #[test]
    fn test_device_update_request_omits_unset_fields() {
        let request = DeviceUpdateRequest::new("D1", None, Some(DeviceStatus::Disabled));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["data"]["attributes"], json!({"status": "DISABLED"}));
        assert_eq!(value["data"]["id"], json!("D1"));
    }
}
