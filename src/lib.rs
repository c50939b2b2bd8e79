//! App Store Connect SDK
//!
//! A Rust library for the App Store Connect API.
//!
//! This SDK provides:
//! - ES256 bearer token generation from `.p8` API keys, with token caching
//! - An async API client for bundle IDs, certificates, devices and provisioning profiles
//! - Query string builders for the list endpoints
//! - Helpers for saving downloaded certificates and profiles
//!
//! # Example
//!
//! ```no_run
//! use appstore_connect_sdk::{
//!     Authenticator,
//!     ConnectClient,
//!     Credential,
//!     ListProfilesQuery,
//!     ProfileState,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load the API key downloaded from App Store Connect
//! let credential = Credential::from_file(
//!     "ABC123DEFG",
//!     "57246542-96fe-1a63-e053-0824d011072a",
//!     "AuthKey_ABC123DEFG.p8",
//! )?;
//!
//! let client = ConnectClient::new(Authenticator::new(credential))?;
//!
//! // List active profiles
//! let query = ListProfilesQuery::new().with_profile_state(ProfileState::Active);
//! let profiles = client.profiles().list(Some(&query)).await?;
//!
//! // Download the first one
//! if let Some(profile) = profiles.data.first() {
//!     let full = client.profiles().read(&profile.id).await?;
//!     full.data.save_content_to_file("dev.mobileprovision").await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connect_api;
pub mod storage;

pub use config::ClientConfig;
pub use connect_api::{
    decode_response, extract_bearer_token, parse_private_key, url_with_query, ApiErrorDetail,
    ApiPayload, AppStoreError, Authenticator, Clock, ConnectClient, Credential, ErrorResponse,
    SystemClock, ToQueryString, TokenPolicy,
};
pub use connect_api::query::{
    ListBundlesQuery, ListCertificatesQuery, ListDevicesQuery, ListProfilesQuery,
};
pub use connect_api::resources::*;
pub use storage::{FilesystemStorage, StorageBackend, StorageError};
