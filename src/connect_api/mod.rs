/// App Store Connect API integration module
///
/// This module provides credential loading, bearer token minting and an HTTP
/// client for the provisioning resources of App Store Connect.
///
/// ## Request Flow
///
/// 1. A [`Credential`] is loaded from the `.p8` key downloaded from App Store Connect
/// 2. The [`Authenticator`] signs an ES256 bearer token and caches it
/// 3. The [`ConnectClient`] attaches the token to every request
/// 4. Response bodies are returned raw, or decoded into resource documents
pub mod auth;
pub mod client;
pub mod credential;
pub mod query;
pub mod resources;
pub mod types;

pub use auth::{
    extract_bearer_token, ApiPayload, Authenticator, Clock, SystemClock, TokenPolicy, AUDIENCE,
};
pub use client::{decode_response, Bundles, Certificates, ConnectClient, Devices, Profiles};
pub use credential::{parse_private_key, Credential};
pub use query::{
    url_with_query, ListBundlesQuery, ListCertificatesQuery, ListDevicesQuery, ListProfilesQuery,
    Param, ParamValue, QueryParams, ToQueryString,
};
pub use resources::*;
pub use types::{ApiErrorDetail, AppStoreError, ErrorResponse};
