use crate::config::ClientConfig;
use crate::connect_api::auth::Authenticator;
use crate::connect_api::query::{
    url_with_query, ListBundlesQuery, ListCertificatesQuery, ListDevicesQuery, ListProfilesQuery,
};
use crate::connect_api::resources::{
    BundleIdCreateRequest, BundleIdUpdateRequest, BundleIdsResponse, CertificateCreateRequest,
    CertificateResponse, CertificateType, CertificatesResponse, DeviceCreateRequest, DeviceStatus,
    DeviceUpdateRequest, DevicesResponse, Platform, ProfileCreateRequest, ProfileResponse,
    ProfileType, ProfilesResponse, BUNDLE_IDS, CERTIFICATES, DEVICES, PROFILES,
};
use crate::connect_api::types::{AppStoreError, ErrorResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// HTTP client for the App Store Connect API
///
/// Every request carries a bearer token from the shared [`Authenticator`].
/// Responses are returned as raw bytes whatever their HTTP status; API
/// failures arrive as a JSON `errors` envelope which [`decode_response`]
/// turns into [`AppStoreError::Api`].
#[derive(Debug, Clone)]
pub struct ConnectClient {
    authenticator: Arc<Authenticator>,
    config: ClientConfig,
    client: reqwest::Client,
}

impl ConnectClient {
    /// Create a client for the production API
    ///
    /// # Example
    ///
    /// ```no_run
    /// use appstore_connect_sdk::{Authenticator, ConnectClient, Credential, ListBundlesQuery};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let credential = Credential::from_file("ABC123DEFG", "issuer-uuid", "AuthKey.p8")?;
    /// let client = ConnectClient::new(Authenticator::new(credential))?;
    ///
    /// let query = ListBundlesQuery::new().with_name("Foo").with_limit(10);
    /// let bundles = client.bundles().list(Some(&query)).await?;
    /// println!("Found {} bundle ids", bundles.data.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(authenticator: Authenticator) -> Result<Self, AppStoreError> {
        Self::with_config(authenticator, ClientConfig::default())
    }

    /// Create a client with explicit options
    pub fn with_config(
        authenticator: Authenticator,
        config: ClientConfig,
    ) -> Result<Self, AppStoreError> {
        Self::with_shared_authenticator(Arc::new(authenticator), config)
    }

    /// Create a client that shares its token cache with other clients
    pub fn with_shared_authenticator(
        authenticator: Arc<Authenticator>,
        config: ClientConfig,
    ) -> Result<Self, AppStoreError> {
        tracing::debug!("Creating ConnectClient with base URL: {}", config.base_url);

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppStoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            authenticator,
            config,
            client,
        })
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL for this client
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// `<base_url>/v1/<path>`
    pub fn resource_url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send one authenticated request and return the raw response body
    ///
    /// The HTTP status is not inspected. Network failures are returned as
    /// [`AppStoreError::Transport`], or as an empty body when
    /// [`ClientConfig::swallow_transport_errors`] is set. Dropping the returned
    /// future cancels the request.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, AppStoreError> {
        let token = self.authenticator.authorization()?;

        tracing::debug!("Sending {} request to: {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return self.transport_failure(&method, url, e),
        };

        let status = response.status();
        tracing::debug!("Received response with status: {}", status);

        match response.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(e) => self.transport_failure(&method, url, e),
        }
    }

    fn transport_failure(
        &self,
        method: &Method,
        url: &str,
        err: reqwest::Error,
    ) -> Result<Vec<u8>, AppStoreError> {
        if self.config.swallow_transport_errors {
            tracing::warn!(
                "Ignoring transport failure for {} {}: {}",
                method,
                url,
                err
            );
            Ok(Vec::new())
        } else {
            tracing::error!("Request {} {} failed: {}", method, url, err);
            Err(AppStoreError::from(err))
        }
    }

    pub async fn get(&self, url: &str) -> Result<Vec<u8>, AppStoreError> {
        self.authenticated_request(Method::GET, url, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Vec<u8>, AppStoreError> {
        let body = serde_json::to_vec(body)?;
        self.authenticated_request(Method::POST, url, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Vec<u8>, AppStoreError> {
        let body = serde_json::to_vec(body)?;
        self.authenticated_request(Method::PATCH, url, Some(body)).await
    }

    pub async fn delete(&self, url: &str) -> Result<Vec<u8>, AppStoreError> {
        self.authenticated_request(Method::DELETE, url, None).await
    }

    pub fn bundles(&self) -> Bundles<'_> {
        Bundles { client: self }
    }

    pub fn certificates(&self) -> Certificates<'_> {
        Certificates { client: self }
    }

    pub fn devices(&self) -> Devices<'_> {
        Devices { client: self }
    }

    pub fn profiles(&self) -> Profiles<'_> {
        Profiles { client: self }
    }
}

/// Decode a response body, surfacing an `errors` envelope as [`AppStoreError::Api`]
pub fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppStoreError> {
    if body.is_empty() {
        return Err(AppStoreError::Decode("Empty response body".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)?;
    if value.get("errors").is_some() {
        let envelope: ErrorResponse = serde_json::from_value(value)?;
        if envelope.has_errors() {
            tracing::debug!("API returned error envelope: {}", envelope);
            return Err(AppStoreError::Api(envelope));
        }
        return Err(AppStoreError::Decode(
            "Response carried an empty errors array".to_string(),
        ));
    }

    Ok(serde_json::from_value(value)?)
}

/// Bundle ID endpoints
#[derive(Debug, Clone, Copy)]
pub struct Bundles<'a> {
    client: &'a ConnectClient,
}

impl Bundles<'_> {
    /// `GET /v1/bundleIds`, raw body
    pub async fn query(&self, query: Option<&ListBundlesQuery>) -> Result<Vec<u8>, AppStoreError> {
        let url = url_with_query(self.client.resource_url(BUNDLE_IDS), query);
        self.client.get(&url).await
    }

    /// `GET /v1/bundleIds`, decoded
    pub async fn list(
        &self,
        query: Option<&ListBundlesQuery>,
    ) -> Result<BundleIdsResponse, AppStoreError> {
        decode_response(&self.query(query).await?)
    }

    /// Register an iOS bundle ID
    pub async fn create(
        &self,
        identifier: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Vec<u8>, AppStoreError> {
        self.create_with_platform(identifier, name, Platform::Ios).await
    }

    /// Register a bundle ID for the given platform
    pub async fn create_with_platform(
        &self,
        identifier: impl Into<String>,
        name: impl Into<String>,
        platform: Platform,
    ) -> Result<Vec<u8>, AppStoreError> {
        let request = BundleIdCreateRequest::new(identifier, name, platform);
        tracing::info!(
            "Registering bundle id {}",
            request.data.attributes.identifier
        );
        self.client
            .post(&self.client.resource_url(BUNDLE_IDS), &request)
            .await
    }

    /// Rename a bundle ID
    pub async fn update(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Vec<u8>, AppStoreError> {
        let request = BundleIdUpdateRequest::new(id, name);
        let url = self
            .client
            .resource_url(&format!("{}/{}", BUNDLE_IDS, request.data.id));
        self.client.patch(&url, &request).await
    }

    pub async fn delete(&self, id: &str) -> Result<Vec<u8>, AppStoreError> {
        let url = self.client.resource_url(&format!("{}/{}", BUNDLE_IDS, id));
        self.client.delete(&url).await
    }
}

/// Certificate endpoints
#[derive(Debug, Clone, Copy)]
pub struct Certificates<'a> {
    client: &'a ConnectClient,
}

impl Certificates<'_> {
    /// `GET /v1/certificates`, raw body
    pub async fn query(
        &self,
        query: Option<&ListCertificatesQuery>,
    ) -> Result<Vec<u8>, AppStoreError> {
        let url = url_with_query(self.client.resource_url(CERTIFICATES), query);
        self.client.get(&url).await
    }

    /// `GET /v1/certificates`, decoded
    pub async fn list(
        &self,
        query: Option<&ListCertificatesQuery>,
    ) -> Result<CertificatesResponse, AppStoreError> {
        decode_response(&self.query(query).await?)
    }

    /// `GET /v1/certificates/{id}`, decoded
    pub async fn read(&self, id: &str) -> Result<CertificateResponse, AppStoreError> {
        let url = self.client.resource_url(&format!("{}/{}", CERTIFICATES, id));
        decode_response(&self.client.get(&url).await?)
    }

    /// Create a certificate from a certificate signing request
    pub async fn create(
        &self,
        csr_content: impl Into<String>,
        certificate_type: CertificateType,
    ) -> Result<Vec<u8>, AppStoreError> {
        let request = CertificateCreateRequest::new(csr_content, certificate_type);
        tracing::info!("Creating {} certificate", certificate_type.as_str());
        self.client
            .post(&self.client.resource_url(CERTIFICATES), &request)
            .await
    }

    /// `DELETE /v1/certificates/{id}`
    pub async fn revoke(&self, id: &str) -> Result<Vec<u8>, AppStoreError> {
        let url = self.client.resource_url(&format!("{}/{}", CERTIFICATES, id));
        self.client.delete(&url).await
    }
}

/// Device endpoints
#[derive(Debug, Clone, Copy)]
pub struct Devices<'a> {
    client: &'a ConnectClient,
}

impl Devices<'_> {
    /// `GET /v1/devices`, raw body
    pub async fn query(&self, query: Option<&ListDevicesQuery>) -> Result<Vec<u8>, AppStoreError> {
        let url = url_with_query(self.client.resource_url(DEVICES), query);
        self.client.get(&url).await
    }

    /// `GET /v1/devices`, decoded
    pub async fn list(
        &self,
        query: Option<&ListDevicesQuery>,
    ) -> Result<DevicesResponse, AppStoreError> {
        decode_response(&self.query(query).await?)
    }

    /// Register an iOS device
    pub async fn create(
        &self,
        udid: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Vec<u8>, AppStoreError> {
        let request = DeviceCreateRequest::new(udid, name, Platform::Ios);
        tracing::info!("Registering device {}", request.data.attributes.udid);
        self.client
            .post(&self.client.resource_url(DEVICES), &request)
            .await
    }

    /// Rename or enable/disable a registered device
    pub async fn update(
        &self,
        id: impl Into<String>,
        name: Option<String>,
        status: Option<DeviceStatus>,
    ) -> Result<Vec<u8>, AppStoreError> {
        let request = DeviceUpdateRequest::new(id, name, status);
        let url = self
            .client
            .resource_url(&format!("{}/{}", DEVICES, request.data.id));
        self.client.patch(&url, &request).await
    }
}

/// Provisioning profile endpoints
#[derive(Debug, Clone, Copy)]
pub struct Profiles<'a> {
    client: &'a ConnectClient,
}

impl Profiles<'_> {
    /// `GET /v1/profiles`, raw body
    pub async fn query(&self, query: Option<&ListProfilesQuery>) -> Result<Vec<u8>, AppStoreError> {
        let url = url_with_query(self.client.resource_url(PROFILES), query);
        self.client.get(&url).await
    }

    /// `GET /v1/profiles`, decoded
    pub async fn list(
        &self,
        query: Option<&ListProfilesQuery>,
    ) -> Result<ProfilesResponse, AppStoreError> {
        decode_response(&self.query(query).await?)
    }

    /// `GET /v1/profiles/{id}`, decoded
    pub async fn read(&self, id: &str) -> Result<ProfileResponse, AppStoreError> {
        let url = self.client.resource_url(&format!("{}/{}", PROFILES, id));
        decode_response(&self.client.get(&url).await?)
    }

    /// Create a provisioning profile for a bundle ID
    pub async fn create(
        &self,
        name: impl Into<String>,
        profile_type: ProfileType,
        bundle_id: impl Into<String>,
        certificate_ids: &[String],
        device_ids: &[String],
    ) -> Result<Vec<u8>, AppStoreError> {
        let request =
            ProfileCreateRequest::new(name, profile_type, bundle_id, certificate_ids, device_ids);
        tracing::info!(
            "Creating {} profile '{}' with {} certificates and {} devices",
            profile_type.as_str(),
            request.data.attributes.name,
            certificate_ids.len(),
            device_ids.len()
        );
        self.client
            .post(&self.client.resource_url(PROFILES), &request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Vec<u8>, AppStoreError> {
        let url = self.client.resource_url(&format!("{}/{}", PROFILES, id));
        self.client.delete(&url).await
    }
}
