//! Client configuration
//!
//! Options are built with the builder pattern and may be overridden from the
//! environment with [`ClientConfig::from_env`].

use crate::connect_api::types::AppStoreError;
use std::time::Duration;

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

pub const ENV_BASE_URL: &str = "APP_STORE_CONNECT_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "APP_STORE_CONNECT_TIMEOUT_SECS";
pub const ENV_SWALLOW_TRANSPORT_ERRORS: &str = "APP_STORE_CONNECT_SWALLOW_TRANSPORT_ERRORS";
pub const ENV_KEY_ID: &str = "APP_STORE_CONNECT_KEY_ID";
pub const ENV_ISSUER_ID: &str = "APP_STORE_CONNECT_ISSUER_ID";
pub const ENV_KEY_PATH: &str = "APP_STORE_CONNECT_KEY_PATH";

/// HTTP client options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host of the API; resource paths are appended as `/v1/<resource>`
    pub base_url: String,

    /// Per-request timeout. `None` waits indefinitely; dropping the request
    /// future still cancels it.
    pub timeout: Option<Duration>,

    /// Compatibility mode: network failures produce an empty body instead of
    /// [`AppStoreError::Transport`]. Off by default.
    pub swallow_transport_errors: bool,

    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(30)),
            swallow_transport_errors: false,
            user_agent: format!("appstore-connect-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL (builder pattern)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the per-request timeout (builder pattern)
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Enable or disable transport error swallowing (builder pattern)
    pub fn with_swallow_transport_errors(mut self, swallow: bool) -> Self {
        self.swallow_transport_errors = swallow;
        self
    }

    /// Set the User-Agent header (builder pattern)
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Defaults overridden by `APP_STORE_CONNECT_*` environment variables
    ///
    /// Unset variables keep their default. A timeout of `0` disables the timeout.
    pub fn from_env() -> Result<Self, AppStoreError> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url.trim());
            }
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppStoreError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config.timeout = if secs == 0 {
                None
            } else {
                Some(Duration::from_secs(secs))
            };
        }

        if let Ok(raw) = std::env::var(ENV_SWALLOW_TRANSPORT_ERRORS) {
            config.swallow_transport_errors = parse_flag(ENV_SWALLOW_TRANSPORT_ERRORS, &raw)?;
        }

        tracing::debug!("Loaded client configuration: {:?}", config);
        Ok(config)
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, AppStoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppStoreError::Config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}
