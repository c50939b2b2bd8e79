use crate::connect_api::credential::Credential;
use crate::connect_api::types::AppStoreError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Audience claim required by App Store Connect
pub const AUDIENCE: &str = "appstoreconnect-v1";

/// Source of the current time for token age and expiry computations
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Token lifetime and reuse policy
///
/// `lifetime` is added to the signing time to form the `exp` claim. A cached
/// token is reused until its age exceeds `refresh_after`, then re-signed.
///
/// The default refreshes after 1000 seconds, before the 1200 second lifetime
/// runs out. [`TokenPolicy::legacy`] keeps a token for 3000 seconds, which means
/// requests made between minute 20 and minute 50 carry an expired token; it
/// exists only for callers that need to match that historical behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    lifetime: Duration,
    refresh_after: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::seconds(1200),
            refresh_after: Duration::seconds(1000),
        }
    }
}

impl TokenPolicy {
    /// Create a policy from a lifetime and freshness window, in seconds
    pub fn new(lifetime_secs: i64, refresh_after_secs: i64) -> Self {
        let policy = Self {
            lifetime: Duration::seconds(lifetime_secs),
            refresh_after: Duration::seconds(refresh_after_secs),
        };
        if !policy.refreshes_before_expiry() {
            tracing::warn!(
                "Token freshness window ({}s) exceeds token lifetime ({}s); expired tokens will be sent",
                refresh_after_secs,
                lifetime_secs
            );
        }
        policy
    }

    /// The 1200s lifetime / 3000s reuse window of earlier releases
    pub fn legacy() -> Self {
        Self::new(1200, 3000)
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn refresh_after(&self) -> Duration {
        self.refresh_after
    }

    /// Whether a cached token is always replaced before its `exp` passes
    pub fn refreshes_before_expiry(&self) -> bool {
        self.refresh_after < self.lifetime
    }

    fn is_stale(&self, age: Duration) -> bool {
        age > self.refresh_after
    }
}

/// Claims carried by an App Store Connect bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPayload {
    pub aud: String,
    pub exp: i64,
    pub iss: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Debug, Clone)]
struct CachedToken {
    bearer: String,
    created: DateTime<Utc>,
}

#[derive(Default)]
struct TokenState {
    keys: Option<SigningKeys>,
    cached: Option<CachedToken>,
}

/// Produces bearer tokens for outbound requests
///
/// Tokens are signed lazily and reused until they fall outside the
/// [`TokenPolicy`] freshness window. Key derivation, the cache check and any
/// re-signing happen under one lock, so concurrent callers never sign twice
/// for the same refresh.
pub struct Authenticator {
    credential: Credential,
    policy: TokenPolicy,
    clock: Arc<dyn Clock>,
    state: Mutex<TokenState>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("credential", &self.credential)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Create an authenticator with the default policy and the system clock
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            policy: TokenPolicy::default(),
            clock: Arc::new(SystemClock),
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Set the token policy (builder pattern)
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the clock (builder pattern)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Return a bearer token, signing a new one if none is cached or the
    /// cached one is stale
    ///
    /// # Example
    ///
    /// ```no_run
    /// use appstore_connect_sdk::{Authenticator, Credential};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let credential = Credential::from_file("ABC123DEFG", "issuer-uuid", "AuthKey.p8")?;
    /// let auth = Authenticator::new(credential);
    ///
    /// let first = auth.authorization()?;
    /// let second = auth.authorization()?;
    /// assert_eq!(first, second);
    /// # Ok(())
    /// # }
    /// ```
    pub fn authorization(&self) -> Result<String, AppStoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| AppStoreError::Signing(format!("Token cache lock poisoned: {}", e)))?;

        if state.keys.is_none() {
            state.keys = Some(self.derive_keys()?);
            tracing::debug!("Signing key initialized for kid={}", self.credential.key_id());
        }

        let now = self.clock.now();
        if let Some(cached) = &state.cached {
            let age = now - cached.created;
            if !self.policy.is_stale(age) {
                tracing::debug!("Bearer token cache hit (age {}s)", age.num_seconds());
                return Ok(cached.bearer.clone());
            }
            tracing::debug!("Bearer token is stale (age {}s), re-signing", age.num_seconds());
        }

        let bearer = match &state.keys {
            Some(keys) => self.sign(&keys.encoding, now)?,
            None => return Err(AppStoreError::Signing("Signing key unavailable".to_string())),
        };

        tracing::info!(
            "Signed new bearer token for kid={}, expires at {}",
            self.credential.key_id(),
            now + self.policy.lifetime
        );

        state.cached = Some(CachedToken {
            bearer: bearer.clone(),
            created: now,
        });
        Ok(bearer)
    }

    /// `Authorization` header value for the current token
    pub fn bearer_header(&self) -> Result<String, AppStoreError> {
        Ok(format!("Bearer {}", self.authorization()?))
    }

    /// Verify a bearer token against this authenticator's key
    ///
    /// Checks the ES256 signature, the audience, the issuer and the expiry
    /// (measured with this authenticator's clock) and returns the token header.
    pub fn verify(&self, token: &str) -> Result<Header, AppStoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| AppStoreError::Verification(format!("Token cache lock poisoned: {}", e)))?;

        if state.keys.is_none() {
            state.keys = Some(self.derive_keys()?);
        }
        let keys = match &state.keys {
            Some(keys) => keys,
            None => {
                return Err(AppStoreError::Verification(
                    "Verification key unavailable".to_string(),
                ))
            }
        };

        let mut validation = Validation::new(Algorithm::ES256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_issuer(&[self.credential.issuer_id()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;

        let data = decode::<ApiPayload>(token, &keys.decoding, &validation)
            .map_err(|e| AppStoreError::Verification(e.to_string()))?;

        let now = self.clock.now().timestamp();
        if data.claims.exp < now {
            return Err(AppStoreError::Verification(format!(
                "Token expired at {}, now {}",
                data.claims.exp, now
            )));
        }

        tracing::debug!(
            "Bearer token verified: kid={:?}, exp={}",
            data.header.kid,
            data.claims.exp
        );
        Ok(data.header)
    }

    fn derive_keys(&self) -> Result<SigningKeys, AppStoreError> {
        let encoding = EncodingKey::from_ec_der(&self.credential.pkcs8_der()?);
        let (x, y) = self.credential.public_coordinates()?;
        let decoding =
            DecodingKey::from_ec_components(&URL_SAFE_NO_PAD.encode(x), &URL_SAFE_NO_PAD.encode(y))
                .map_err(|e| AppStoreError::Signing(format!("Invalid public key: {}", e)))?;
        Ok(SigningKeys { encoding, decoding })
    }

    fn sign(&self, key: &EncodingKey, now: DateTime<Utc>) -> Result<String, AppStoreError> {
        let claims = ApiPayload {
            aud: AUDIENCE.to_string(),
            exp: (now + self.policy.lifetime).timestamp(),
            iss: self.credential.issuer_id().to_string(),
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.credential.key_id().to_string());

        encode(&header, &claims, key).map_err(|e| {
            tracing::error!("Failed to sign bearer token: {}", e);
            AppStoreError::Signing(e.to_string())
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AppStoreError> {
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppStoreError::Verification("Authorization header must start with 'Bearer '".to_string())
    })?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AppStoreError::Verification(
            "Missing token in Authorization header".to_string(),
        ));
    }
    Ok(token)
}
