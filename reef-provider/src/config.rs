//! Provider configuration and credential resolution
//!
//! Credentials come from explicit configuration first, falling back to
//! the `REEF_API_KEY` / `REEF_ENDPOINT` environment variables. When an
//! endpoint is present the key is interpreted as a v2 API key and both
//! values are required; otherwise the key is treated as a disposable
//! token or legacy API key.

use thiserror::Error;

/// Environment variable holding the API key (either flavor)
pub const API_KEY_ENV: &str = "REEF_API_KEY";
/// Environment variable holding the v2 control plane endpoint
pub const ENDPOINT_ENV: &str = "REEF_ENDPOINT";

/// Errors produced while resolving provider configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An endpoint was supplied but no v2 API key accompanies it
    #[error(
        "missing v2 API key: set v2_api_key in the configuration or the {API_KEY_ENV} \
         environment variable alongside {ENDPOINT_ENV}"
    )]
    MissingV2ApiKey,

    /// Neither flavor of credential was supplied
    #[error(
        "missing credentials: set api_key in the configuration or the {API_KEY_ENV} \
         environment variable"
    )]
    MissingCredentials,

    /// The configured endpoint is not a valid URL
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The control plane client requires v2 credentials
    #[error("control plane access requires a v2 API key and endpoint")]
    EndpointRequired,
}

/// Raw provider configuration as written by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Disposable token or legacy API key
    pub api_key: Option<String>,
    /// v2 API key, used together with `v2_api_endpoint`
    pub v2_api_key: Option<String>,
    /// v2 control plane endpoint
    pub v2_api_endpoint: Option<String>,
}

/// Resolved credentials, one variant per authentication flavor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// v2 API key bound to an explicit control plane endpoint
    V2 { api_key: String, endpoint: String },
    /// Disposable token or legacy API key; no control plane endpoint
    Legacy { token: String },
}

impl ProviderConfig {
    /// Configuration taken entirely from the environment
    pub fn from_env() -> Self {
        Self::default().with_env_fallback()
    }

    /// Fill unset fields from the environment
    fn with_env_fallback(mut self) -> Self {
        let env_key = std::env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty());
        let env_endpoint = std::env::var(ENDPOINT_ENV).ok().filter(|v| !v.is_empty());

        if self.api_key.is_none() {
            self.api_key = env_key.clone();
        }
        if self.v2_api_key.is_none() {
            self.v2_api_key = env_key;
        }
        if self.v2_api_endpoint.is_none() {
            self.v2_api_endpoint = env_endpoint;
        }
        self
    }

    /// Resolve this configuration (plus environment fallback) into
    /// credentials
    ///
    /// An endpoint without a v2 key is a hard error; an endpoint with a
    /// key selects v2; otherwise the legacy token is used.
    pub fn resolve(self) -> Result<Credentials, ConfigError> {
        let config = self.with_env_fallback();
        resolve_credentials(config.api_key, config.v2_api_key, config.v2_api_endpoint)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn resolve_credentials(
    api_key: Option<String>,
    v2_api_key: Option<String>,
    endpoint: Option<String>,
) -> Result<Credentials, ConfigError> {
    let api_key = non_empty(api_key);
    let v2_api_key = non_empty(v2_api_key);
    let endpoint = non_empty(endpoint);

    match (endpoint, v2_api_key) {
        (Some(endpoint), Some(api_key)) => Ok(Credentials::V2 { api_key, endpoint }),
        (Some(_), None) => Err(ConfigError::MissingV2ApiKey),
        (None, _) => match api_key {
            Some(token) => Ok(Credentials::Legacy { token }),
            None => Err(ConfigError::MissingCredentials),
        },
    }
}
