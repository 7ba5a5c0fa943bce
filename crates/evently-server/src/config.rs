//! Server configuration.
//!
//! Everything comes from `EVENTLY_*` environment variables; nothing is
//! hardcoded. The state-signing secret is mandatory and the server refuses
//! to start without it.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "EVENTLY_";

/// Default bind address when `EVENTLY_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default outbound request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors raised while loading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A mandatory variable is unset.
    #[error("environment variable {0} is required")]
    Missing(String),

    /// A variable is set but unparsable.
    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// OAuth client credentials for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// The server's runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Externally reachable base URL, used to build redirect URIs.
    pub public_base_url: String,
    /// Secret the state codec signs with. Never defaulted.
    pub state_secret: String,
    /// Google OAuth credentials, if the provider is enabled.
    pub google: Option<ProviderCredentials>,
    /// LinkedIn OAuth credentials, if the provider is enabled.
    pub linkedin: Option<ProviderCredentials>,
    /// Maps API key; enables geocoding at onsite event creation.
    pub maps_api_key: Option<String>,
    /// Timeout applied to outbound provider requests.
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through the given variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        let state_secret = var("STATE_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::Missing(format!("{ENV_PREFIX}STATE_SECRET")))?;

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|e| ConfigError::Invalid {
            name: format!("{ENV_PREFIX}BIND_ADDR"),
            reason: format!("{e}"),
        })?;

        let public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{bind_addr}"))
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|e| ConfigError::Invalid {
                    name: format!("{ENV_PREFIX}REQUEST_TIMEOUT_SECS"),
                    reason: format!("{e}"),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let provider = |prefix: &str| -> Option<ProviderCredentials> {
            let client_id = var(&format!("{prefix}_CLIENT_ID"))?;
            let client_secret = var(&format!("{prefix}_CLIENT_SECRET"))?;
            Some(ProviderCredentials {
                client_id,
                client_secret,
            })
        };

        Ok(Self {
            bind_addr,
            public_base_url,
            state_secret,
            google: provider("GOOGLE"),
            linkedin: provider("LINKEDIN"),
            maps_api_key: var("MAPS_API_KEY"),
            request_timeout,
        })
    }

    /// Returns the callback redirect URI for a provider.
    pub fn redirect_uri(&self, provider_id: &str) -> String {
        format!("{}/grant/{provider_id}/callback/", self.public_base_url)
    }
}
