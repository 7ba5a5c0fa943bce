//! LinkedIn OAuth adapter.
//!
//! Completes the `profile_retrieve` action against the member profile API.
//! LinkedIn's token endpoint historically accepted the exchange parameters
//! on the query string, so the adapter overrides the request method.

use std::time::Duration;

use tracing::debug;

use crate::adapter::{
    ActionKind, ActionOutcome, BoxFuture, OAuthAdapter, ProviderApp, TokenRequestMethod,
};
use crate::error::{OAuthError, OAuthResult};
use crate::state::AuthorizationState;
use crate::token::TokenCredential;

/// LinkedIn's consent endpoint.
pub const LINKEDIN_AUTHORIZE_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";

/// LinkedIn's token endpoint.
pub const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";

/// The member profile endpoint.
pub const LINKEDIN_PROFILE_URL: &str = "https://api.linkedin.com/v2/me";

/// Protocol version header required by the Rest.li API.
const RESTLI_PROTOCOL_HEADER: (&str, &str) = ("X-RestLiProtocol-Version", "2.0.0");

const SUPPORTED_ACTIONS: &[ActionKind] = &[ActionKind::ProfileRetrieve];

/// Builds the standard LinkedIn app configuration for the profile flow.
pub fn default_app(
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
    redirect_uri: impl Into<String>,
) -> ProviderApp {
    ProviderApp::new(
        client_id,
        client_secret,
        LINKEDIN_AUTHORIZE_URL,
        LINKEDIN_TOKEN_URL,
        redirect_uri,
    )
    .with_scope("r_liteprofile")
}

/// The LinkedIn provider integration.
pub struct LinkedInAdapter {
    app: ProviderApp,
    http: reqwest::Client,
    profile_url: String,
}

impl LinkedInAdapter {
    /// Creates the adapter with the given app configuration.
    pub fn new(app: ProviderApp, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            app,
            http,
            profile_url: LINKEDIN_PROFILE_URL.to_string(),
        }
    }

    /// Builder: point the profile retrieval at a different URL.
    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = url.into();
        self
    }

    /// Fetches the authorizing member's profile.
    async fn retrieve_profile(&self, token: &TokenCredential) -> OAuthResult<ActionOutcome> {
        let response = self
            .http
            .get(&self.profile_url)
            .bearer_auth(&token.access_token)
            .header(RESTLI_PROTOCOL_HEADER.0, RESTLI_PROTOCOL_HEADER.1)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OAuthError::network("profile request timed out")
                } else {
                    OAuthError::network(format!("profile request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuthError::network(format!("failed to read profile response: {e}")))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => OAuthError::permission_denied(format!(
                    "profile access denied ({status}): {body}"
                )),
                _ => OAuthError::upstream(format!("profile API returned {status}: {body}")),
            });
        }

        let profile: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| OAuthError::upstream(format!("invalid profile response: {e}")))?;

        debug!("profile retrieved");
        Ok(ActionOutcome::new("Profile retrieved").with_data("profile", profile))
    }
}

impl OAuthAdapter for LinkedInAdapter {
    fn provider_id(&self) -> &str {
        "linkedin"
    }

    fn app(&self) -> &ProviderApp {
        &self.app
    }

    fn token_request_method(&self) -> TokenRequestMethod {
        TokenRequestMethod::Get
    }

    fn supported_actions(&self) -> &[ActionKind] {
        SUPPORTED_ACTIONS
    }

    fn complete_action<'a>(
        &'a self,
        action: ActionKind,
        _state: &'a AuthorizationState,
        token: &'a TokenCredential,
    ) -> BoxFuture<'a, OAuthResult<ActionOutcome>> {
        Box::pin(async move {
            match action {
                ActionKind::ProfileRetrieve => {
                    self.retrieve_profile(token)
                        .await
                        .map_err(|e| e.with_provider(self.provider_id().to_string()))
                }
                other => Err(OAuthError::configuration(format!(
                    "no handler registered for action `{other}`"
                ))
                .with_provider(self.provider_id().to_string())),
            }
        })
    }
}
