//! Token types for the authorization-code exchange.
//!
//! [`TokenResponse`] is the raw JSON shape returned by a provider's token
//! endpoint; [`TokenCredential`] is the normalized form handed to action
//! handlers.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::{OAuthError, OAuthResult};

/// Raw response from a provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The access token for API requests.
    pub access_token: String,
    /// The refresh token, if the provider granted offline access.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenResponse {
    /// Parses a token endpoint body.
    pub fn from_json(body: &str) -> OAuthResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| OAuthError::upstream(format!("invalid token response: {e}")))
    }
}

/// Normalized token credentials usable against the provider's resource API.
///
/// Created from the token-exchange response; either used transiently for a
/// single downstream call or persisted by the action handler.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenCredential {
    /// The bearer access token.
    pub access_token: String,
    /// The refresh token, if granted.
    pub refresh_token: Option<String>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// The granted scopes.
    pub scopes: Vec<String>,
}

impl TokenCredential {
    /// Normalizes a raw token response.
    pub fn from_response(response: &TokenResponse) -> Self {
        let expires_at = response.expires_in.map(|secs| {
            // Subtract a buffer so callers refresh before actual expiry
            Utc::now() + Duration::seconds(secs) - Duration::seconds(60)
        });

        let scopes = response
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at,
            scopes,
        }
    }

    /// Returns `true` if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            // Some tokens carry no expiry; assume valid
            None => false,
        }
    }

    /// Returns `true` if the credential was granted the given scope.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}
