//! The provider adapter contract.
//!
//! This module defines [`OAuthAdapter`], the capability set a provider
//! integration implements: endpoint configuration, credential exchange
//! mechanics, and the registry of named complete-actions. The grant and
//! callback code work exclusively against this trait, so adding a provider
//! never touches them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::error::{OAuthError, OAuthResult};
use crate::state::AuthorizationState;
use crate::token::{TokenCredential, TokenResponse};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe; adapters are stored behind
/// `Arc<dyn OAuthAdapter>` in the server's registry.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Static configuration bound to one provider.
///
/// Immutable after configuration load; owned by the adapter.
#[derive(Debug, Clone)]
pub struct ProviderApp {
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// The provider's consent endpoint.
    pub authorize_url: String,
    /// The provider's token endpoint.
    pub token_url: String,
    /// Where the provider redirects after consent.
    pub redirect_uri: String,
    /// Scopes requested at grant time.
    pub scopes: Vec<String>,
}

impl ProviderApp {
    /// Creates a provider app configuration.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
        }
    }

    /// Builder: set the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Builder: add one scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Builder: override the token endpoint (used by tests and proxies).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Returns the space-joined scope string.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.is_empty() {
            return Err("client_id is required".to_string());
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required".to_string());
        }
        Url::parse(&self.authorize_url).map_err(|e| format!("invalid authorize_url: {e}"))?;
        Url::parse(&self.token_url).map_err(|e| format!("invalid token_url: {e}"))?;
        if self.redirect_uri.is_empty() {
            return Err("redirect_uri is required".to_string());
        }
        Ok(())
    }
}

/// How the provider's token endpoint wants the exchange request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenRequestMethod {
    /// Form-encoded POST (the common case).
    #[default]
    Post,
    /// Query-string GET (LinkedIn's historical quirk).
    Get,
}

/// Error returned when an action string does not name a known action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

/// The named downstream operations an adapter can perform after obtaining
/// a token.
///
/// Action names arrive as strings in the grant request and in the decoded
/// state; parsing rejects unknown names up front, so a typo never reaches
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Insert an event into the user's calendar.
    EventInsert,
    /// Retrieve the user's profile.
    ProfileRetrieve,
}

impl ActionKind {
    /// Returns the wire name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventInsert => "event_insert",
            Self::ProfileRetrieve => "profile_retrieve",
        }
    }
}

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event_insert" => Ok(Self::EventInsert),
            "profile_retrieve" => Ok(Self::ProfileRetrieve),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The structured result of a completed action.
///
/// Serialized as `{"message": ..., <extra fields>}`; each handler decides
/// what extra fields it returns (e.g. `event_data` for calendar inserts).
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    /// Human-readable summary of what the action did.
    pub message: String,
    /// Handler-specific payload, flattened into the response body.
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ActionOutcome {
    /// Creates an outcome with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: serde_json::Map::new(),
        }
    }

    /// Builder: attach a payload field.
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// The capability set implemented once per identity provider.
///
/// An adapter knows its provider's endpoints, how to exchange an
/// authorization code for tokens, and which actions it can complete. The
/// supported action set is fixed at construction; dispatching an action the
/// adapter did not register is a configuration error, not a user error.
pub trait OAuthAdapter: Send + Sync {
    /// The provider identifier used in URLs (e.g., "google").
    fn provider_id(&self) -> &str;

    /// The provider's static app configuration.
    fn app(&self) -> &ProviderApp;

    /// How the token endpoint wants the exchange request.
    fn token_request_method(&self) -> TokenRequestMethod {
        TokenRequestMethod::default()
    }

    /// The actions this adapter registered at construction.
    fn supported_actions(&self) -> &[ActionKind];

    /// Returns `true` if the adapter registered the given action.
    fn supports(&self, action: ActionKind) -> bool {
        self.supported_actions().contains(&action)
    }

    /// Exchanges an authorization code for the raw token response.
    ///
    /// Single attempt; never retried. Provider-specific differences (GET vs
    /// POST retrieval, extra headers) are encapsulated here.
    fn exchange_code<'a>(
        &'a self,
        http: &'a reqwest::Client,
        code: &'a str,
    ) -> BoxFuture<'a, OAuthResult<TokenResponse>> {
        Box::pin(async move {
            exchange_authorization_code(http, self.app(), self.token_request_method(), code)
                .await
                .map_err(|e| e.with_provider(self.provider_id().to_string()))
        })
    }

    /// Normalizes the raw token response into a credential.
    fn parse_token(&self, raw: &TokenResponse) -> TokenCredential {
        TokenCredential::from_response(raw)
    }

    /// Performs the named action with the decoded state and fresh token.
    fn complete_action<'a>(
        &'a self,
        action: ActionKind,
        state: &'a AuthorizationState,
        token: &'a TokenCredential,
    ) -> BoxFuture<'a, OAuthResult<ActionOutcome>>;
}

/// Performs the authorization-code exchange against a token endpoint.
///
/// Sends `code`, `redirect_uri`, client id/secret, and
/// `grant_type=authorization_code`; a non-2xx answer or a network failure is
/// an error, and the call is never retried.
pub async fn exchange_authorization_code(
    http: &reqwest::Client,
    app: &ProviderApp,
    method: TokenRequestMethod,
    code: &str,
) -> OAuthResult<TokenResponse> {
    let params = [
        ("client_id", app.client_id.as_str()),
        ("client_secret", app.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", app.redirect_uri.as_str()),
    ];

    let request = match method {
        TokenRequestMethod::Post => http.post(&app.token_url).form(&params),
        TokenRequestMethod::Get => http.get(&app.token_url).query(&params),
    };

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            OAuthError::network("token request timed out")
        } else {
            OAuthError::network(format!("token request failed: {e}"))
        }
    })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| OAuthError::network(format!("failed to read token response: {e}")))?;

    if !status.is_success() {
        return Err(OAuthError::token_exchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    debug!("token exchange succeeded");
    TokenResponse::from_json(&body)
}
