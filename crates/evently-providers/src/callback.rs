//! Callback handling.
//!
//! The provider redirects back here with an authorization code. One request
//! moves through a fixed sequence of stages:
//!
//! `Received -> Validated -> TokenExchanged -> StateDecoded -> Dispatched ->
//! Complete | Failed`
//!
//! Every external call is attempted exactly once; a user who hits a failure
//! retries by restarting the grant. Replaying a callback URL re-submits an
//! already-consumed code, which the provider rejects and which surfaces as a
//! token-exchange error.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::adapter::{ActionKind, ActionOutcome, OAuthAdapter};
use crate::error::{OAuthError, OAuthResult};
use crate::state::StateCodec;

/// Default timeout for the token exchange and downstream calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Query parameters of a provider callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    /// The authorization code, present on success.
    pub code: Option<String>,
    /// The signed state issued at grant time.
    pub state: Option<String>,
    /// The provider's error indication (e.g. `access_denied`).
    pub error: Option<String>,
    /// Scopes the user actually granted.
    pub scope: Option<String>,
}

/// The stages of one callback request, for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validated,
    TokenExchanged,
    StateDecoded,
    Dispatched,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validated => "validated",
            Self::TokenExchanged => "token_exchanged",
            Self::StateDecoded => "state_decoded",
            Self::Dispatched => "dispatched",
        };
        write!(f, "{name}")
    }
}

/// Drives a provider callback to completion.
///
/// Holds the state codec and the outbound HTTP client; receives the adapter
/// per call, so one handler serves every registered provider.
#[derive(Debug, Clone)]
pub struct CallbackHandler {
    codec: StateCodec,
    http: reqwest::Client,
}

impl CallbackHandler {
    /// Creates a handler with the given codec and outbound timeout.
    pub fn new(codec: StateCodec, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self { codec, http }
    }

    /// Returns the state codec this handler verifies with.
    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }

    /// Handles one provider callback.
    ///
    /// Validates the query, exchanges the code, verifies the state, and
    /// dispatches the matching action on the adapter. No step is retried;
    /// the first failure wins.
    pub async fn handle(
        &self,
        adapter: &dyn OAuthAdapter,
        query: &CallbackQuery,
    ) -> OAuthResult<ActionOutcome> {
        let provider = adapter.provider_id();

        // Received -> Validated: refuse before any outbound call.
        if let Some(provider_error) = &query.error {
            return Err(OAuthError::authorization_denied(provider_error.clone())
                .with_provider(provider.to_string()));
        }
        let code = query.code.as_deref().ok_or_else(|| {
            OAuthError::missing_code("code is not present in the query parameters")
                .with_provider(provider.to_string())
        })?;
        debug!(provider, stage = %Stage::Validated, "callback accepted");

        // Validated -> TokenExchanged: single attempt, never retried.
        let raw = adapter.exchange_code(&self.http, code).await?;
        let token = adapter.parse_token(&raw);
        debug!(provider, stage = %Stage::TokenExchanged, "credentials obtained");

        // TokenExchanged -> StateDecoded: verification is unconditional; no
        // action runs on unverified state.
        let state = self
            .codec
            .decode(query.state.as_deref())
            .map_err(|e| e.with_provider(provider.to_string()))?;
        debug!(provider, stage = %Stage::StateDecoded, "state verified");

        // StateDecoded -> Dispatched: an unregistered action is a deployment
        // defect, not a user error.
        let action_name = state.action().ok_or_else(|| {
            OAuthError::missing_action("no action was specified in the decoded state")
                .with_provider(provider.to_string())
        })?;
        let action: ActionKind = action_name.parse().map_err(|e| {
            OAuthError::configuration(format!("{e}")).with_provider(provider.to_string())
        })?;
        if !adapter.supports(action) {
            return Err(OAuthError::configuration(format!(
                "no handler registered for action `{action}`"
            ))
            .with_provider(provider.to_string()));
        }
        debug!(provider, %action, stage = %Stage::Dispatched, "dispatching action");

        // Dispatched -> Complete | Failed.
        let outcome = adapter.complete_action(action, &state, &token).await?;
        info!(provider, %action, "action completed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{BoxFuture, ProviderApp, TokenRequestMethod};
    use crate::error::OAuthErrorCode;
    use crate::state::AuthorizationState;
    use crate::token::{TokenCredential, TokenResponse};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Adapter stub that records whether the exchange and action ran.
    struct StubAdapter {
        app: ProviderApp,
        actions: Vec<ActionKind>,
        exchanged: AtomicBool,
        completed: AtomicBool,
        seen_token: Mutex<Option<String>>,
    }

    impl StubAdapter {
        fn new(actions: Vec<ActionKind>) -> Self {
            Self {
                app: ProviderApp::new(
                    "client-id",
                    "client-secret",
                    "https://provider.example/authorize",
                    "https://provider.example/token",
                    "https://app.example/grant/stub/callback/",
                ),
                actions,
                exchanged: AtomicBool::new(false),
                completed: AtomicBool::new(false),
                seen_token: Mutex::new(None),
            }
        }
    }

    impl OAuthAdapter for StubAdapter {
        fn provider_id(&self) -> &str {
            "stub"
        }

        fn app(&self) -> &ProviderApp {
            &self.app
        }

        fn token_request_method(&self) -> TokenRequestMethod {
            TokenRequestMethod::Post
        }

        fn supported_actions(&self) -> &[ActionKind] {
            &self.actions
        }

        fn exchange_code<'a>(
            &'a self,
            _http: &'a reqwest::Client,
            code: &'a str,
        ) -> BoxFuture<'a, OAuthResult<TokenResponse>> {
            self.exchanged.store(true, Ordering::SeqCst);
            let body = format!(r#"{{"access_token": "token-for-{code}"}}"#);
            Box::pin(async move { TokenResponse::from_json(&body) })
        }

        fn complete_action<'a>(
            &'a self,
            action: ActionKind,
            _state: &'a AuthorizationState,
            token: &'a TokenCredential,
        ) -> BoxFuture<'a, OAuthResult<ActionOutcome>> {
            self.completed.store(true, Ordering::SeqCst);
            *self.seen_token.lock().unwrap() = Some(token.access_token.clone());
            Box::pin(async move { Ok(ActionOutcome::new(format!("completed {action}"))) })
        }
    }

    fn handler() -> CallbackHandler {
        CallbackHandler::new(StateCodec::new("test-signing-secret"), DEFAULT_TIMEOUT)
    }

    fn signed_state(handler: &CallbackHandler, action: &str) -> String {
        handler
            .codec()
            .encode(&AuthorizationState::from_params([("action", action)]))
            .unwrap()
    }

    #[tokio::test]
    async fn provider_error_short_circuits_before_exchange() {
        let handler = handler();
        let adapter = StubAdapter::new(vec![ActionKind::EventInsert]);
        let query = CallbackQuery {
            error: Some("access_denied".to_string()),
            ..Default::default()
        };

        let err = handler.handle(&adapter, &query).await.unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::AuthorizationDenied);
        assert!(err.message().contains("access_denied"));
        assert!(!adapter.exchanged.load(Ordering::SeqCst));
        assert!(!adapter.completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn missing_code_short_circuits_before_exchange() {
        let handler = handler();
        let adapter = StubAdapter::new(vec![ActionKind::EventInsert]);
        let query = CallbackQuery {
            state: Some(signed_state(&handler, "event_insert")),
            ..Default::default()
        };

        let err = handler.handle(&adapter, &query).await.unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::MissingCode);
        assert!(!adapter.exchanged.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn invalid_state_blocks_dispatch() {
        let handler = handler();
        let adapter = StubAdapter::new(vec![ActionKind::EventInsert]);
        let query = CallbackQuery {
            code: Some("ABC".to_string()),
            state: Some("tampered".to_string()),
            ..Default::default()
        };

        let err = handler.handle(&adapter, &query).await.unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
        assert!(!adapter.completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn missing_state_blocks_dispatch() {
        let handler = handler();
        let adapter = StubAdapter::new(vec![ActionKind::EventInsert]);
        let query = CallbackQuery {
            code: Some("ABC".to_string()),
            ..Default::default()
        };

        let err = handler.handle(&adapter, &query).await.unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
        assert!(!adapter.completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unregistered_action_is_configuration_error() {
        let handler = handler();
        // The adapter only registered profile_retrieve.
        let adapter = StubAdapter::new(vec![ActionKind::ProfileRetrieve]);
        let query = CallbackQuery {
            code: Some("ABC".to_string()),
            state: Some(signed_state(&handler, "event_insert")),
            ..Default::default()
        };

        let err = handler.handle(&adapter, &query).await.unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::Configuration);
        assert_eq!(err.http_status(), 500);
        assert!(!adapter.completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn successful_callback_dispatches_with_fresh_token() {
        let handler = handler();
        let adapter = StubAdapter::new(vec![ActionKind::EventInsert]);
        let query = CallbackQuery {
            code: Some("ABC".to_string()),
            state: Some(signed_state(&handler, "event_insert")),
            ..Default::default()
        };

        let outcome = handler.handle(&adapter, &query).await.unwrap();
        assert_eq!(outcome.message, "completed event_insert");
        assert!(adapter.exchanged.load(Ordering::SeqCst));
        assert!(adapter.completed.load(Ordering::SeqCst));
        assert_eq!(
            adapter.seen_token.lock().unwrap().as_deref(),
            Some("token-for-ABC")
        );
    }
}
