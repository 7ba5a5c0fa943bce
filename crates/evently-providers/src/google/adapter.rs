//! Google OAuth adapter.
//!
//! Completes the `event_insert` action: after the authorization-code
//! exchange, the event named in the signed state is loaded from the store and
//! inserted into the authorizing user's primary calendar.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use evently_core::{EventError, EventStore};
use uuid::Uuid;

use crate::adapter::{ActionKind, ActionOutcome, BoxFuture, OAuthAdapter, ProviderApp};
use crate::error::{OAuthError, OAuthResult};
use crate::google::calendar::{event_payload, CalendarClient, CALENDAR_BASE_URL};
use crate::state::AuthorizationState;
use crate::token::TokenCredential;

/// Google's consent endpoint.
pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google's token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// Scope granting read/write calendar access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const SUPPORTED_ACTIONS: &[ActionKind] = &[ActionKind::EventInsert];

/// Builds the standard Google app configuration for the calendar flow.
pub fn default_app(
    client_id: impl Into<String>,
    client_secret: impl Into<String>,
    redirect_uri: impl Into<String>,
) -> ProviderApp {
    ProviderApp::new(
        client_id,
        client_secret,
        GOOGLE_AUTHORIZE_URL,
        GOOGLE_TOKEN_URL,
        redirect_uri,
    )
    .with_scope(CALENDAR_SCOPE)
}

/// The Google provider integration.
pub struct GoogleAdapter {
    app: ProviderApp,
    store: Arc<dyn EventStore>,
    calendar: CalendarClient,
}

impl GoogleAdapter {
    /// Creates the adapter with the given app configuration and event store.
    pub fn new(app: ProviderApp, store: Arc<dyn EventStore>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            app,
            store,
            calendar: CalendarClient::new(http, CALENDAR_BASE_URL),
        }
    }

    /// Builder: point the calendar client at a different base URL.
    pub fn with_calendar_base_url(mut self, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::new();
        self.calendar = CalendarClient::new(http, base_url);
        self
    }

    /// Inserts the event referenced by the state into the user's calendar.
    async fn insert_event(
        &self,
        state: &AuthorizationState,
        token: &TokenCredential,
    ) -> OAuthResult<ActionOutcome> {
        let email = state.get("email").ok_or_else(|| {
            OAuthError::invalid_state("email is not present in the decoded state")
        })?;
        let event_uuid = state.get("event_uuid").ok_or_else(|| {
            OAuthError::invalid_state("event_uuid is not present in the decoded state")
        })?;
        let uuid = Uuid::parse_str(event_uuid).map_err(|e| {
            OAuthError::invalid_state(format!("event_uuid is not a valid uuid: {e}"))
        })?;

        let event = self.store.get(&uuid).map_err(|e| match e {
            EventError::NotFound(uuid) => {
                OAuthError::not_found(format!("no event found with uuid {uuid}"))
            }
            other => OAuthError::internal(other.to_string()),
        })?;

        debug!(%uuid, email, "inserting event into calendar");
        let payload = event_payload(&event)?;
        let created = self
            .calendar
            .insert(email, &token.access_token, &payload)
            .await?;

        Ok(ActionOutcome::new("Event added to calendar").with_data("event_data", created))
    }
}

impl OAuthAdapter for GoogleAdapter {
    fn provider_id(&self) -> &str {
        "google"
    }

    fn app(&self) -> &ProviderApp {
        &self.app
    }

    fn supported_actions(&self) -> &[ActionKind] {
        SUPPORTED_ACTIONS
    }

    fn complete_action<'a>(
        &'a self,
        action: ActionKind,
        state: &'a AuthorizationState,
        token: &'a TokenCredential,
    ) -> BoxFuture<'a, OAuthResult<ActionOutcome>> {
        Box::pin(async move {
            match action {
                ActionKind::EventInsert => {
                    self.insert_event(state, token)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OAuthErrorCode;
    use crate::token::TokenResponse;
    use chrono::{NaiveDate, NaiveTime};
    use evently_core::{Event, InMemoryEventStore};
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_with_event() -> (GoogleAdapter, Uuid, Arc<InMemoryEventStore>) {
        let store = Arc::new(InMemoryEventStore::new());
        let event = Event::new("Team offsite").with_schedule(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
        );
        let uuid = event.uuid;
        store.insert(event).unwrap();

        let app = default_app("client-id", "client-secret", "https://app.example/cb");
        let adapter = GoogleAdapter::new(app, store.clone(), Duration::from_secs(5));
        (adapter, uuid, store)
    }

    fn credential() -> TokenCredential {
        let response = TokenResponse::from_json(r#"{"access_token": "T"}"#).unwrap();
        TokenCredential::from_response(&response)
    }

    #[test]
    fn default_app_uses_google_endpoints() {
        let app = default_app("id", "secret", "https://app.example/cb");
        assert_eq!(app.authorize_url, GOOGLE_AUTHORIZE_URL);
        assert_eq!(app.token_url, GOOGLE_TOKEN_URL);
        assert_eq!(app.scope_string(), CALENDAR_SCOPE);
        assert!(app.validate().is_ok());
    }

    #[tokio::test]
    async fn event_insert_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/calendars/.+/events$"))
            .and(header("authorization", "Bearer T"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "evt-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (adapter, uuid, _store) = adapter_with_event();
        let adapter = adapter.with_calendar_base_url(server.uri());

        let state = AuthorizationState::from_params([
            ("action", "event_insert".to_string()),
            ("email", "a@b.com".to_string()),
            ("event_uuid", uuid.to_string()),
        ]);

        let outcome = adapter
            .complete_action(ActionKind::EventInsert, &state, &credential())
            .await
            .unwrap();
        assert_eq!(outcome.message, "Event added to calendar");
        assert_eq!(outcome.data["event_data"]["id"], "evt-1");
    }

    #[tokio::test]
    async fn event_insert_requires_email_and_uuid() {
        let (adapter, _uuid, _store) = adapter_with_event();
        let credential = credential();

        let state = AuthorizationState::from_params([("action", "event_insert")]);
        let err = adapter
            .complete_action(ActionKind::EventInsert, &state, &credential)
            .await
            .unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
        assert!(err.message().contains("email"));

        let state = AuthorizationState::from_params([
            ("action", "event_insert".to_string()),
            ("email", "a@b.com".to_string()),
        ]);
        let err = adapter
            .complete_action(ActionKind::EventInsert, &state, &credential)
            .await
            .unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
        assert!(err.message().contains("event_uuid"));
    }

    #[tokio::test]
    async fn event_insert_unknown_event_is_not_found() {
        let (adapter, _uuid, _store) = adapter_with_event();
        let state = AuthorizationState::from_params([
            ("action", "event_insert".to_string()),
            ("email", "a@b.com".to_string()),
            ("event_uuid", Uuid::new_v4().to_string()),
        ]);

        let err = adapter
            .complete_action(ActionKind::EventInsert, &state, &credential())
            .await
            .unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::NotFound);
        assert_eq!(err.provider(), Some("google"));
    }

    #[tokio::test]
    async fn profile_retrieve_is_not_registered() {
        let (adapter, _uuid, _store) = adapter_with_event();
        assert!(!adapter.supports(ActionKind::ProfileRetrieve));

        let state = AuthorizationState::default();
        let err = adapter
            .complete_action(ActionKind::ProfileRetrieve, &state, &credential())
            .await
            .unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::Configuration);
    }
}
