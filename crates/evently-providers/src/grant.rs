//! Grant initiation.
//!
//! Builds the provider authorization URL for a grant request: the caller's
//! query parameters are signed into the `state` token and merged with the
//! provider's scope and client configuration. The caller is then redirected
//! to the provider's consent screen.

use std::collections::BTreeMap;

use tracing::debug;
use url::Url;

use crate::adapter::{ActionKind, ProviderApp};
use crate::error::{OAuthError, OAuthResult};
use crate::state::{AuthorizationState, StateCodec};

/// Builds the authorization redirect URL for a grant request.
///
/// `params` is the grant request's query-parameter mapping and must contain
/// an `action` naming a known action; treating its absence as a client error
/// keeps bad requests from ever reaching the provider. The full mapping is
/// signed into the `state` parameter so it survives the round trip through
/// the consent screen.
pub fn build_authorization_url(
    app: &ProviderApp,
    params: &BTreeMap<String, String>,
    codec: &StateCodec,
) -> OAuthResult<String> {
    let action = params
        .get("action")
        .ok_or_else(|| OAuthError::missing_action("no action was specified in the query parameters"))?;

    // Reject unknown action names before anything is signed or redirected.
    let action: ActionKind = action
        .parse()
        .map_err(|e| OAuthError::invalid_action(format!("{e}")))?;

    let state = AuthorizationState::from_params(params.clone());
    let state_token = codec.encode(&state)?;

    let mut url = Url::parse(&app.authorize_url).map_err(|e| {
        OAuthError::authentication(format!("invalid authorize endpoint: {e}"))
    })?;

    url.query_pairs_mut()
        .append_pair("scope", &app.scope_string())
        .append_pair("client_id", &app.client_id)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("state", &state_token)
        .append_pair("redirect_uri", &app.redirect_uri);

    debug!(%action, "built authorization redirect");
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OAuthErrorCode;

    fn test_app() -> ProviderApp {
        ProviderApp::new(
            "client-id",
            "client-secret",
            "https://accounts.google.com/o/oauth2/auth",
            "https://accounts.google.com/o/oauth2/token",
            "https://app.example/grant/google/callback/",
        )
        .with_scope("https://www.googleapis.com/auth/calendar")
    }

    fn codec() -> StateCodec {
        StateCodec::new("test-signing-secret")
    }

    fn grant_params() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("action".to_string(), "event_insert".to_string()),
            ("email".to_string(), "a@b.com".to_string()),
            (
                "event_uuid".to_string(),
                "6e1f17a1-5c4f-41bd-9b79-0f3efc382a1a".to_string(),
            ),
        ])
    }

    #[test]
    fn url_carries_expected_query() {
        let url = build_authorization_url(&test_app(), &grant_params(), &codec()).unwrap();
        let parsed = Url::parse(&url).unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        let pairs: BTreeMap<String, String> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(pairs["client_id"], "client-id");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(pairs["scope"], "https://www.googleapis.com/auth/calendar");
        assert_eq!(
            pairs["redirect_uri"],
            "https://app.example/grant/google/callback/"
        );
        assert!(!pairs["state"].is_empty());
    }

    #[test]
    fn state_round_trips_through_url() {
        let codec = codec();
        let url = build_authorization_url(&test_app(), &grant_params(), &codec).unwrap();
        let parsed = Url::parse(&url).unwrap();

        let state_token = parsed
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let state = codec.decode(Some(&state_token)).unwrap();
        assert_eq!(state.action(), Some("event_insert"));
        assert_eq!(state.get("email"), Some("a@b.com"));
    }

    #[test]
    fn missing_action_is_client_error() {
        let mut params = grant_params();
        params.remove("action");

        let err = build_authorization_url(&test_app(), &params, &codec()).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::MissingAction);
    }

    #[test]
    fn unknown_action_is_rejected_before_signing() {
        let mut params = grant_params();
        params.insert("action".to_string(), "drop_tables".to_string());

        let err = build_authorization_url(&test_app(), &params, &codec()).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidAction);
        assert_eq!(err.http_status(), 400);
        assert!(err.message().contains("drop_tables"));
    }

    #[test]
    fn malformed_authorize_endpoint_is_surfaced() {
        let mut app = test_app();
        app.authorize_url = "not a url".to_string();

        let err = build_authorization_url(&app, &grant_params(), &codec()).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::Authentication);
    }
}
