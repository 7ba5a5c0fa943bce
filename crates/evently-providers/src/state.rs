//! Signed authorization state.
//!
//! The grant endpoint's query parameters must survive the round trip through
//! the provider's consent screen unmodified and unforgeable. They are carried
//! inside the OAuth `state` parameter as an HMAC-SHA256 signed JWT; nothing
//! is kept server-side, so stateless workers can handle the callback.
//!
//! Decoding fails closed: a missing, malformed, or tampered token never
//! yields a state, and no action handler runs on unverified data.

use std::collections::BTreeMap;
use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, OAuthResult};

/// Application context carried through the provider redirect.
///
/// This is the grant request's query-parameter mapping, including the
/// mandatory `action` key and any action-specific context such as `email`
/// or `event_uuid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationState {
    params: BTreeMap<String, String>,
}

impl AuthorizationState {
    /// Builds a state from an iterator of key/value pairs.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value for the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the `action` value, if present.
    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }

    /// Returns the underlying parameter map.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Returns `true` if the state carries no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Encodes and verifies [`AuthorizationState`] tokens.
///
/// The signing secret comes from server configuration; it is never a
/// compile-time literal.
#[derive(Clone)]
pub struct StateCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl StateCodec {
    /// Creates a codec signing with the given secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The payload is the original query mapping; there are no registered
        // claims to require or expire.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Serializes and signs a state into a compact, URL-safe token.
    pub fn encode(&self, state: &AuthorizationState) -> OAuthResult<String> {
        jsonwebtoken::encode(&self.header, state, &self.encoding_key)
            .map_err(|e| OAuthError::internal("failed to sign state token").with_source(e))
    }

    /// Verifies a token and returns the state it carries.
    ///
    /// Fails with an invalid-state error when the token is absent,
    /// malformed, or its signature does not verify. Verification always runs
    /// before the payload is handed back.
    pub fn decode(&self, token: Option<&str>) -> OAuthResult<AuthorizationState> {
        let token =
            token.ok_or_else(|| OAuthError::invalid_state("state is not present in the query parameters"))?;

        let data = jsonwebtoken::decode::<AuthorizationState>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| OAuthError::invalid_state(format!("state verification failed: {e}")))?;

        Ok(data.claims)
    }
}

impl fmt::Debug for StateCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OAuthErrorCode;

    fn codec() -> StateCodec {
        StateCodec::new("test-signing-secret")
    }

    fn sample_state() -> AuthorizationState {
        AuthorizationState::from_params([
            ("action", "event_insert"),
            ("email", "a@b.com"),
            ("event_uuid", "6e1f17a1-5c4f-41bd-9b79-0f3efc382a1a"),
        ])
    }

    #[test]
    fn round_trip_preserves_state() {
        let codec = codec();
        let state = sample_state();
        let token = codec.encode(&state).unwrap();
        let decoded = codec.decode(Some(&token)).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.action(), Some("event_insert"));
        assert_eq!(decoded.get("email"), Some("a@b.com"));
    }

    #[test]
    fn missing_token_fails_closed() {
        let err = codec().decode(None).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
    }

    #[test]
    fn garbage_token_fails_closed() {
        let err = codec().decode(Some("not-a-jwt")).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
    }

    #[test]
    fn tampered_payload_fails_closed() {
        let codec = codec();
        let token = codec.encode(&sample_state()).unwrap();

        // Swap the payload segment for one claiming a different email
        // (base64url of {"email":"evil@x.com"}, no padding).
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let forged = format!(
            "{}.eyJlbWFpbCI6ImV2aWxAeC5jb20ifQ.{}",
            parts[0], parts[2]
        );

        let err = codec.decode(Some(&forged)).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
    }

    #[test]
    fn wrong_secret_fails_closed() {
        let token = codec().encode(&sample_state()).unwrap();
        let other = StateCodec::new("a-different-secret");
        let err = other.decode(Some(&token)).unwrap_err();
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
    }

    #[test]
    fn empty_state_round_trips() {
        let codec = codec();
        let state = AuthorizationState::default();
        let token = codec.encode(&state).unwrap();
        let decoded = codec.decode(Some(&token)).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.action(), None);
    }
}
