//! Error types for the OAuth grant/callback flow.
//!
//! The taxonomy distinguishes client mistakes (missing parameters, tampered
//! state), provider failures (refused codes, unreachable endpoints), and
//! deployment defects (unknown providers or unregistered actions). Each code
//! carries the HTTP status the server layer should answer with.

use std::fmt;
use thiserror::Error;

/// The category of an OAuth flow error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthErrorCode {
    /// The grant request carried no `action` parameter.
    MissingAction,
    /// The grant request's `action` does not name a known action.
    InvalidAction,
    /// The provider redirected back with an `error` parameter.
    AuthorizationDenied,
    /// The callback carried no authorization code.
    MissingCode,
    /// The state token is absent, malformed, or failed signature
    /// verification.
    InvalidState,
    /// The provider protocol failed before the redirect could be issued.
    Authentication,
    /// The provider's token endpoint refused the authorization code.
    TokenExchange,
    /// The downstream API refused the obtained token.
    PermissionDenied,
    /// A referenced resource does not exist.
    NotFound,
    /// An outbound call failed at the network level (connect, timeout).
    Network,
    /// The provider or downstream API misbehaved (5xx, unparseable body).
    Upstream,
    /// Unknown provider or unregistered action - a deployment defect.
    Configuration,
    /// Unexpected internal failure.
    Internal,
}

impl OAuthErrorCode {
    /// The HTTP status the server layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingAction
            | Self::InvalidAction
            | Self::AuthorizationDenied
            | Self::MissingCode
            | Self::InvalidState
            | Self::Authentication
            | Self::TokenExchange
            | Self::PermissionDenied => 400,
            Self::NotFound => 404,
            Self::Network | Self::Upstream => 502,
            Self::Configuration | Self::Internal => 500,
        }
    }

    /// Returns a stable machine-readable name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingAction => "missing_action",
            Self::InvalidAction => "invalid_action",
            Self::AuthorizationDenied => "authorization_denied",
            Self::MissingCode => "missing_code",
            Self::InvalidState => "invalid_state",
            Self::Authentication => "authentication_error",
            Self::TokenExchange => "token_exchange_failed",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::Network => "network_error",
            Self::Upstream => "upstream_error",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for OAuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred during the OAuth grant or callback flow.
#[derive(Debug, Error)]
pub struct OAuthError {
    code: OAuthErrorCode,
    message: String,
    /// The provider the error belongs to (e.g., "google").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl OAuthError {
    /// Creates a new error with the given code and message.
    pub fn new(code: OAuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates a missing-action error.
    pub fn missing_action(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::MissingAction, message)
    }

    /// Creates an invalid-action error.
    pub fn invalid_action(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::InvalidAction, message)
    }

    /// Creates an authorization-denied error.
    pub fn authorization_denied(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::AuthorizationDenied, message)
    }

    /// Creates a missing-code error.
    pub fn missing_code(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::MissingCode, message)
    }

    /// Creates an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::InvalidState, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::Authentication, message)
    }

    /// Creates a token-exchange error.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::TokenExchange, message)
    }

    /// Creates a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::PermissionDenied, message)
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::NotFound, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::Network, message)
    }

    /// Creates an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::Upstream, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::Configuration, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(OAuthErrorCode::Internal, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> OAuthErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns the HTTP status this error maps to.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for OAuth flow operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(OAuthErrorCode::MissingAction.http_status(), 400);
        assert_eq!(OAuthErrorCode::InvalidAction.http_status(), 400);
        assert_eq!(OAuthErrorCode::InvalidState.http_status(), 400);
        assert_eq!(OAuthErrorCode::TokenExchange.http_status(), 400);
        assert_eq!(OAuthErrorCode::NotFound.http_status(), 404);
        assert_eq!(OAuthErrorCode::Network.http_status(), 502);
        assert_eq!(OAuthErrorCode::Configuration.http_status(), 500);
    }

    #[test]
    fn error_creation() {
        let err = OAuthError::invalid_state("signature verification failed");
        assert_eq!(err.code(), OAuthErrorCode::InvalidState);
        assert_eq!(err.message(), "signature verification failed");
        assert_eq!(err.http_status(), 400);
        assert!(err.provider().is_none());
    }

    #[test]
    fn display_includes_provider_tag() {
        let err = OAuthError::token_exchange("code already consumed").with_provider("google");
        let display = format!("{}", err);
        assert!(display.contains("[google]"));
        assert!(display.contains("token_exchange_failed"));
        assert!(display.contains("code already consumed"));
    }

    #[test]
    fn source_is_chained() {
        use std::error::Error;
        let io_err = std::io::Error::other("connection reset");
        let err = OAuthError::network("token request failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
