//! OAuth2 provider integrations for the event platform.
//!
//! This crate implements the authorization-code flow shared by every
//! provider and the per-provider adapters that complete an application
//! action once credentials are obtained:
//!
//! - [`grant`]: builds the consent-screen redirect, signing the request
//!   context into the OAuth `state` parameter
//! - [`callback`]: validates the provider's redirect, exchanges the code,
//!   verifies the state, and dispatches the named action
//! - [`adapter`]: the [`OAuthAdapter`] contract and the shared
//!   authorization-code exchange
//! - [`google`] and [`linkedin`]: the concrete provider integrations
//!
//! Nothing is stored between the grant and the callback; the signed state
//! carries all context, so any worker can handle the redirect.

pub mod adapter;
pub mod callback;
pub mod error;
pub mod google;
pub mod grant;
pub mod linkedin;
pub mod state;
pub mod token;

pub use adapter::{
    exchange_authorization_code, ActionKind, ActionOutcome, BoxFuture, OAuthAdapter,
    ProviderApp, TokenRequestMethod, UnknownAction,
};
pub use callback::{CallbackHandler, CallbackQuery, DEFAULT_TIMEOUT};
pub use error::{OAuthError, OAuthErrorCode, OAuthResult};
pub use grant::build_authorization_url;
pub use state::{AuthorizationState, StateCodec};
pub use token::{TokenCredential, TokenResponse};
