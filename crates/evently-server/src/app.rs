//! Application state and router assembly.
//!
//! [`AppState`] owns everything the handlers share: the signed-state codec,
//! the callback handler, the event store, and the provider adapter registry.
//! Adapters are registered at startup; a provider name in a URL that is not
//! in the registry answers 404.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;

use evently_core::EventStore;
use evently_providers::google::GeocodingClient;
use evently_providers::{CallbackHandler, OAuthAdapter, StateCodec};

use crate::error::ApiError;
use crate::handlers::{events, grant};

/// Shared state behind every handler.
pub struct AppState {
    codec: StateCodec,
    callback: CallbackHandler,
    store: Arc<dyn EventStore>,
    adapters: HashMap<String, Arc<dyn OAuthAdapter>>,
    geocoder: Option<GeocodingClient>,
}

impl AppState {
    /// Creates the state with the given signing secret and event store.
    pub fn new(
        state_secret: &str,
        store: Arc<dyn EventStore>,
        request_timeout: Duration,
    ) -> Self {
        let codec = StateCodec::new(state_secret);
        let callback = CallbackHandler::new(codec.clone(), request_timeout);

        Self {
            codec,
            callback,
            store,
            adapters: HashMap::new(),
            geocoder: None,
        }
    }

    /// Builder: enable address geocoding at onsite event creation.
    pub fn with_geocoder(mut self, geocoder: GeocodingClient) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Builder: register a provider adapter under its provider id.
    pub fn register_adapter(mut self, adapter: Arc<dyn OAuthAdapter>) -> Self {
        self.adapters
            .insert(adapter.provider_id().to_string(), adapter);
        self
    }

    /// Looks up the adapter for a provider id.
    pub fn adapter(&self, provider: &str) -> Result<&Arc<dyn OAuthAdapter>, ApiError> {
        self.adapters
            .get(provider)
            .ok_or_else(|| ApiError::UnknownProvider(provider.to_string()))
    }

    /// Returns the state codec.
    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }

    /// Returns the callback handler.
    pub fn callback(&self) -> &CallbackHandler {
        &self.callback
    }

    /// Returns the event store.
    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Returns the geocoding client, if one is configured.
    pub fn geocoder(&self) -> Option<&GeocodingClient> {
        self.geocoder.as_ref()
    }
}

/// Assembles the router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/grant/{provider}/", get(grant::begin))
        .route("/grant/{provider}/callback/", get(grant::callback))
        .route("/events/", post(events::create).get(events::list))
        .route("/events/{uuid}/", get(events::retrieve))
        .route("/events/{uuid}/reserve/", post(events::reserve))
        .route("/events/{uuid}/publish/", post(events::publish))
        .route("/events/{uuid}/cancel/", post(events::cancel))
        .with_state(Arc::new(state))
}
