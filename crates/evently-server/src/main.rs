//! evently server entry point.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use evently_core::{init_tracing, InMemoryEventStore, TracingConfig};
use evently_providers::google::GeocodingClient;
use evently_providers::{google, linkedin, OAuthAdapter};
use evently_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing(TracingConfig::server()) {
        eprintln!("error: failed to initialize tracing: {e}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let store = Arc::new(InMemoryEventStore::new());
    let mut state = AppState::new(&config.state_secret, store.clone(), config.request_timeout);

    if let Some(ref credentials) = config.google {
        let app = google::default_app(
            &credentials.client_id,
            &credentials.client_secret,
            config.redirect_uri("google"),
        );
        let adapter: Arc<dyn OAuthAdapter> = Arc::new(google::GoogleAdapter::new(
            app,
            store.clone(),
            config.request_timeout,
        ));
        state = state.register_adapter(adapter);
        info!("google provider registered");
    }

    if let Some(ref credentials) = config.linkedin {
        let app = linkedin::default_app(
            &credentials.client_id,
            &credentials.client_secret,
            config.redirect_uri("linkedin"),
        );
        let adapter: Arc<dyn OAuthAdapter> =
            Arc::new(linkedin::LinkedInAdapter::new(app, config.request_timeout));
        state = state.register_adapter(adapter);
        info!("linkedin provider registered");
    }

    if let Some(ref key) = config.maps_api_key {
        state = state.with_geocoder(GeocodingClient::with_timeout(
            key.clone(),
            config.request_timeout,
        ));
        info!("geocoding enabled");
    }

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
