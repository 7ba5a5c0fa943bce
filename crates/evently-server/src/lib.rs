//! HTTP server exposing the event and OAuth grant endpoints.
//!
//! Routes:
//!
//! - `GET /grant/{provider}/` - start an authorization flow
//! - `GET /grant/{provider}/callback/` - complete it after consent
//! - `POST|GET /events/` - create and list events
//! - `GET /events/{uuid}/` - fetch one event
//! - `POST /events/{uuid}/reserve|publish|cancel/` - booking and lifecycle

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;

pub use app::{build_router, AppState};
pub use config::{ConfigError, ProviderCredentials, ServerConfig};
pub use error::{ApiError, ApiResult};
