//! Grant and callback endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use evently_providers::{build_authorization_url, ActionOutcome, CallbackQuery};

use crate::app::AppState;
use crate::error::ApiResult;

/// `GET /grant/{provider}/` - redirects to the provider's consent screen.
///
/// The full query mapping is signed into the `state` parameter; the redirect
/// is a 302 so user agents replay it as a GET.
pub async fn begin(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    let adapter = state.adapter(&provider)?;
    let url = build_authorization_url(adapter.app(), &params, state.codec())?;

    info!(%provider, "redirecting to consent screen");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}

/// `GET /grant/{provider}/callback/` - completes the flow after consent.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Json<ActionOutcome>> {
    let adapter = state.adapter(&provider)?;
    let outcome = state.callback().handle(adapter.as_ref(), &query).await?;
    Ok(Json(outcome))
}
