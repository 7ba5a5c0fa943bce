//! Event endpoints: creation, listing, booking, and lifecycle transitions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use evently_core::{
    Event, EventError, EventFilter, EventLocationType, EventPaymentType, EventStatus,
};

use crate::app::AppState;
use crate::error::ApiResult;

/// Body of `POST /events/`.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub payment_type: EventPaymentType,
    #[serde(default)]
    pub location_type: EventLocationType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub url_link: Option<String>,
    #[serde(default)]
    pub publish_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_participants: Option<u64>,
}

impl CreateEventRequest {
    fn into_event(self) -> Event {
        let mut event = Event::new(self.name)
            .with_payment_type(self.payment_type)
            .with_location_type(self.location_type);
        event.description = self.description;
        event.date = self.date;
        event.time = self.time;
        event.address = self.address;
        event.latitude = self.latitude;
        event.longitude = self.longitude;
        event.url_link = self.url_link;
        event.publish_end_date = self.publish_end_date;
        event.max_participants = self.max_participants;
        event
    }
}

/// Query parameters of `GET /events/`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub payment_type: Option<EventPaymentType>,
}

/// Body of `POST /events/{uuid}/reserve/`.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub email: String,
}

/// `POST /events/` - creates a draft event.
///
/// Onsite events created with an address but no coordinates are forward
/// geocoded when a geocoding client is configured.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    let mut event = request.into_event();

    if let Some(geocoder) = state.geocoder() {
        if event.location_type == EventLocationType::Onsite
            && event.latitude.is_none()
            && event.longitude.is_none()
        {
            if let Some(ref address) = event.address {
                let position = geocoder.forward(address).await?;
                event.latitude = Some(position.lat);
                event.longitude = Some(position.lng);
            }
        }
    }

    event.validate()?;
    state.store().insert(event.clone())?;

    info!(uuid = %event.uuid, name = %event.name, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/` - lists events, optionally filtered.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Event>> {
    let mut filter = EventFilter::new();
    if let Some(status) = query.status {
        filter = filter.with_status(status);
    }
    if let Some(payment_type) = query.payment_type {
        filter = filter.with_payment_type(payment_type);
    }
    Json(state.store().list(&filter))
}

/// `GET /events/{uuid}/` - returns one event.
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.store().get(&uuid)?))
}

/// `POST /events/{uuid}/reserve/` - books a seat on a free, open event.
///
/// Paid events are booked out of band; reserving one online is rejected.
pub async fn reserve(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
    Json(request): Json<ReserveRequest>,
) -> ApiResult<Json<Event>> {
    // One lock acquisition: concurrent reserves serialize on the store, so
    // the capacity check and the append cannot interleave.
    let event = state.store().modify(&uuid, &mut |event| {
        if event.payment_type == EventPaymentType::Paid {
            return Err(EventError::validation("paid events cannot be reserved online"));
        }
        event.reserve_space(request.email.clone())
    })?;

    info!(%uuid, attendees = event.attendees.len(), "seat reserved");
    Ok(Json(event))
}

/// `POST /events/{uuid}/publish/` - opens the event for booking.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<Event>> {
    let event = state.store().modify(&uuid, &mut |event| event.publish())?;

    info!(%uuid, "event published");
    Ok(Json(event))
}

/// `POST /events/{uuid}/cancel/` - cancels the event.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<Event>> {
    let event = state.store().modify(&uuid, &mut |event| {
        event.cancel();
        Ok(())
    })?;

    info!(%uuid, "event cancelled");
    Ok(Json(event))
}
