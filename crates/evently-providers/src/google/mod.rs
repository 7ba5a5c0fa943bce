//! Google provider integration.
//!
//! Covers the OAuth adapter with the `event_insert` calendar action, plus
//! the API-key Maps clients used when events are created (address to
//! coordinates) and browsed (routes to the venue).

mod adapter;
mod calendar;
mod directions;
mod geocoding;

pub use adapter::{
    default_app, GoogleAdapter, CALENDAR_SCOPE, GOOGLE_AUTHORIZE_URL, GOOGLE_TOKEN_URL,
};
pub use calendar::{event_payload, CalendarClient, CALENDAR_BASE_URL};
pub use directions::{DirectionsClient, Route, TravelMode};
pub use geocoding::{GeocodingClient, LatLng, MAPS_BASE_URL};
