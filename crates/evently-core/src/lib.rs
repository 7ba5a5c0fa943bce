//! Core types: event model, booking lifecycle, time, storage seam

pub mod event;
pub mod store;
pub mod time;
pub mod tracing;

pub use event::{Event, EventError, EventLocationType, EventPaymentType, EventStatus};
pub use store::{EventFilter, EventStore, InMemoryEventStore};
pub use time::{combine_date_time, event_offset, event_window, EVENT_TIMEZONE};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
