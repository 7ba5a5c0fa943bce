//! Event types for the booking domain.
//!
//! This module provides the core types for representing bookable events:
//! - [`Event`]: the event record with its booking and publication lifecycle
//! - [`EventStatus`], [`EventPaymentType`], [`EventLocationType`]: the
//!   classification enums
//! - [`EventError`]: errors raised by lifecycle transitions and validation

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of an event name.
pub const MAX_NAME_LEN: usize = 40;

/// The publication status of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// The event exists but is not visible or bookable yet.
    #[default]
    Draft,
    /// The event is published and accepting attendees.
    Open,
    /// The event was cancelled by its owner.
    Cancelled,
    /// The event is over or no longer accepting attendees.
    Closed,
}

/// Whether attending the event requires payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPaymentType {
    /// Attendance is free; seats can be reserved online.
    #[default]
    Free,
    /// Attendance is paid; booking happens out of band.
    Paid,
}

/// Where the event takes place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLocationType {
    /// A physical venue with an address and coordinates.
    #[default]
    Onsite,
    /// An online event with a meeting URL.
    Virtual,
}

/// Errors raised by event lifecycle transitions and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// No event exists with the given identifier.
    #[error("no event found with uuid {0}")]
    NotFound(Uuid),

    /// An event with the given identifier already exists.
    #[error("an event with uuid {0} already exists")]
    Duplicate(Uuid),

    /// The event is cancelled, closed, or still a draft.
    #[error("this event is not accepting attendees anymore")]
    NotBookable,

    /// The event has reached its maximum participant count.
    #[error("this event has reached its maximum number of participants")]
    CapacityFull,

    /// Publishing requires a publish end date.
    #[error("set a publish end date before publishing the event")]
    MissingPublishEndDate,

    /// The event record is inconsistent.
    #[error("{0}")]
    Validation(String),
}

impl EventError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// A bookable event.
///
/// Events are created as drafts, published into the `Open` status once a
/// publication window is set, and collect attendee email addresses until
/// they are closed or cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier of the event.
    pub uuid: Uuid,
    /// Display name, at most [`MAX_NAME_LEN`] characters.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// When the event was published.
    pub published_date: Option<DateTime<Utc>>,
    /// When the publication window ends.
    pub publish_end_date: Option<DateTime<Utc>>,
    /// The day the event takes place.
    pub date: Option<NaiveDate>,
    /// The time of day the event starts.
    pub time: Option<NaiveTime>,
    /// Whether attendance is free or paid.
    pub payment_type: EventPaymentType,
    /// Onsite or virtual.
    pub location_type: EventLocationType,
    /// Venue address (onsite events only).
    pub address: Option<String>,
    /// Venue latitude (onsite events only).
    pub latitude: Option<f64>,
    /// Venue longitude (onsite events only).
    pub longitude: Option<f64>,
    /// Meeting URL (virtual events only).
    pub url_link: Option<String>,
    /// Email addresses of registered attendees.
    pub attendees: Vec<String>,
    /// Maximum number of attendees, if capped.
    pub max_participants: Option<u64>,
    /// Current lifecycle status.
    pub status: EventStatus,
}

impl Event {
    /// Creates a new draft event with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description: None,
            published_date: None,
            publish_end_date: None,
            date: None,
            time: None,
            payment_type: EventPaymentType::default(),
            location_type: EventLocationType::default(),
            address: None,
            latitude: None,
            longitude: None,
            url_link: None,
            attendees: Vec::new(),
            max_participants: None,
            status: EventStatus::default(),
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the event day and start time.
    pub fn with_schedule(mut self, date: NaiveDate, time: NaiveTime) -> Self {
        self.date = Some(date);
        self.time = Some(time);
        self
    }

    /// Builder: set the publication window.
    pub fn with_publish_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.published_date = Some(start);
        self.publish_end_date = Some(end);
        self
    }

    /// Builder: set the payment type.
    pub fn with_payment_type(mut self, payment_type: EventPaymentType) -> Self {
        self.payment_type = payment_type;
        self
    }

    /// Builder: set the location type.
    pub fn with_location_type(mut self, location_type: EventLocationType) -> Self {
        self.location_type = location_type;
        self
    }

    /// Builder: set the venue address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Builder: set the venue coordinates.
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Builder: set the meeting URL.
    pub fn with_url_link(mut self, url: impl Into<String>) -> Self {
        self.url_link = Some(url.into());
        self
    }

    /// Builder: cap the number of participants.
    pub fn with_max_participants(mut self, max: u64) -> Self {
        self.max_participants = Some(max);
        self
    }

    /// Checks the record for internal consistency.
    ///
    /// Onsite events must not carry a meeting URL; virtual events must not
    /// carry location fields; the publication window must be ordered; an
    /// event cannot be `Open` without a publication window.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.name.is_empty() {
            return Err(EventError::validation("event name is required"));
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(EventError::validation(format!(
                "event name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        match self.location_type {
            EventLocationType::Onsite => {
                if self.url_link.is_some() {
                    return Err(EventError::validation(
                        "onsite events cannot have a meeting URL",
                    ));
                }
            }
            EventLocationType::Virtual => {
                if self.address.is_some() || self.latitude.is_some() || self.longitude.is_some() {
                    return Err(EventError::validation(
                        "virtual events cannot have location fields",
                    ));
                }
            }
        }

        if let (Some(start), Some(end)) = (self.published_date, self.publish_end_date) {
            if start >= end {
                return Err(EventError::validation(
                    "publish start date must be before the publish end date",
                ));
            }
        }

        if self.status == EventStatus::Open
            && (self.published_date.is_none() || self.publish_end_date.is_none())
        {
            return Err(EventError::validation(
                "an event cannot be open without a publication window",
            ));
        }

        Ok(())
    }

    /// Returns `true` if the event is currently accepting attendees.
    pub fn is_bookable(&self) -> bool {
        self.status == EventStatus::Open
    }

    /// Publishes the event.
    ///
    /// Requires a publish end date; stamps the publish start date on the
    /// first transition to `Open`.
    pub fn publish(&mut self) -> Result<(), EventError> {
        if self.status != EventStatus::Open {
            if self.publish_end_date.is_none() {
                return Err(EventError::MissingPublishEndDate);
            }
            self.published_date = Some(Utc::now());
        }
        self.status = EventStatus::Open;
        Ok(())
    }

    /// Cancels the event.
    pub fn cancel(&mut self) {
        self.status = EventStatus::Cancelled;
    }

    /// Closes the event.
    pub fn close(&mut self) {
        self.status = EventStatus::Closed;
    }

    /// Reserves a seat for the given attendee email.
    ///
    /// Fails if the event is not open or has reached its participant cap.
    pub fn reserve_space(&mut self, email: impl Into<String>) -> Result<(), EventError> {
        if !self.is_bookable() {
            return Err(EventError::NotBookable);
        }
        if let Some(max) = self.max_participants {
            if self.attendees.len() as u64 >= max {
                return Err(EventError::CapacityFull);
            }
        }
        self.attendees.push(email.into());
        Ok(())
    }
}
