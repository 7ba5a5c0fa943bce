//! Event storage seam.
//!
//! This module defines the [`EventStore`] trait that the HTTP layer and the
//! OAuth action handlers use to look events up, plus an in-memory
//! implementation used by the server and by tests. A real database backend
//! would implement the same trait.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::event::{Event, EventError, EventPaymentType, EventStatus};

/// Filter for listing events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only include events with this status.
    pub status: Option<EventStatus>,
    /// Only include events with this payment type.
    pub payment_type: Option<EventPaymentType>,
}

impl EventFilter {
    /// Creates an empty filter that matches every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: filter by status.
    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Builder: filter by payment type.
    pub fn with_payment_type(mut self, payment_type: EventPaymentType) -> Self {
        self.payment_type = Some(payment_type);
        self
    }

    /// Returns `true` if the event matches this filter.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        if let Some(payment_type) = self.payment_type {
            if event.payment_type != payment_type {
                return false;
            }
        }
        true
    }
}

/// Storage abstraction for events.
///
/// Implementations must be `Send + Sync`; the store is shared between the
/// HTTP handlers and the OAuth action handlers.
pub trait EventStore: Send + Sync {
    /// Inserts a new event. Fails if the uuid is already present.
    fn insert(&self, event: Event) -> Result<(), EventError>;

    /// Returns the event with the given uuid.
    fn get(&self, uuid: &Uuid) -> Result<Event, EventError>;

    /// Replaces an existing event. Fails if the uuid is unknown.
    fn update(&self, event: Event) -> Result<(), EventError>;

    /// Mutates an event atomically and returns the updated record.
    ///
    /// The read-check-write runs under one lock acquisition, so two
    /// concurrent bookings cannot both observe the same attendee list. If
    /// `mutate` fails the stored event is left untouched.
    fn modify(
        &self,
        uuid: &Uuid,
        mutate: &mut dyn FnMut(&mut Event) -> Result<(), EventError>,
    ) -> Result<Event, EventError>;

    /// Lists events matching the filter.
    fn list(&self, filter: &EventFilter) -> Vec<Event>;
}

/// In-memory event store backed by a `RwLock`ed map.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<Uuid, Event>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Returns `true` if the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.read().unwrap().is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    fn insert(&self, event: Event) -> Result<(), EventError> {
        let mut events = self.events.write().unwrap();
        if events.contains_key(&event.uuid) {
            return Err(EventError::Duplicate(event.uuid));
        }
        events.insert(event.uuid, event);
        Ok(())
    }

    fn get(&self, uuid: &Uuid) -> Result<Event, EventError> {
        self.events
            .read()
            .unwrap()
            .get(uuid)
            .cloned()
            .ok_or(EventError::NotFound(*uuid))
    }

    fn update(&self, event: Event) -> Result<(), EventError> {
        let mut events = self.events.write().unwrap();
        if !events.contains_key(&event.uuid) {
            return Err(EventError::NotFound(event.uuid));
        }
        events.insert(event.uuid, event);
        Ok(())
    }

    fn modify(
        &self,
        uuid: &Uuid,
        mutate: &mut dyn FnMut(&mut Event) -> Result<(), EventError>,
    ) -> Result<Event, EventError> {
        let mut events = self.events.write().unwrap();
        let stored = events.get_mut(uuid).ok_or(EventError::NotFound(*uuid))?;

        // Mutate a copy so a failed transition leaves the record intact.
        let mut updated = stored.clone();
        mutate(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }

    fn list(&self, filter: &EventFilter) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .unwrap()
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        // Deterministic order for listings
        events.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        events
    }
}
