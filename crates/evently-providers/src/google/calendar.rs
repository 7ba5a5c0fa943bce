//! Google Calendar API client.
//!
//! Inserts events into a user's calendar with the access token obtained from
//! the authorization-code exchange. Only the insert operation is implemented;
//! the calendar is addressed by the owner's email, which is how Google names
//! a user's primary calendar.

use serde_json::{json, Value};
use tracing::debug;

use evently_core::{event_window, Event, EVENT_TIMEZONE};

use crate::error::{OAuthError, OAuthResult};

/// Production base URL of the Calendar API.
pub const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Reminder lead time for the email notification, in minutes (one day).
const EMAIL_REMINDER_MINUTES: u64 = 24 * 60;

/// Reminder lead time for the popup notification, in minutes.
const POPUP_REMINDER_MINUTES: u64 = 10;

/// Builds the Calendar API event body for an event.
///
/// Fails when the event has no scheduled day and start time; an unscheduled
/// event cannot be placed on a calendar.
pub fn event_payload(event: &Event) -> OAuthResult<Value> {
    let (date, time) = match (event.date, event.time) {
        (Some(date), Some(time)) => (date, time),
        _ => {
            return Err(OAuthError::invalid_state(format!(
                "event {} has no scheduled date and time",
                event.uuid
            )));
        }
    };
    let (start, end) = event_window(date, time);

    let attendees: Vec<Value> = event
        .attendees
        .iter()
        .map(|email| json!({ "email": email }))
        .collect();

    Ok(json!({
        "summary": event.name,
        "location": event.address.as_deref().or(event.url_link.as_deref()),
        "description": event.description,
        "start": {
            "dateTime": start.to_rfc3339(),
            "timeZone": EVENT_TIMEZONE,
        },
        "end": {
            "dateTime": end.to_rfc3339(),
            "timeZone": EVENT_TIMEZONE,
        },
        "attendees": attendees,
        "reminders": {
            "useDefault": false,
            "overrides": [
                { "method": "email", "minutes": EMAIL_REMINDER_MINUTES },
                { "method": "popup", "minutes": POPUP_REMINDER_MINUTES },
            ],
        },
    }))
}

/// Thin client over the Calendar API.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    /// Creates a client against the given base URL.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Inserts an event into the calendar identified by `calendar_id`.
    ///
    /// Returns the created event resource as the API reports it.
    pub async fn insert(
        &self,
        calendar_id: &str,
        access_token: &str,
        payload: &Value,
    ) -> OAuthResult<Value> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OAuthError::network("calendar insert timed out")
                } else {
                    OAuthError::network(format!("calendar insert failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OAuthError::network(format!("failed to read calendar response: {e}")))?;

        if !status.is_success() {
            return Err(map_api_error(status, &body));
        }

        debug!(calendar_id, "calendar event inserted");
        serde_json::from_str(&body)
            .map_err(|e| OAuthError::upstream(format!("invalid calendar response: {e}")))
    }
}

/// Maps a Calendar API error status to the error taxonomy.
fn map_api_error(status: reqwest::StatusCode, body: &str) -> OAuthError {
    match status.as_u16() {
        401 | 403 => OAuthError::permission_denied(format!(
            "calendar access denied ({status}): {body}"
        )),
        _ => OAuthError::upstream(format!("calendar API returned {status}: {body}")),
    }
}
