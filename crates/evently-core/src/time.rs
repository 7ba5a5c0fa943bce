//! Time helpers for event scheduling.
//!
//! Events store their day and start time as naive values; the calendar
//! integration needs full RFC 3339 instants in the event timezone. This
//! module combines the two with the fixed event timezone offset.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};

/// IANA name of the timezone events are scheduled in.
pub const EVENT_TIMEZONE: &str = "Africa/Lagos";

/// Default event duration when no explicit end time is known.
pub const DEFAULT_EVENT_DURATION_HOURS: i64 = 1;

/// Returns the fixed UTC offset for [`EVENT_TIMEZONE`] (+01:00, no DST).
pub fn event_offset() -> FixedOffset {
    FixedOffset::east_opt(3600).expect("valid offset")
}

/// Combines an event day and start time into an instant in the event
/// timezone.
pub fn combine_date_time(date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
    date.and_time(time)
        .and_local_timezone(event_offset())
        .single()
        .expect("fixed offsets are unambiguous")
}

/// Returns the start and end instants for an event day and start time.
///
/// The end defaults to the start plus [`DEFAULT_EVENT_DURATION_HOURS`].
pub fn event_window(date: NaiveDate, time: NaiveTime) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let start = combine_date_time(date, time);
    let end = start + Duration::hours(DEFAULT_EVENT_DURATION_HOURS);
    (start, end)
}
