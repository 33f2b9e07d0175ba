//! Due-date normalization.
//!
//! # Design
//! The store keeps `due_date` as a bare `YYYY-MM-DD` calendar date. In memory
//! it is a `DateTime<Utc>` pinned to midnight UTC of that day. Both
//! directions go through year/month/day integers and UTC components only, so
//! the calendar day never moves with the process or viewer timezone.
//! Display is the mirror image: the UTC day is rebuilt as a local date in the
//! viewer's timezone before formatting.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::ApiError;

/// Text shown in place of an absent due date.
pub const NO_DUE_DATE: &str = "No due date";

const STORE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%b %-d, %Y";
const CREATED_AT_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Parse a store `YYYY-MM-DD` string into a UTC-midnight value.
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let invalid = || ApiError::InvalidDueDate(raw.to_string());

    let mut parts = raw.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = digits(year).ok_or_else(invalid)?;
    let month: u32 = digits(month).ok_or_else(invalid)?;
    let day: u32 = digits(day).ok_or_else(invalid)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .map(utc_midnight)
        .ok_or_else(invalid)
}

/// Serialize a date value to the store's `YYYY-MM-DD` form using its UTC
/// calendar day.
pub fn format_due_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc)
        .date_naive()
        .format(STORE_FORMAT)
        .to_string()
}

/// Pin a calendar date to midnight UTC.
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Render a due date for a viewer in `viewer`'s timezone, e.g. `Mar 15, 2024`.
///
/// The UTC year/month/day are reassembled as a local date for the viewer,
/// so the day shown is the day stored regardless of the viewer's offset.
pub fn display_due_date<Tz: TimeZone>(due: Option<&DateTime<Utc>>, viewer: &Tz) -> String {
    let Some(due) = due else {
        return NO_DUE_DATE.to_string();
    };
    let day = due.date_naive();
    let local = viewer
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.date_naive())
        // Midnight falls in a DST gap in a few zones; the calendar day is
        // still the stored one.
        .unwrap_or(day);
    local.format(DISPLAY_FORMAT).to_string()
}

/// Render the store's `created_at` timestamp in the viewer's timezone, e.g.
/// `1/1/2024, 12:34:56 PM`. Text that is not RFC 3339 is shown verbatim.
pub fn display_created_at<Tz>(raw: &str, viewer: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts
            .with_timezone(viewer)
            .format(CREATED_AT_FORMAT)
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

fn digits<N: std::str::FromStr>(part: &str) -> Option<N> {
    if part.bytes().all(|b| b.is_ascii_digit()) {
        part.parse().ok()
    } else {
        None
    }
}

/// A due date as handed to `add_todo` / `update_todo`: either a date value
/// or text already in store form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DueDateInput {
    Date(DateTime<Utc>),
    Text(String),
}

impl DueDateInput {
    /// The value sent to the store. Blank text counts as no date.
    pub fn to_store_value(&self) -> Option<String> {
        match self {
            DueDateInput::Date(date) => Some(format_due_date(date)),
            DueDateInput::Text(text) if text.trim().is_empty() => None,
            DueDateInput::Text(text) => Some(text.clone()),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DueDateInput {
    fn from(date: DateTime<Tz>) -> Self {
        DueDateInput::Date(date.with_timezone(&Utc))
    }
}

impl From<NaiveDate> for DueDateInput {
    fn from(date: NaiveDate) -> Self {
        DueDateInput::Date(utc_midnight(date))
    }
}

impl From<&str> for DueDateInput {
    fn from(text: &str) -> Self {
        DueDateInput::Text(text.to_string())
    }
}

impl From<String> for DueDateInput {
    fn from(text: String) -> Self {
        DueDateInput::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Days, Duration, FixedOffset, Timelike};
    use proptest::prelude::*;

    fn offset_hours(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn parse_pins_to_utc_midnight() {
        let date = parse_due_date("2024-01-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!((date.hour(), date.minute(), date.second()), (0, 0, 0));
    }

    #[test]
    fn round_trip_preserves_every_day_of_a_leap_year() {
        let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while day.year() == 2024 {
            let text = day.format("%Y-%m-%d").to_string();
            assert_eq!(format_due_date(&parse_due_date(&text).unwrap()), text);
            day += Duration::days(1);
        }
    }

    #[test]
    fn round_trip_is_independent_of_offset() {
        let parsed = parse_due_date("2024-03-15").unwrap();
        for hours in [-11, -5, 0, 5, 13, 14] {
            let shifted = parsed.with_timezone(&offset_hours(hours));
            assert_eq!(format_due_date(&shifted), "2024-03-15", "offset {hours}");
        }
    }

    // Every day from 0000-01-01 through 9999-12-31, seen from any offset.
    proptest! {
        #[test]
        fn round_trip_and_display_hold_for_any_valid_day(
            days in 0u64..3_652_425,
            hours in -11i32..=14,
        ) {
            let day = NaiveDate::from_ymd_opt(0, 1, 1)
                .unwrap()
                .checked_add_days(Days::new(days))
                .unwrap();
            let text = day.format("%Y-%m-%d").to_string();
            let parsed = parse_due_date(&text).unwrap();

            prop_assert_eq!(format_due_date(&parsed.with_timezone(&offset_hours(hours))), text);
            prop_assert_eq!(
                display_due_date(Some(&parsed), &offset_hours(13)),
                display_due_date(Some(&parsed), &offset_hours(-11))
            );
        }
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for raw in [
            "",
            "2024-3-15",
            "2024-03-15T00:00:00Z",
            "2024/03/15",
            "2024-02-30",
            "2024-13-01",
            "+024-03-15",
            "2024-03-15-01",
            "abcd-ef-gh",
        ] {
            assert!(
                matches!(parse_due_date(raw), Err(ApiError::InvalidDueDate(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn format_uses_utc_components() {
        // 00:30 on the 15th at UTC+13 is still the 14th in UTC.
        let local = offset_hours(13)
            .with_ymd_and_hms(2024, 3, 15, 0, 30, 0)
            .unwrap();
        assert_eq!(format_due_date(&local), "2024-03-14");

        let late = offset_hours(-11)
            .with_ymd_and_hms(2024, 3, 15, 23, 0, 0)
            .unwrap();
        assert_eq!(format_due_date(&late), "2024-03-16");
    }

    #[test]
    fn display_matches_stored_day_for_any_viewer() {
        let due = parse_due_date("2024-03-15").unwrap();
        assert_eq!(display_due_date(Some(&due), &offset_hours(13)), "Mar 15, 2024");
        assert_eq!(display_due_date(Some(&due), &offset_hours(-11)), "Mar 15, 2024");
        assert_eq!(display_due_date(Some(&due), &Utc), "Mar 15, 2024");
    }

    #[test]
    fn display_absent_due_date() {
        assert_eq!(display_due_date(None, &Utc), "No due date");
    }

    #[test]
    fn display_created_at_in_viewer_zone() {
        let raw = "2024-01-01T12:34:56.123456+00:00";
        assert_eq!(display_created_at(raw, &Utc), "1/1/2024, 12:34:56 PM");
        assert_eq!(
            display_created_at(raw, &offset_hours(-11)),
            "1/1/2024, 1:34:56 AM"
        );
    }

    #[test]
    fn display_created_at_falls_back_to_raw_text() {
        assert_eq!(display_created_at("yesterday", &Utc), "yesterday");
    }

    #[test]
    fn due_date_input_store_values() {
        let from_naive = DueDateInput::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(from_naive.to_store_value().as_deref(), Some("2024-01-01"));

        let from_text = DueDateInput::from("2024-07-04");
        assert_eq!(from_text.to_store_value().as_deref(), Some("2024-07-04"));

        assert_eq!(DueDateInput::from("  ").to_store_value(), None);
    }
}
