// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub const DATE_PLACEHOLDER: &str = "—";

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const MAX_HUE: f64 = 120.0;

/// Parses the ISO-8601 shapes the insights API emits. Timestamps without an
/// offset are read as UTC, as are bare dates.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(parsed);
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(
        trimmed,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        ),
    ) {
        return Some(parsed.assume_utc());
    }
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

pub fn format_date(iso: Option<&str>) -> String {
    iso.and_then(parse_timestamp)
        .and_then(|parsed| {
            parsed
                .date()
                .format(format_description!("[year]-[month]-[day]"))
                .ok()
        })
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_owned())
}

/// Whole days until `iso`, rounded to the nearest day and never negative.
/// Unparsable input counts as zero.
pub fn days_from_now(iso: Option<&str>, now: OffsetDateTime) -> i64 {
    let Some(target) = iso.and_then(parse_timestamp) else {
        return 0;
    };
    let diff_ms = (target - now).whole_milliseconds() as f64;
    (diff_ms / MILLIS_PER_DAY).round().max(0.0) as i64
}

pub fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| DATE_PLACEHOLDER.to_owned())
}

pub fn format_clock(value: OffsetDateTime) -> String {
    value
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| DATE_PLACEHOLDER.to_owned())
}

/// Maps a confidence score onto an HSL hue: 0 is red, 1 is green.
pub fn confidence_hue(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0) * MAX_HUE
}

pub fn confidence_color(value: f64) -> String {
    format!("hsl({}, 80%, 40%)", confidence_hue(value))
}
