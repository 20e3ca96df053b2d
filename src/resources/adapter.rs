//! Normalization of raw source records into [`LocationRecord`]s.
//!
//! Two shapes arrive from sources:
//! - REST records: structured address fields, 24-hour opening times,
//!   an `is_active` flag;
//! - flat spreadsheet rows: one address string, free-text notes, no hours.
//!
//! Both decode into [`ExternalRecord`] and leave this module as one canonical
//! record. Inactive records are dropped here, before ranking sees them.

use super::record::LocationRecord;
use crate::geo::Coordinate;
use crate::hours::{ClockTime, DayEntry, WeeklyHours};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RestPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A record from the community-resources REST endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RestRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: RestPoint,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_type_display: Option<String>,
    /// Day name → `{open, close}` in 24-hour form ("09:00"), or a marker.
    /// Kept raw so one malformed day cannot fail the whole record.
    #[serde(default)]
    pub hours: Option<Value>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A row from the bundled spreadsheet export.
#[derive(Debug, Clone, Deserialize)]
pub struct FlatRecord {
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
    #[serde(default = "default_true", alias = "active")]
    pub is_active: bool,
}

/// Any record shape a source may hand us.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExternalRecord {
    Rest(RestRecord),
    Flat(FlatRecord),
}

impl ExternalRecord {
    pub fn is_active(&self) -> bool {
        match self {
            Self::Rest(r) => r.is_active,
            Self::Flat(f) => f.is_active,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Rest(r) => &r.name,
            Self::Flat(f) => &f.name,
        }
    }

    fn coordinates(&self) -> Coordinate {
        match self {
            Self::Rest(r) => Coordinate::new(r.location.latitude, r.location.longitude),
            Self::Flat(f) => Coordinate::new(f.latitude, f.longitude),
        }
    }
}

/// Natural key: name plus coordinates. None when the record has no name.
pub fn natural_key(name: &str, at: Coordinate) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(format!("{}@{}, {}", name, at.latitude, at.longitude))
    }
}

/// Normalize one record. `offset` is its position in the source list and
/// seeds the key when no natural key exists. Inactive records yield `None`.
pub fn normalize(raw: &ExternalRecord, offset: usize) -> Option<LocationRecord> {
    if !raw.is_active() {
        return None;
    }

    let coordinates = raw.coordinates();
    let key = natural_key(raw.name(), coordinates).unwrap_or_else(|| format!("location-{}", offset));

    let record = match raw {
        ExternalRecord::Rest(r) => LocationRecord {
            key,
            id: Some(r.id),
            title: r.name.trim().to_string(),
            description: r.description.clone().unwrap_or_default(),
            address: join_address(&r.address, [&r.city, &r.state, &r.zip_code]),
            coordinates,
            hours: r.hours.as_ref().and_then(convert_hours),
            city: r.city.clone(),
            state: r.state.clone(),
            zip_code: r.zip_code.clone(),
            phone: r.phone.clone(),
            email: r.email.clone(),
            website: r.website.clone(),
            resource_type: r.resource_type.clone(),
            resource_type_display: r.resource_type_display.clone(),
        },
        ExternalRecord::Flat(f) => LocationRecord::new(key, f.name.trim(), f.address.trim(), coordinates)
            .with_description(f.notes.clone().unwrap_or_default()),
    };

    Some(record)
}

/// Normalize a whole source list, dropping inactive records and making keys unique.
pub fn normalize_all<I>(raws: I) -> Vec<LocationRecord>
where
    I: IntoIterator<Item = ExternalRecord>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for (offset, raw) in raws.into_iter().enumerate() {
        let Some(mut record) = normalize(&raw, offset) else {
            skipped += 1;
            continue;
        };
        if seen.contains(&record.key) {
            record.key = format!("{}#{}", record.key, offset);
        }
        seen.insert(record.key.clone());
        out.push(record);
    }

    if skipped > 0 {
        tracing::debug!(skipped, kept = out.len(), "dropped inactive records");
    }
    out
}

fn join_address<const N: usize>(street: &str, rest: [&Option<String>; N]) -> String {
    std::iter::once(street)
        .chain(rest.iter().filter_map(|p| p.as_deref()))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert 24-hour source times to the 12-hour form the evaluator reads.
/// Markers pass through. Any other day value (null, missing open/close,
/// unparseable times) is dropped, leaving the day without data. A `hours`
/// value that is not an object yields no schedule at all.
fn convert_hours(raw: &Value) -> Option<WeeklyHours> {
    let Value::Object(days) = raw else {
        if !raw.is_null() {
            tracing::warn!(hours = %raw, "ignoring opening hours that are not an object");
        }
        return None;
    };

    let hours = days
        .iter()
        .filter_map(|(day, value)| convert_day(day, value).map(|entry| (day.clone(), entry)))
        .collect();
    Some(hours)
}

fn convert_day(day: &str, value: &Value) -> Option<DayEntry> {
    if let Value::String(marker) = value {
        return Some(DayEntry::Marker(marker.clone()));
    }

    let window = value
        .get("open")
        .and_then(Value::as_str)
        .zip(value.get("close").and_then(Value::as_str));
    let Some((open, close)) = window else {
        tracing::warn!(day = %day, value = %value, "dropping opening hours without open/close");
        return None;
    };

    match (ClockTime::parse_24h(open), ClockTime::parse_24h(close)) {
        (Ok(o), Ok(c)) => Some(DayEntry::window(o.to_string(), c.to_string())),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(day = %day, error = %e, "dropping unparseable opening hours");
            None
        }
    }
}
