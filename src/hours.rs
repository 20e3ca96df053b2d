//! Business-hours evaluation.
//!
//! A location publishes a weekly schedule keyed by lowercase English weekday
//! name. Each day is either an `{open, close}` pair of 12-hour clock strings
//! ("9:00 AM") or a free-form marker string such as `"closed"`. A missing day
//! has no data and is treated as closed.
//!
//! Rules:
//! - equal open and close times mean the location is open around the clock;
//! - a close time at or before the open time means the window wraps past
//!   midnight;
//! - malformed times never panic: the evaluator degrades to
//!   [`HOURS_NOT_AVAILABLE`].

use chrono::{Datelike, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fallback text when no opening can be determined.
pub const HOURS_NOT_AVAILABLE: &str = "Hours not available";

const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HoursError {
    #[error("invalid time '{0}'")]
    InvalidTime(String),
}

// ─── Clock time ──────────────────────────────────────────────────

/// A time of day with minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Parse "H:MM AM" / "HH:MM PM". The marker is case-insensitive.
    pub fn parse_12h(s: &str) -> Result<Self, HoursError> {
        let invalid = || HoursError::InvalidTime(s.to_string());

        let mut parts = s.split_whitespace();
        let (clock, period) = match (parts.next(), parts.next(), parts.next()) {
            (Some(clock), Some(period), None) => (clock, period),
            _ => return Err(invalid()),
        };
        let (hour, minute) = split_clock(clock).ok_or_else(invalid)?;
        if !(1..=12).contains(&hour) {
            return Err(invalid());
        }

        let hour = match period.to_ascii_uppercase().as_str() {
            "AM" if hour == 12 => 0,
            "AM" => hour,
            "PM" if hour == 12 => 12,
            "PM" => hour + 12,
            _ => return Err(invalid()),
        };

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// Parse "HH:MM" or "HH:MM:SS" (seconds ignored).
    pub fn parse_24h(s: &str) -> Result<Self, HoursError> {
        let s = s.trim();
        let clock = match s.matches(':').count() {
            1 => s,
            2 => s.rsplit_once(':').map(|(hm, _)| hm).unwrap_or(s),
            _ => return Err(HoursError::InvalidTime(s.to_string())),
        };
        split_clock(clock)
            .and_then(|(h, m)| Self::from_hm(h, m))
            .ok_or_else(|| HoursError::InvalidTime(s.to_string()))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 60)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 60)
    }

    /// The time of day of `dt`, truncated to the minute.
    pub fn of(dt: &NaiveDateTime) -> Self {
        Self((dt.hour() * 60 + dt.minute()) as u16 % MINUTES_PER_DAY)
    }

    /// "9:00 am", the form used in human-readable descriptions.
    pub fn to_lowercase_string(self) -> String {
        self.to_string().to_lowercase()
    }

    fn hour12(self) -> (u32, &'static str) {
        let h = self.hour();
        let period = if h >= 12 { "PM" } else { "AM" };
        let h12 = match h {
            0 => 12,
            13..=23 => h - 12,
            _ => h,
        };
        (h12, period)
    }
}

fn split_clock(clock: &str) -> Option<(u32, u32)> {
    let (h, m) = clock.split_once(':')?;
    let hour = h.trim().parse().ok()?;
    let minute = m.trim().parse().ok()?;
    Some((hour, minute))
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h12, period) = self.hour12();
        write!(f, "{}:{:02} {}", h12, self.minute(), period)
    }
}

impl FromStr for ClockTime {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_12h(s)
    }
}

// ─── Weekly schedule ─────────────────────────────────────────────

/// One day's raw entry as published by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayEntry {
    Window { open: String, close: String },
    /// Free-form marker, normally `"closed"`.
    Marker(String),
}

impl DayEntry {
    pub fn window(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self::Window { open: open.into(), close: close.into() }
    }

    pub fn closed() -> Self {
        Self::Marker("closed".into())
    }
}

/// The canonical interpretation of a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySchedule {
    /// Open and close are the same: open all day. `opens` is that instant when
    /// it parses as a clock time ("24 hours" does not).
    Open24Hours { opens: Option<ClockTime> },
    OpenWindow { open: ClockTime, close: ClockTime },
    /// Explicit marker, or no entry for the day.
    Closed { marker: Option<String> },
}

impl DaySchedule {
    /// The first opening instant of the day, if the day opens at all.
    pub fn opens_at(&self) -> Option<ClockTime> {
        match self {
            Self::Open24Hours { opens } => *opens,
            Self::OpenWindow { open, .. } => Some(*open),
            Self::Closed { .. } => None,
        }
    }
}

/// Weekly hours keyed by lowercase weekday name ("monday" … "sunday").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHours(BTreeMap<String, DayEntry>);

impl WeeklyHours {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, day: Weekday, entry: DayEntry) -> Self {
        self.insert(day, entry);
        self
    }

    pub fn insert(&mut self, day: Weekday, entry: DayEntry) {
        self.0.insert(day_key(day).to_string(), entry);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw entry for `day`. Keys are matched case-insensitively.
    pub fn entry(&self, day: Weekday) -> Option<&DayEntry> {
        let key = day_key(day);
        self.0.get(key).or_else(|| {
            self.0
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Interpret the entry for `day`.
    pub fn schedule(&self, day: Weekday) -> Result<DaySchedule, HoursError> {
        match self.entry(day) {
            None => Ok(DaySchedule::Closed { marker: None }),
            Some(DayEntry::Marker(m)) => Ok(DaySchedule::Closed { marker: Some(m.clone()) }),
            Some(DayEntry::Window { open, close }) => {
                if open.trim().eq_ignore_ascii_case(close.trim()) {
                    return Ok(DaySchedule::Open24Hours { opens: ClockTime::parse_12h(open).ok() });
                }
                let open = ClockTime::parse_12h(open)?;
                let close = ClockTime::parse_12h(close)?;
                if open == close {
                    Ok(DaySchedule::Open24Hours { opens: Some(open) })
                } else {
                    Ok(DaySchedule::OpenWindow { open, close })
                }
            }
        }
    }
}

impl FromIterator<(String, DayEntry)> for WeeklyHours {
    fn from_iter<I: IntoIterator<Item = (String, DayEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(day, entry)| (day.to_lowercase(), entry)).collect())
    }
}

/// Canonical lowercase weekday name used as a schedule key.
pub fn day_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ─── Evaluation ──────────────────────────────────────────────────

/// Whether a location is open, plus the short status label shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenStatus {
    pub is_open: bool,
    pub status: String,
}

impl OpenStatus {
    fn new(is_open: bool, status: impl Into<String>) -> Self {
        Self { is_open, status: status.into() }
    }
}

/// Current wall-clock time in `tz`, as a naive local timestamp.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

fn window_contains(open: ClockTime, close: ClockTime, now: ClockTime) -> bool {
    if close <= open {
        now >= open || now < close
    } else {
        open <= now && now < close
    }
}

/// Is the location open at local time `now`?
///
/// No schedule at all is assumed open with an empty status; a missing day
/// entry is closed.
pub fn is_open_now(hours: Option<&WeeklyHours>, now: NaiveDateTime) -> OpenStatus {
    let Some(hours) = hours else {
        return OpenStatus::new(true, "");
    };

    match hours.schedule(now.weekday()) {
        Ok(DaySchedule::Closed { marker: None }) => OpenStatus::new(false, "Closed"),
        Ok(DaySchedule::Closed { marker: Some(m) }) => OpenStatus::new(false, capitalize(&m)),
        Ok(DaySchedule::Open24Hours { .. }) => OpenStatus::new(true, "Open 24h"),
        Ok(DaySchedule::OpenWindow { open, close }) => {
            if window_contains(open, close, ClockTime::of(&now)) {
                OpenStatus::new(true, "Open")
            } else {
                OpenStatus::new(false, "Closed")
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "unparseable hours for {}", day_key(now.weekday()));
            OpenStatus::new(false, HOURS_NOT_AVAILABLE)
        }
    }
}

/// Human-readable description of when the location is open next.
///
/// "Open until 5:00 pm", "Opens today at 9:00 am", "Opens tomorrow at 9:00 am",
/// "Opens next Friday at 10:00 am", or [`HOURS_NOT_AVAILABLE`]. A day open
/// around the clock is open until the instant it opened.
pub fn next_open_description(hours: Option<&WeeklyHours>, now: NaiveDateTime) -> String {
    let Some(hours) = hours else {
        return HOURS_NOT_AVAILABLE.to_string();
    };
    let today = now.weekday();
    let time = ClockTime::of(&now);

    match hours.schedule(today) {
        // Open all day: the window closes at the instant it opened.
        Ok(DaySchedule::Open24Hours { opens: Some(close) }) => {
            return format!("Open until {}", close.to_lowercase_string());
        }
        Ok(DaySchedule::Open24Hours { opens: None }) => return "Open 24 hours".to_string(),
        Ok(DaySchedule::OpenWindow { open, close }) => {
            if window_contains(open, close, time) {
                return format!("Open until {}", close.to_lowercase_string());
            }
            if time < open {
                return format!("Opens today at {}", open.to_lowercase_string());
            }
        }
        Ok(DaySchedule::Closed { .. }) => {}
        Err(e) => {
            tracing::debug!(error = %e, "unparseable hours for {}", day_key(today));
            return HOURS_NOT_AVAILABLE.to_string();
        }
    }

    let mut day = today;
    for offset in 1..7 {
        day = day.succ();
        // Bad data on a later day only disqualifies that day.
        let Ok(schedule) = hours.schedule(day) else {
            continue;
        };
        let when = if offset == 1 {
            "tomorrow".to_string()
        } else {
            format!("next {}", day_label(day))
        };
        match schedule.opens_at() {
            Some(opens) => return format!("Opens {} at {}", when, opens.to_lowercase_string()),
            None if matches!(schedule, DaySchedule::Open24Hours { .. }) => {
                return format!("Opens {}, open 24 hours", when);
            }
            None => {}
        }
    }

    HOURS_NOT_AVAILABLE.to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
