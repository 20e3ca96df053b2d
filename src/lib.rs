//! Nearby community resources.
//!
//! Ranks food banks, shelters and similar locations by great-circle distance
//! from the user, evaluates their weekly business hours, and serves the
//! result from a CLI or a small JSON API.

pub mod config;
pub mod geo;
pub mod hours;
pub mod location;
pub mod ranking;
pub mod report;
pub mod resources;
pub mod server;
