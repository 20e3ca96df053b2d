//! Runtime configuration.
//!
//! Values come from CLI flags (with environment fallbacks, see `main.rs`)
//! and default to the constants below.

use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

/// Serve the bundled dataset without contacting the remote source.
pub const USE_STATIC_DATASET: bool = true;

/// Locations farther than this from the user are not shown.
pub const MAX_LOCATION_DISTANCE_MILES: f64 = 200.0;

pub const DEFAULT_API_BASE: &str = "https://solar-village-backend.onrender.com/api";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub static_only: bool,
    pub max_distance_miles: f64,
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Region cache file. `None` uses `~/.nearby/last_region.json`.
    pub cache_path: Option<PathBuf>,
    /// Zone in which opening hours are evaluated when the caller gives none.
    pub timezone: Tz,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            static_only: USE_STATIC_DATASET,
            max_distance_miles: MAX_LOCATION_DISTANCE_MILES,
            api_base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_path: None,
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

impl AppConfig {
    /// URL of the community-resources listing.
    pub fn resources_url(&self) -> String {
        format!("{}/community-resources/", self.api_base_url.trim_end_matches('/'))
    }
}
