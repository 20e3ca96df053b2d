//! Resource loading: remote REST listing with fallback to the bundled dataset.
//!
//! Flow: static-only flag → bundled. Otherwise GET the listing; any transport
//! error, non-2xx status or undecodable body falls back to bundled.

use super::adapter::{normalize_all, ExternalRecord};
use super::dataset;
use super::record::LocationRecord;
use crate::config::AppConfig;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Where a set of loaded records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOrigin {
    Remote,
    Bundled,
}

impl fmt::Display for ResourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "API"),
            Self::Bundled => write!(f, "Built-in"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed with HTTP {status}")]
    Status { status: u16, url: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One page of the community-resources listing.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<ExternalRecord>,
}

/// Parse a listing body and normalize its records.
pub fn parse_listing(body: &str) -> Result<Vec<LocationRecord>, SourceError> {
    let page: ApiResponse = serde_json::from_str(body)?;
    if page.next.is_some() {
        tracing::debug!(count = page.count, "listing is paginated; using first page only");
    }
    Ok(normalize_all(page.results))
}

#[derive(Debug)]
pub struct LoadedResources {
    pub records: Vec<LocationRecord>,
    pub origin: ResourceOrigin,
}

pub struct ResourceSource {
    url: String,
    static_only: bool,
    timeout: Duration,
}

impl ResourceSource {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            url: config.resources_url(),
            static_only: config.static_only,
            timeout: config.request_timeout,
        }
    }

    /// Load records, never failing: remote errors fall back to the bundled set.
    pub fn load(&self) -> LoadedResources {
        if self.static_only {
            tracing::info!("using bundled dataset (static-only mode)");
            return Self::bundled();
        }

        match self.fetch_remote() {
            Ok(records) => {
                tracing::info!(count = records.len(), "loaded locations from API");
                LoadedResources { records, origin: ResourceOrigin::Remote }
            }
            Err(e) => {
                tracing::warn!(error = %e, "falling back to bundled dataset");
                Self::bundled()
            }
        }
    }

    fn bundled() -> LoadedResources {
        LoadedResources {
            records: dataset::bundled(),
            origin: ResourceOrigin::Bundled,
        }
    }

    pub fn fetch_remote(&self) -> Result<Vec<LocationRecord>, SourceError> {
        let response = ureq::get(&self.url)
            .set("User-Agent", concat!("nearby/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => SourceError::Status {
                    status,
                    url: self.url.clone(),
                },
                other => SourceError::Transport(other.to_string()),
            })?;

        let body = response
            .into_string()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        parse_listing(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_filters_inactive() {
        let body = r#"{
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"id": 1, "name": "Open Door", "location": {"latitude": 37.0, "longitude": -122.0},
                 "address": "1 A St", "is_active": true},
                {"id": 2, "name": "Closed Door", "location": {"latitude": 37.1, "longitude": -122.1},
                 "address": "2 B St", "is_active": false}
            ]
        }"#;
        let records = parse_listing(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Open Door");
        assert_eq!(records[0].id, Some(1));
    }

    #[test]
    fn test_parse_listing_keeps_records_with_bad_hours() {
        let body = r#"{
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"id": 1, "name": "Open Door", "location": {"latitude": 37.0, "longitude": -122.0},
                 "hours": {"monday": {"open": "09:00", "close": "17:00"}}},
                {"id": 2, "name": "Side Door", "location": {"latitude": 37.1, "longitude": -122.1},
                 "hours": {"monday": {"open": "08:00", "close": "12:00"}, "sunday": null}}
            ]
        }"#;
        let records = parse_listing(body).unwrap();
        assert_eq!(records.len(), 2);
        let side = records[1].hours.as_ref().unwrap();
        assert!(side.entry(chrono::Weekday::Mon).is_some());
        assert!(side.entry(chrono::Weekday::Sun).is_none());
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        assert!(matches!(parse_listing("<html>502</html>"), Err(SourceError::Decode(_))));
        assert!(matches!(parse_listing(r#"{"results": 3}"#), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_static_only_uses_bundled() {
        let source = ResourceSource::new(&AppConfig::default());
        let loaded = source.load();
        assert_eq!(loaded.origin, ResourceOrigin::Bundled);
        assert!(!loaded.records.is_empty());
    }

    #[test]
    fn test_unreachable_api_falls_back() {
        let config = AppConfig {
            static_only: false,
            // Nothing listens on the discard port.
            api_base_url: "http://127.0.0.1:9/api".into(),
            request_timeout: Duration::from_secs(2),
            ..AppConfig::default()
        };
        let loaded = ResourceSource::new(&config).load();
        assert_eq!(loaded.origin, ResourceOrigin::Bundled);
        assert_eq!(loaded.records, dataset::bundled());
    }
}
