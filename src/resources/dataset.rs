//! Bundled offline dataset, compiled into the binary.
//!
//! Used when the remote source is disabled or unreachable. Rows are in the
//! flat spreadsheet shape and carry no opening hours.

use super::adapter::{normalize_all, ExternalRecord};
use super::record::LocationRecord;

const BUNDLED_JSON: &str = include_str!("../../data/locations.json");

/// The bundled locations, normalized.
pub fn bundled() -> Vec<LocationRecord> {
    match serde_json::from_str::<Vec<ExternalRecord>>(BUNDLED_JSON) {
        Ok(raw) => normalize_all(raw),
        Err(e) => {
            tracing::error!(error = %e, "bundled dataset is malformed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_parses() {
        let records = bundled();
        assert!(records.len() >= 5);
        for r in &records {
            assert!(!r.title.is_empty());
            assert!(!r.address.is_empty());
            assert!(r.hours.is_none());
            assert!((-90.0..=90.0).contains(&r.coordinates.latitude));
            assert!((-180.0..=180.0).contains(&r.coordinates.longitude));
        }
    }

    #[test]
    fn test_bundled_keys_unique() {
        let records = bundled();
        let keys: HashSet<_> = records.iter().map(|r| &r.key).collect();
        assert_eq!(keys.len(), records.len());
    }
}
