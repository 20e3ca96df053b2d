//! Distance ranking of locations around a user position.

use crate::config::MAX_LOCATION_DISTANCE_MILES;
use crate::geo::{distance_miles, Coordinate};
use crate::hours::is_open_now;
use crate::resources::LocationRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

/// List filters, passed explicitly with every ranking call.
#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    pub max_distance_miles: f64,
    /// When false the distance cut is skipped; results are still sorted.
    pub nearby_only: bool,
    /// Keep only locations open at this local time.
    pub open_at: Option<NaiveDateTime>,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            max_distance_miles: MAX_LOCATION_DISTANCE_MILES,
            nearby_only: true,
            open_at: None,
        }
    }
}

impl RankOptions {
    pub fn within(max_distance_miles: f64) -> Self {
        Self { max_distance_miles, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLocation {
    #[serde(flatten)]
    pub record: LocationRecord,
    pub distance_miles: f64,
}

/// Locations within `max_distance_miles` of `origin`, nearest first.
/// Equal distances keep their input order.
pub fn rank(locations: &[LocationRecord], origin: Coordinate, max_distance_miles: f64) -> Vec<LocationRecord> {
    rank_with_distance(locations, origin, &RankOptions::within(max_distance_miles))
        .into_iter()
        .map(|r| r.record)
        .collect()
}

/// Like [`rank`], with every option and the computed distances.
pub fn rank_with_distance(
    locations: &[LocationRecord],
    origin: Coordinate,
    options: &RankOptions,
) -> Vec<RankedLocation> {
    let mut ranked: Vec<RankedLocation> = locations
        .iter()
        .map(|record| (record, distance_miles(origin, record.coordinates)))
        // NaN distances fail the comparison and drop out here.
        .filter(|(_, d)| !options.nearby_only || *d <= options.max_distance_miles)
        .filter(|(record, _)| match options.open_at {
            Some(now) => is_open_now(record.hours.as_ref(), now).is_open,
            None => true,
        })
        .map(|(record, distance_miles)| RankedLocation {
            record: record.clone(),
            distance_miles,
        })
        .collect();

    // Stable sort, NaN distances last.
    ranked.sort_by(|a, b| {
        let (da, db) = (a.distance_miles, b.distance_miles);
        da.is_nan()
            .cmp(&db.is_nan())
            .then(da.partial_cmp(&db).unwrap_or(Ordering::Equal))
    });
    ranked
}

/// Number of locations within `max_distance_miles` of `origin`.
pub fn count_within(locations: &[LocationRecord], origin: Coordinate, max_distance_miles: f64) -> usize {
    locations
        .iter()
        .filter(|l| distance_miles(origin, l.coordinates) <= max_distance_miles)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hours::{DayEntry, WeeklyHours};
    use chrono::{NaiveDate, Weekday};

    const SF: Coordinate = Coordinate::new(37.7749, -122.4194);

    fn loc(key: &str, lat: f64, lon: f64) -> LocationRecord {
        LocationRecord::new(key, key, "somewhere", Coordinate::new(lat, lon))
    }

    fn fixtures() -> Vec<LocationRecord> {
        vec![
            loc("los-angeles", 34.0522, -118.2437), // ~347 mi
            loc("oakland", 37.7989, -122.2744),     // ~8 mi
            loc("sacramento", 38.5816, -121.4944),  // ~75 mi
            loc("mission", 37.7599, -122.4190),     // ~1 mi
        ]
    }

    fn keys(records: &[LocationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_rank_filters_and_sorts() {
        let ranked = rank(&fixtures(), SF, 50.0);
        assert_eq!(keys(&ranked), ["mission", "oakland"]);

        let ranked = rank(&fixtures(), SF, 200.0);
        assert_eq!(keys(&ranked), ["mission", "oakland", "sacramento"]);
    }

    #[test]
    fn test_rank_non_decreasing() {
        let ranked = rank_with_distance(&fixtures(), SF, &RankOptions::within(1000.0));
        assert_eq!(ranked.len(), 4);
        assert!(ranked.windows(2).all(|w| w[0].distance_miles <= w[1].distance_miles));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let input = vec![loc("b", 37.8, -122.4), loc("a", 37.8, -122.4), loc("c", 37.8, -122.4)];
        assert_eq!(keys(&rank(&input, SF, 50.0)), ["b", "a", "c"]);
    }

    #[test]
    fn test_rank_leaves_input_untouched() {
        let input = fixtures();
        let before = input.clone();
        let _ = rank(&input, SF, 10.0);
        assert_eq!(input, before);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let input = fixtures();
        let d = distance_miles(SF, input[1].coordinates);
        assert_eq!(keys(&rank(&input, SF, d)), ["mission", "oakland"]);
    }

    #[test]
    fn test_nearby_only_off_keeps_everything_sorted() {
        let opts = RankOptions { nearby_only: false, max_distance_miles: 1.0, open_at: None };
        let ranked = rank_with_distance(&fixtures(), SF, &opts);
        let order: Vec<_> = ranked.iter().map(|r| r.record.key.as_str()).collect();
        assert_eq!(order, ["mission", "oakland", "sacramento", "los-angeles"]);
    }

    #[test]
    fn test_nan_coordinates_dropped() {
        let mut input = fixtures();
        input.push(loc("broken", f64::NAN, 0.0));
        assert!(rank(&input, SF, 10_000.0).iter().all(|r| r.key != "broken"));
        // Even an unbounded cut never admits an unknown distance.
        assert!(rank(&input, SF, f64::MAX).iter().all(|r| r.key != "broken"));
        assert_eq!(count_within(&input, SF, f64::MAX), input.len() - 1);

        let opts = RankOptions { nearby_only: false, ..RankOptions::default() };
        let ranked = rank_with_distance(&input, SF, &opts);
        assert_eq!(ranked.last().unwrap().record.key, "broken");
        assert!(ranked.last().unwrap().distance_miles.is_nan());
    }

    #[test]
    fn test_open_at_filter() {
        let weekday_hours = WeeklyHours::new().with(Weekday::Mon, DayEntry::window("9:00 AM", "5:00 PM"));
        let input = vec![
            loc("no-hours", 37.78, -122.41),
            loc("office", 37.77, -122.42).with_hours(weekday_hours),
            loc("shut", 37.76, -122.42).with_hours(WeeklyHours::new().with(Weekday::Mon, DayEntry::closed())),
        ];
        // 2026-10-19 is a Monday.
        let monday_noon = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let opts = RankOptions { open_at: Some(monday_noon), ..RankOptions::default() };

        let ranked = rank_with_distance(&input, SF, &opts);
        let mut open: Vec<_> = ranked.iter().map(|r| r.record.key.as_str()).collect();
        open.sort_unstable();
        assert_eq!(open, ["no-hours", "office"]);
    }

    #[test]
    fn test_count_within() {
        assert_eq!(count_within(&fixtures(), SF, 50.0), 2);
        assert_eq!(count_within(&fixtures(), SF, 200.0), 3);
        assert_eq!(count_within(&[], SF, 200.0), 0);
    }
}
