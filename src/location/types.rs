//! Core types for position acquisition.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Latitude span of a freshly acquired region.
pub const DEFAULT_LATITUDE_DELTA: f64 = 0.0922;
/// Longitude span of a freshly acquired region.
pub const DEFAULT_LONGITUDE_DELTA: f64 = 0.0421;

/// Viewport used when no position is known (San Francisco).
pub const DEFAULT_REGION: Region = Region {
    latitude: 37.7749,
    longitude: -122.4194,
    latitude_delta: DEFAULT_LATITUDE_DELTA,
    longitude_delta: DEFAULT_LONGITUDE_DELTA,
};

/// A map viewport: center plus latitude/longitude span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    /// A region centered on `at` with the default span.
    pub fn around(at: Coordinate) -> Self {
        Self {
            latitude: at.latitude,
            longitude: at.longitude,
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl Default for Region {
    fn default() -> Self {
        DEFAULT_REGION
    }
}

/// How much the current region can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationAccuracy {
    /// Restored from the region cache.
    Cached,
    Approximate,
    Precise,
    /// No fix; the region is a fallback.
    Error,
}

impl fmt::Display for LocationAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Approximate => write!(f, "approximate"),
            Self::Precise => write!(f, "precise"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Accuracy requested from a position provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStage {
    Approximate,
    Precise,
}

impl From<FixStage> for LocationAccuracy {
    fn from(stage: FixStage) -> Self {
        match stage {
            FixStage::Approximate => Self::Approximate,
            FixStage::Precise => Self::Precise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Position acquisition errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
    #[error("Position unavailable: {0}")]
    Unavailable(String),
}
