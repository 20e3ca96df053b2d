//! User position subsystem.
//!
//! Two-stage position acquisition (approximate, then precise), a short-lived
//! file cache of the last region, and the providers that produce fixes.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use cache::RegionCache;
pub use providers::{IpGeolocator, ManualPosition, PositionProvider};
pub use resolver::{Acquisition, Liveness, PositionResolver};
pub use types::{FixStage, LocationAccuracy, LocationError, Permission, Region, DEFAULT_REGION};
