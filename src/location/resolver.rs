//! Position resolver: orchestrates the acquisition sequence.
//!
//! Flow: cached region (or default) → permission check → approximate fix →
//! precise refinement.
//!
//! Each stage is attempted once. A failed stage is logged and the previous
//! result stands. Every applied fix is written to the region cache and
//! reported to the caller's callback so it can re-rank. A torn-down
//! [`Liveness`] token stops later results from being applied.

use super::cache::RegionCache;
use super::providers::PositionProvider;
use super::types::{FixStage, LocationAccuracy, LocationError, Permission, Region, DEFAULT_REGION};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Status text shown when no stage produced a fix.
pub const ERROR_GETTING_LOCATION: &str = "Error getting location";

/// Shared flag marking whether the consumer of acquisition results still exists.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the consumer gone. Irreversible.
    pub fn teardown(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of an acquisition sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acquisition {
    pub region: Region,
    pub accuracy: LocationAccuracy,
    /// User-visible status when something went wrong.
    pub status: Option<String>,
}

pub struct PositionResolver {
    cache: RegionCache,
    offline: bool,
}

impl PositionResolver {
    pub fn new() -> Self {
        Self {
            cache: RegionCache::load(),
            offline: false,
        }
    }

    /// Create a resolver with a specific cache.
    pub fn with_cache(cache: RegionCache) -> Self {
        Self { cache, offline: false }
    }

    /// Offline mode: skip the provider, use cache or default only.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// The starting point before any fix: the cached region or the default.
    pub fn initial(&self) -> Acquisition {
        match self.cache.get() {
            Some(region) => Acquisition {
                region,
                accuracy: LocationAccuracy::Cached,
                status: None,
            },
            None => Acquisition {
                region: DEFAULT_REGION,
                accuracy: LocationAccuracy::Error,
                status: None,
            },
        }
    }

    /// Run the full sequence without progress callbacks.
    pub fn acquire(&self, provider: &dyn PositionProvider, liveness: &Liveness) -> Acquisition {
        self.acquire_with(provider, liveness, |_| {})
    }

    /// Run the full sequence, calling `on_fix` after each applied stage.
    pub fn acquire_with(
        &self,
        provider: &dyn PositionProvider,
        liveness: &Liveness,
        mut on_fix: impl FnMut(&Acquisition),
    ) -> Acquisition {
        let mut current = self.initial();
        if self.offline {
            tracing::debug!(accuracy = %current.accuracy, "offline: skipping position fix");
            return current;
        }

        if provider.permission() == Permission::Denied {
            tracing::info!("location permission denied; using fallback region");
            current.accuracy = LocationAccuracy::Error;
            current.status = Some(LocationError::PermissionDenied.to_string());
            return current;
        }

        let mut any_fix = false;
        for stage in [FixStage::Approximate, FixStage::Precise] {
            match provider.locate(stage) {
                Ok(at) => {
                    if !liveness.is_alive() {
                        tracing::debug!(?stage, "discarding fix after teardown");
                        break;
                    }
                    current = Acquisition {
                        region: Region::around(at),
                        accuracy: stage.into(),
                        status: None,
                    };
                    self.cache.put(&current.region);
                    any_fix = true;
                    on_fix(&current);
                }
                Err(e) => tracing::warn!(?stage, error = %e, "position fix failed"),
            }
        }

        if !any_fix && current.accuracy != LocationAccuracy::Cached {
            current.status = Some(ERROR_GETTING_LOCATION.to_string());
        }
        current
    }
}

impl Default for PositionResolver {
    fn default() -> Self {
        Self::new()
    }
}
