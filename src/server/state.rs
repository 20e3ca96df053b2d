use crate::config::AppConfig;
use crate::resources::{LocationRecord, ResourceOrigin};

/// Read-only state shared by all handlers.
pub struct AppState {
    pub locations: Vec<LocationRecord>,
    pub origin: ResourceOrigin,
    pub config: AppConfig,
}
