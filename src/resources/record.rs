//! The canonical location record every stage downstream of the adapter consumes.

use crate::geo::Coordinate;
use crate::hours::WeeklyHours;
use serde::{Deserialize, Serialize};

/// A community resource location, normalized from whichever source produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Unique within one load.
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    pub coordinates: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<WeeklyHours>,

    // Present only for records from the REST source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type_display: Option<String>,
}

impl LocationRecord {
    /// A record with only the required fields set.
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        address: impl Into<String>,
        coordinates: Coordinate,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: String::new(),
            address: address.into(),
            coordinates,
            hours: None,
            id: None,
            city: None,
            state: None,
            zip_code: None,
            phone: None,
            email: None,
            website: None,
            resource_type: None,
            resource_type_display: None,
        }
    }

    pub fn with_hours(mut self, hours: WeeklyHours) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
