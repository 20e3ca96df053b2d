//! Position providers: IP geolocation and manually supplied coordinates.

use super::types::{FixStage, LocationError, Permission};
use crate::geo::Coordinate;
use serde::Deserialize;
use std::time::Duration;

/// Something that can report where the user is.
pub trait PositionProvider {
    /// Whether the user allows position access at all.
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    /// One position fix at the requested accuracy.
    fn locate(&self, stage: FixStage) -> Result<Coordinate, LocationError>;
}

// ─── Manual coordinates ─────────────────────────────────────────

/// A fixed position given by the user; precise at every stage.
#[derive(Debug, Clone, Copy)]
pub struct ManualPosition(pub Coordinate);

impl PositionProvider for ManualPosition {
    fn locate(&self, _stage: FixStage) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

// ─── IP-based geolocation ───────────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

const IPAPI_URL: &str = "https://ipapi.co/json/";

/// City-level position from the public IP address. Approximate only.
pub struct IpGeolocator {
    url: String,
    timeout: Duration,
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self {
            url: IPAPI_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl IpGeolocator {
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }

    fn lookup(&self) -> Result<Coordinate, LocationError> {
        let response = ureq::get(&self.url)
            .set("User-Agent", concat!("nearby/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .call()
            .map_err(|e| LocationError::Network(e.to_string()))?;

        let r: IpApiResult = response
            .into_json()
            .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

        parse_ip_result(r)
    }
}

fn parse_ip_result(r: IpApiResult) -> Result<Coordinate, LocationError> {
    let lat = r.latitude.ok_or_else(|| LocationError::InvalidResponse("no latitude".into()))?;
    let lon = r.longitude.ok_or_else(|| LocationError::InvalidResponse("no longitude".into()))?;
    let at = Coordinate::validated(lat, lon).map_err(|e| LocationError::InvalidResponse(e.to_string()))?;
    tracing::debug!(city = r.city.as_deref().unwrap_or("unknown"), "IP geolocation fix");
    Ok(at)
}

impl PositionProvider for IpGeolocator {
    fn locate(&self, stage: FixStage) -> Result<Coordinate, LocationError> {
        match stage {
            FixStage::Approximate => self.lookup(),
            FixStage::Precise => Err(LocationError::Unavailable(
                "IP geolocation has no precise fix".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_is_constant() {
        let p = ManualPosition(Coordinate::new(1.0, 2.0));
        assert_eq!(p.locate(FixStage::Approximate).unwrap(), Coordinate::new(1.0, 2.0));
        assert_eq!(p.locate(FixStage::Precise).unwrap(), Coordinate::new(1.0, 2.0));
        assert_eq!(p.permission(), Permission::Granted);
    }

    #[test]
    fn test_ip_result_parsing() {
        let r: IpApiResult =
            serde_json::from_str(r#"{"latitude": 37.77, "longitude": -122.41, "city": "San Francisco"}"#).unwrap();
        assert_eq!(parse_ip_result(r).unwrap(), Coordinate::new(37.77, -122.41));

        let r: IpApiResult = serde_json::from_str(r#"{"error": true, "reason": "RateLimited"}"#).unwrap();
        assert!(matches!(parse_ip_result(r), Err(LocationError::InvalidResponse(_))));

        let r: IpApiResult = serde_json::from_str(r#"{"latitude": 120.0, "longitude": 0.0}"#).unwrap();
        assert!(parse_ip_result(r).is_err());
    }

    #[test]
    fn test_ip_has_no_precise_stage() {
        let ip = IpGeolocator::default();
        assert!(matches!(ip.locate(FixStage::Precise), Err(LocationError::Unavailable(_))));
    }

    #[test]
    fn test_ip_unreachable_is_network_error() {
        let ip = IpGeolocator::with_url("http://127.0.0.1:9/json/", Duration::from_secs(2));
        assert!(matches!(ip.locate(FixStage::Approximate), Err(LocationError::Network(_))));
    }
}
