use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::ingest::error::IngestError;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Serialized as a two element array, matching the city coordinate file.
///
/// # Examples
///
/// ```
/// use forecast_tuner::LatLon;
///
/// let hanoi = LatLon(21.0285, 105.8544);
/// assert_eq!(hanoi.0, 21.0285); // Latitude
/// assert_eq!(hanoi.1, 105.8544); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl Display for LatLon {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// City name → coordinate table used by the ingester.
///
/// Backed by a `BTreeMap`, so iteration order is alphabetical and stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityCoordinates(BTreeMap<String, LatLon>);

impl CityCoordinates {
    /// Loads a JSON object of the form `{"Hanoi": [21.0285, 105.8544], ...}`.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| IngestError::CityConfigRead(path.to_path_buf(), e))?;
        serde_json::from_str(&json)
            .map_err(|e| IngestError::CityConfigParse(path.to_path_buf(), e))
    }

    /// The twenty cities the forecast models are trained for.
    pub fn default_cities() -> Self {
        let cities = [
            ("Hanoi", LatLon(21.0285, 105.8544)),
            ("Moscow", LatLon(55.7558, 37.6173)),
            ("Saint Petersburg", LatLon(59.9343, 30.3351)),
            ("Paris", LatLon(48.8566, 2.3522)),
            ("London", LatLon(51.5074, -0.1278)),
            ("New York", LatLon(40.7128, -74.0060)),
            ("Beijing", LatLon(39.9042, 116.4074)),
            ("Rome", LatLon(41.9028, 12.4964)),
            ("Tokyo", LatLon(35.6895, 139.6917)),
            ("Shanghai", LatLon(31.2304, 121.4737)),
            ("Los Angeles", LatLon(34.0522, -118.2437)),
            ("Dubai", LatLon(25.276987, 55.296249)),
            ("Mumbai", LatLon(19.0760, 72.8777)),
            ("Ho Chi Minh City", LatLon(10.8231, 106.6297)),
            ("Berlin", LatLon(52.5200, 13.4050)),
            ("Sydney", LatLon(-33.8688, 151.2093)),
            ("Cairo", LatLon(30.0444, 31.2357)),
            ("Toronto", LatLon(43.6532, -79.3832)),
            ("Seoul", LatLon(37.5665, 126.9780)),
            ("Singapore", LatLon(1.3521, 103.8198)),
        ];
        Self(
            cities
                .into_iter()
                .map(|(name, location)| (name.to_string(), location))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LatLon)> {
        self.0.iter().map(|(name, location)| (name.as_str(), *location))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, LatLon)> for CityCoordinates {
    fn from_iter<T: IntoIterator<Item = (String, LatLon)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
