//! Defines the resolved geographical location of an address query.

use serde::Serialize;

/// A geocoded address together with its coordinates.
///
/// Produced once per resolution by [`crate::GeoLocator`] from the first candidate the
/// geocoding provider returns, and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use dsir::Location;
///
/// let home = Location::new("123 Main St, Anytown, ST", 40.0, -75.0);
/// assert_eq!(home.latitude, 40.0);
/// assert_eq!(home.longitude, -75.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// The canonical address string reported by the geocoding provider.
    pub address: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
}

impl Location {
    pub fn new(address: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            address: address.into(),
            latitude,
            longitude,
        }
    }
}
