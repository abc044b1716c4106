//! Defines the identifier of the weather station history is fetched from.

use serde::Serialize;
use std::fmt;

/// A short code (usually a 3 or 4 letter airport identifier, e.g. `"KPHL"`) naming the
/// weather station nearest to a location.
///
/// The code keeps the case it was extracted with. Use [`StationCode::to_uppercase`] when
/// a normalized form is needed, for example when building links.
///
/// # Examples
///
/// ```
/// use dsir::StationCode;
///
/// let station = StationCode::new("kxyz");
/// assert_eq!(station.as_str(), "kxyz");
/// assert_eq!(station.to_uppercase(), "KXYZ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StationCode(String);

impl StationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_uppercase(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
