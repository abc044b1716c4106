use crate::transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationLookupError {
    #[error("Could not find a station code for lat/lng: {latitude}, {longitude}")]
    NotFound { latitude: f64, longitude: f64 },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
