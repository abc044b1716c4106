use crate::transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Address must not be empty")]
    EmptyAddress,

    #[error("No results found for address '{address}'")]
    NoResults { address: String },

    #[error("Geocoding failed with status '{status}' and message {message:?}")]
    Provider {
        status: String,
        message: Option<String>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
