//! Resolves free-text addresses to a [`Location`] through the Google geocoding API.

use crate::geocoding::error::GeocodeError;
use crate::transport::get_json;
use crate::types::location::Location;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;

pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Anything that can turn an address into a [`Location`].
pub trait Geocoder {
    fn locate(&self, address: &str) -> impl Future<Output = Result<Location, GeocodeError>> + Send;
}

#[derive(Deserialize, Debug)]
pub(crate) struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeCandidate>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeocodeCandidate {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize, Debug)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize, Debug)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Geocoder backed by the Google Maps geocoding endpoint.
///
/// A single request is made per call; there is no retry.
#[derive(Debug, Clone)]
pub struct GeoLocator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeoLocator {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl Geocoder for GeoLocator {
    async fn locate(&self, address: &str) -> Result<Location, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        debug!("Geocoding address: {:?}", address);

        let request = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("address", address)]);
        let response: GeocodeResponse = get_json(request, &self.base_url).await?;

        interpret_response(address, response)
    }
}

/// Maps the provider's status and candidates to a [`Location`] or a typed failure.
pub(crate) fn interpret_response(
    address: &str,
    response: GeocodeResponse,
) -> Result<Location, GeocodeError> {
    match response.status.as_str() {
        "OK" => {
            let Some(candidate) = response.results.into_iter().next() else {
                error!("Geocoder returned OK without candidates for {:?}", address);
                return Err(GeocodeError::NoResults {
                    address: address.to_string(),
                });
            };
            Ok(Location::new(
                candidate.formatted_address,
                candidate.geometry.location.lat,
                candidate.geometry.location.lng,
            ))
        }
        "ZERO_RESULTS" => {
            error!("No results found for address {:?}", address);
            Err(GeocodeError::NoResults {
                address: address.to_string(),
            })
        }
        status => {
            error!(
                "Geocoding error occurred with status: {:?} and message: {:?}",
                status, response.error_message
            );
            Err(GeocodeError::Provider {
                status: status.to_string(),
                message: response.error_message,
            })
        }
    }
}
