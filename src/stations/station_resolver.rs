use crate::stations::error::StationLookupError;
use crate::transport::get_text;
use crate::types::station::StationCode;
use log::{debug, error};
use regex::Regex;
use reqwest::Client;
use std::future::Future;
use std::sync::OnceLock;

pub const DEFAULT_STATION_URL: &str =
    "http://www.wunderground.com/cgi-bin/findweather/getForecast";

// Station codes appear in history links such as `/history/airport/KPHL/2015/1/1/...`.
const STATION_PATTERN: &str = r"/history/airport/([a-zA-Z]{3,4})/";

/// Anything that can name the weather station closest to a coordinate pair.
pub trait StationLookup {
    fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<StationCode, StationLookupError>> + Send;
}

/// Looks up the nearest station by scraping the forecast page for a `lat,lng` query.
#[derive(Debug, Clone)]
pub struct StationResolver {
    client: Client,
    base_url: String,
}

impl StationResolver {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl StationLookup for StationResolver {
    async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<StationCode, StationLookupError> {
        debug!(
            "Looking up station code for lat/lng: {}, {}",
            latitude, longitude
        );
        let query = format!("{},{}", latitude, longitude);
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("query", query.as_str())]);
        let body = get_text(request, &self.base_url).await?;

        extract_station_code(&body).ok_or_else(|| {
            error!(
                "Could not find station code for lat/lng: {}, {}",
                latitude, longitude
            );
            StationLookupError::NotFound {
                latitude,
                longitude,
            }
        })
    }
}

fn station_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(STATION_PATTERN).expect("station pattern is a valid regex"))
}

/// Returns the first station code embedded in a history link in `body`, case preserved.
pub fn extract_station_code(body: &str) -> Option<StationCode> {
    station_pattern()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|code| StationCode::new(code.as_str()))
}
