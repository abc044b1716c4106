//! Process configuration: the geocoding credential, provider endpoints and transport
//! settings. Read once at startup and handed to each component at construction.

use crate::error::DsirError;
use crate::geocoding::geo_locator::DEFAULT_GEOCODE_URL;
use crate::history::fetcher::DEFAULT_HISTORY_URL;
use crate::history::parser::HistoryFormat;
use crate::stations::station_resolver::DEFAULT_STATION_URL;
use crate::transport::build_client;
use bon::Builder;
use log::info;
use reqwest::Client;
use std::env;
use std::fmt;
use std::time::Duration;

pub const API_KEY_VAR: &str = "GMAPSKEY";
pub const HISTORY_FORMAT_VAR: &str = "DSIR_HISTORY_FORMAT";
pub const REQUEST_TIMEOUT_VAR: &str = "DSIR_REQUEST_TIMEOUT_SECS";
pub const RETRY_BACKOFF_VAR: &str = "DSIR_RETRY_BACKOFF_MS";
pub const GEOCODE_URL_VAR: &str = "DSIR_GEOCODE_URL";
pub const STATION_URL_VAR: &str = "DSIR_STATION_URL";
pub const HISTORY_URL_VAR: &str = "DSIR_HISTORY_URL";

pub const DEFAULT_USER_AGENT: &str = concat!("dsir/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every resolution.
///
/// # Examples
///
/// ```
/// use dsir::{Config, HistoryFormat};
/// use std::time::Duration;
///
/// let config = Config::builder()
///     .geocode_api_key("secret")
///     .history_format(HistoryFormat::Markup)
///     .retry_backoff(Duration::from_millis(250))
///     .build();
///
/// assert_eq!(config.history_format, HistoryFormat::Markup);
/// assert_eq!(config.request_timeout, Duration::from_secs(30));
/// ```
#[derive(Clone, Builder)]
pub struct Config {
    /// Credential sent as `key` to the geocoding provider.
    #[builder(into)]
    pub geocode_api_key: String,
    #[builder(into, default = DEFAULT_GEOCODE_URL.to_string())]
    pub geocode_url: String,
    #[builder(into, default = DEFAULT_STATION_URL.to_string())]
    pub station_url: String,
    #[builder(into, default = DEFAULT_HISTORY_URL.to_string())]
    pub history_url: String,
    #[builder(default)]
    pub history_format: HistoryFormat,
    /// Per-request timeout applied by the shared HTTP client.
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    /// Pause between yearly history attempts.
    #[builder(default = Duration::ZERO)]
    pub retry_backoff: Duration,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("geocode_api_key", &"<redacted>")
            .field("geocode_url", &self.geocode_url)
            .field("station_url", &self.station_url)
            .field("history_url", &self.history_url)
            .field("history_format", &self.history_format)
            .field("request_timeout", &self.request_timeout)
            .field("retry_backoff", &self.retry_backoff)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`DsirError::MissingCredential`] if `GMAPSKEY` is unset or empty, and
    /// [`DsirError::InvalidConfig`] if an optional variable cannot be parsed.
    pub fn from_env() -> Result<Self, DsirError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, DsirError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or(DsirError::MissingCredential(API_KEY_VAR))?;

        let history_format = lookup(HISTORY_FORMAT_VAR)
            .map(|value| parse_var(HISTORY_FORMAT_VAR, value))
            .transpose()?;
        let request_timeout = lookup(REQUEST_TIMEOUT_VAR)
            .map(|value| parse_var::<u64>(REQUEST_TIMEOUT_VAR, value))
            .transpose()?
            .map(Duration::from_secs);
        let retry_backoff = lookup(RETRY_BACKOFF_VAR)
            .map(|value| parse_var::<u64>(RETRY_BACKOFF_VAR, value))
            .transpose()?
            .map(Duration::from_millis);

        let config = Config::builder()
            .geocode_api_key(api_key)
            .maybe_geocode_url(lookup(GEOCODE_URL_VAR))
            .maybe_station_url(lookup(STATION_URL_VAR))
            .maybe_history_url(lookup(HISTORY_URL_VAR))
            .maybe_history_format(history_format)
            .maybe_request_timeout(request_timeout)
            .maybe_retry_backoff(retry_backoff)
            .build();
        info!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Builds the connection-pooled HTTP client every provider shares.
    pub fn http_client(&self) -> Result<Client, DsirError> {
        build_client(self.request_timeout, &self.user_agent).map_err(DsirError::HttpClient)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, DsirError> {
    value
        .trim()
        .parse()
        .map_err(|_| DsirError::InvalidConfig { var, value })
}
