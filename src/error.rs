use crate::geocoding::error::GeocodeError;
use crate::history::error::HistoryParseError;
use crate::stations::error::StationLookupError;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DsirError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    StationLookup(#[from] StationLookupError),

    #[error("History for the year ending {end_date} could not be parsed")]
    HistoryParse {
        end_date: chrono::NaiveDate,
        #[source]
        source: HistoryParseError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("We went back {years} years and didn't find rain!")]
    RainNotFound { years: usize },

    #[error("Threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("Resolution was cancelled")]
    Cancelled,

    #[error("Missing required environment variable '{0}'")]
    MissingCredential(&'static str),

    #[error("Invalid value '{value}' for environment variable '{var}'")]
    InvalidConfig { var: &'static str, value: String },

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Coarse classification of a [`DsirError`], for hosts that map failures to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The geocoder found no candidates for the address.
    NoResults,
    /// The geocoder rejected the request (quota, key, malformed request).
    Geocode,
    /// No station code could be found for the coordinates.
    StationLookup,
    /// A year of history could not be parsed.
    HistoryParse,
    /// Neither the threshold search nor the event fallback found a match.
    RainNotFound,
    /// Network failure or non-success status from any provider.
    Upstream,
    /// The caller supplied an empty address or an invalid threshold.
    InvalidInput,
    /// The caller's cancellation token fired before the resolution finished.
    Cancelled,
    /// The environment or HTTP client setup is unusable.
    Config,
}

impl ErrorKind {
    /// The short message front ends show for this kind of failure.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::NoResults => "no results",
            ErrorKind::Geocode | ErrorKind::StationLookup => "no location",
            ErrorKind::RainNotFound => "no rain",
            ErrorKind::HistoryParse => "bad history",
            ErrorKind::Upstream => "upstream error",
            ErrorKind::InvalidInput => "invalid request",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Config => "misconfigured",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl DsirError {
    /// Classifies the error. Transport failures nested in component errors are
    /// reported as [`ErrorKind::Upstream`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            DsirError::Geocode(GeocodeError::NoResults { .. }) => ErrorKind::NoResults,
            DsirError::Geocode(GeocodeError::Provider { .. }) => ErrorKind::Geocode,
            DsirError::Geocode(GeocodeError::EmptyAddress) => ErrorKind::InvalidInput,
            DsirError::Geocode(GeocodeError::Transport(_)) => ErrorKind::Upstream,
            DsirError::StationLookup(StationLookupError::NotFound { .. }) => {
                ErrorKind::StationLookup
            }
            DsirError::StationLookup(StationLookupError::Transport(_)) => ErrorKind::Upstream,
            DsirError::HistoryParse { .. } => ErrorKind::HistoryParse,
            DsirError::Transport(_) => ErrorKind::Upstream,
            DsirError::RainNotFound { .. } => ErrorKind::RainNotFound,
            DsirError::InvalidThreshold(_) => ErrorKind::InvalidInput,
            DsirError::Cancelled => ErrorKind::Cancelled,
            DsirError::MissingCredential(_)
            | DsirError::InvalidConfig { .. }
            | DsirError::HttpClient(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::request_failure;

    #[test]
    fn test_kind_messages_follow_front_end_contract() {
        let no_results = DsirError::from(GeocodeError::NoResults {
            address: "x".into(),
        });
        assert_eq!(no_results.kind(), ErrorKind::NoResults);
        assert_eq!(no_results.kind().message(), "no results");

        let geocode = DsirError::from(GeocodeError::Provider {
            status: "REQUEST_DENIED".into(),
            message: None,
        });
        assert_eq!(geocode.kind().message(), "no location");

        let station = DsirError::from(StationLookupError::NotFound {
            latitude: 1.0,
            longitude: 2.0,
        });
        assert_eq!(station.kind(), ErrorKind::StationLookup);
        assert_eq!(station.kind().message(), "no location");

        let rain = DsirError::RainNotFound { years: 5 };
        assert_eq!(rain.kind().message(), "no rain");
        assert_eq!(rain.to_string(), "We went back 5 years and didn't find rain!");
    }

    #[test]
    fn test_invalid_input_kinds() {
        assert_eq!(
            DsirError::from(GeocodeError::EmptyAddress).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(DsirError::InvalidThreshold(-1.0).kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_transport_failures_are_upstream_wherever_they_occur() {
        let history = DsirError::from(request_failure("http://history.example").await);
        assert!(matches!(history, DsirError::Transport(_)));
        assert_eq!(history.kind(), ErrorKind::Upstream);

        let geocode = DsirError::from(GeocodeError::from(
            request_failure("http://geocode.example").await,
        ));
        assert_eq!(geocode.kind(), ErrorKind::Upstream);

        let station = DsirError::from(StationLookupError::from(
            request_failure("http://station.example").await,
        ));
        assert_eq!(station.kind(), ErrorKind::Upstream);
        assert_eq!(station.kind().message(), "upstream error");
    }
}
