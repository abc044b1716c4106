mod config;
mod days_since;
mod error;
mod geocoding;
mod history;
mod links;
mod rain_finder;
mod stations;
mod transport;
mod types;

pub use config::Config;
pub use days_since::{DaysSinceResolver, MAX_YEAR_ATTEMPTS};
pub use error::{DsirError, ErrorKind};

pub use geocoding::error::GeocodeError;
pub use geocoding::geo_locator::{GeoLocator, Geocoder};

pub use stations::error::StationLookupError;
pub use stations::station_resolver::{extract_station_code, StationLookup, StationResolver};

pub use history::delimited::DelimitedParser;
pub use history::error::HistoryParseError;
pub use history::fetcher::{one_year_back, HistoryFetcher, HistorySource, YEAR_WINDOW_DAYS};
pub use history::markup::MarkupParser;
pub use history::parser::{HistoryFormat, HistoryParser};

pub use links::{daily_history_link, year_history_link};
pub use rain_finder::{find_by_event, find_by_threshold, DEFAULT_THRESHOLD};
pub use transport::TransportError;

pub use types::daily_record::{DailyRecord, PRECIPITATION_EVENTS};
pub use types::location::Location;
pub use types::resolution::{ResolutionResult, ResolutionSummary};
pub use types::station::StationCode;
