use crate::history::parser::HistoryFormat;
use crate::transport::{get_text, TransportError};
use crate::types::station::StationCode;
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use reqwest::Client;
use std::future::Future;

pub const DEFAULT_HISTORY_URL: &str = "http://www.wunderground.com/history/airport";

/// Length of one history window, and the step between successive windows.
pub const YEAR_WINDOW_DAYS: i64 = 365;

/// Returns the date one history window before `date`.
pub fn one_year_back(date: NaiveDate) -> NaiveDate {
    date - Duration::days(YEAR_WINDOW_DAYS)
}

/// Anything that can deliver one year of raw daily history for a station.
pub trait HistorySource {
    /// Fetches the window `end_date - 365 days ..= end_date`, returning the raw body.
    fn fetch_year(
        &self,
        end_date: NaiveDate,
        station: &StationCode,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Downloads yearly custom-history pages for a station.
///
/// The body is returned untouched; interpreting it is the job of a
/// [`crate::HistoryParser`] matching the configured [`HistoryFormat`].
#[derive(Debug, Clone)]
pub struct HistoryFetcher {
    client: Client,
    base_url: String,
    format: HistoryFormat,
}

impl HistoryFetcher {
    pub fn new(client: Client, base_url: impl Into<String>, format: HistoryFormat) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            format,
        }
    }

    pub fn format(&self) -> HistoryFormat {
        self.format
    }

    /// The URL and query parameters requested for a window ending at `end_date`.
    pub(crate) fn request_parts(
        &self,
        end_date: NaiveDate,
        station: &StationCode,
    ) -> (String, Vec<(&'static str, String)>) {
        let start = one_year_back(end_date);
        let url = custom_history_url(&self.base_url, station.as_str(), start);
        let mut params = end_date_params(end_date);
        if self.format == HistoryFormat::Delimited {
            params.push(("format", "1".to_string()));
        }
        (url, params)
    }
}

impl HistorySource for HistoryFetcher {
    async fn fetch_year(
        &self,
        end_date: NaiveDate,
        station: &StationCode,
    ) -> Result<String, TransportError> {
        info!(
            "Requesting {} history for station {} ending {}",
            self.format, station, end_date
        );
        let (url, params) = self.request_parts(end_date, station);
        let body = get_text(self.client.get(&url).query(&params), &url).await?;
        info!(
            "Downloaded {} bytes of history for station {}",
            body.len(),
            station
        );
        Ok(body)
    }
}

pub(crate) fn custom_history_url(base_url: &str, station: &str, start: NaiveDate) -> String {
    format!(
        "{}/{}/{}/{}/{}/CustomHistory.html",
        base_url.trim_end_matches('/'),
        station,
        start.year(),
        start.month(),
        start.day()
    )
}

pub(crate) fn end_date_params(end_date: NaiveDate) -> Vec<(&'static str, String)> {
    vec![
        ("dayend", end_date.day().to_string()),
        ("monthend", end_date.month().to_string()),
        ("yearend", end_date.year().to_string()),
    ]
}
