//! Builds browsable links to the history provider's pages, for front ends that want to
//! point users at the underlying data. No network I/O happens here.

use crate::history::fetcher::{custom_history_url, end_date_params, one_year_back, DEFAULT_HISTORY_URL};
use crate::types::station::StationCode;
use chrono::{Datelike, NaiveDate};
use log::debug;

/// Link to the single-day history page for `station` on `date`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dsir::{daily_history_link, StationCode};
///
/// let date = NaiveDate::from_ymd_opt(2015, 3, 7).unwrap();
/// assert_eq!(
///     daily_history_link(&StationCode::new("kphl"), date),
///     "http://www.wunderground.com/history/airport/KPHL/2015/3/7/DailyHistory.html"
/// );
/// ```
pub fn daily_history_link(station: &StationCode, date: NaiveDate) -> String {
    debug!(
        "Building daily history link for date: {} and station: {}",
        date, station
    );
    format!(
        "{}/{}/{}/{}/{}/DailyHistory.html",
        DEFAULT_HISTORY_URL,
        station.to_uppercase(),
        date.year(),
        date.month(),
        date.day()
    )
}

/// Link to the year-long custom history page ending on `date`.
pub fn year_history_link(station: &StationCode, date: NaiveDate) -> String {
    let url = custom_history_url(
        DEFAULT_HISTORY_URL,
        &station.to_uppercase(),
        one_year_back(date),
    );
    let query = end_date_params(date)
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", url, query)
}
