use crate::types::daily_record::DailyRecord;
use crate::types::location::Location;
use crate::types::station::StationCode;
use chrono::NaiveDate;
use serde::Serialize;

/// The outcome of a successful days-since-rain resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    /// Whole days between "today" and the matched record's date.
    pub days_ago: u32,
    /// The most recent day that qualified as rain (or snow).
    pub matched_record: DailyRecord,
    pub location: Location,
    pub station: StationCode,
}

impl ResolutionResult {
    /// Flattens the result into the compact shape served to front ends.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use dsir::{DailyRecord, Location, ResolutionResult, StationCode};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    /// let result = ResolutionResult {
    ///     days_ago: 10,
    ///     matched_record: DailyRecord::new(date, 0.4),
    ///     location: Location::new("123 Main St, Anytown, ST", 40.0, -75.0),
    ///     station: StationCode::new("KXYZ"),
    /// };
    ///
    /// let summary = result.summary();
    /// assert_eq!(summary.status, "ok");
    /// assert_eq!(summary.dsir, 10);
    /// assert_eq!(summary.precip, 0.4);
    /// ```
    pub fn summary(&self) -> ResolutionSummary {
        ResolutionSummary {
            status: "ok",
            dsir: self.days_ago,
            address: self.location.address.clone(),
            date: self.matched_record.date,
            precip: self.matched_record.precipitation,
        }
    }
}

/// JSON view of a [`ResolutionResult`]: `{"status": "ok", "dsir": .., "address": ..,
/// "date": "YYYY-MM-DD", "precip": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub status: &'static str,
    pub dsir: u32,
    pub address: String,
    pub date: NaiveDate,
    pub precip: f64,
}
