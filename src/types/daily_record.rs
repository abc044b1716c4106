use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Event tags that count as precipitation when scanning by event.
pub const PRECIPITATION_EVENTS: [&str; 2] = ["rain", "snow"];

/// One calendar day of observations for a station.
///
/// Values are normalized by the history parsers: precipitation is never negative
/// (trace and missing amounts become `0.0`), event tags are lower-case, and missing
/// temperatures are `None` rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Total precipitation for the day, in inches.
    pub precipitation: f64,
    /// Lower-case event tags such as `"rain"`, `"snow"` or `"fog"`.
    pub events: BTreeSet<String>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
}

impl DailyRecord {
    /// Creates a record with no events and no temperatures.
    pub fn new(date: NaiveDate, precipitation: f64) -> Self {
        Self {
            date,
            precipitation,
            events: BTreeSet::new(),
            min_temperature: None,
            max_temperature: None,
        }
    }

    /// Adds the given tags (lower-cased) to the record's events.
    pub fn with_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.events
            .extend(events.into_iter().map(|e| e.as_ref().to_lowercase()));
        self
    }

    /// Sets the day's low and high, `None` where the provider reported nothing.
    pub fn with_temperatures(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_temperature = min;
        self.max_temperature = max;
        self
    }

    /// Whether the record carries a `rain` or `snow` event, regardless of the amount measured.
    pub fn has_precipitation_event(&self) -> bool {
        PRECIPITATION_EVENTS
            .iter()
            .any(|event| self.events.contains(*event))
    }
}
