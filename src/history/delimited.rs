//! Adapter for the comma-separated history export.
//!
//! The export has a header line followed by one row per day:
//!
//! ```text
//! EST,Max TemperatureF,Mean TemperatureF,Min TemperatureF,...,PrecipitationIn, CloudCover, Events,WindDirDegrees
//! 2015-1-1,37,32,26,...,0.00,3,,279<br />
//! 2015-1-2,43,36,29,...,T,6,Rain-Snow,228<br />
//! ```

use crate::history::error::HistoryParseError;
use crate::history::parser::{parse_events, parse_precipitation, parse_temperature, HistoryParser};
use crate::types::daily_record::DailyRecord;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use log::debug;

pub(crate) const COLUMNS: usize = 23;
const DATE: usize = 0;
const MAX_TEMPERATURE: usize = 1;
const MIN_TEMPERATURE: usize = 3;
const PRECIPITATION: usize = 19;
const EVENTS: usize = 21;

const LINE_BREAK_MARKUP: &str = "<br />";
const EVENT_DELIMITER: char = '-';

#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedParser;

impl HistoryParser for DelimitedParser {
    fn parse(&self, raw: &str) -> Result<Vec<DailyRecord>, HistoryParseError> {
        let cleaned = raw.replace(LINE_BREAK_MARKUP, "");
        let cleaned = cleaned.trim();

        // Discard the header line.
        let body = match cleaned.split_once('\n') {
            Some((_, rest)) => rest,
            None => return Ok(Vec::new()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut history = Vec::new();
        for result in reader.records() {
            let record = result?;
            // Header is line 1 of the raw content.
            let row = record.position().map_or(0, |p| p.line() + 1);
            history.push(parse_row(row, &record)?);
        }

        debug!("Parsed {} delimited history rows", history.len());
        Ok(history)
    }
}

fn parse_row(row: u64, record: &StringRecord) -> Result<DailyRecord, HistoryParseError> {
    if record.len() != COLUMNS {
        return Err(HistoryParseError::ColumnCount {
            row,
            expected: COLUMNS,
            found: record.len(),
        });
    }
    let field = |idx: usize| record.get(idx).unwrap_or_default();

    let date_raw = field(DATE).trim();
    let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d").map_err(|_| {
        HistoryParseError::InvalidDate {
            row,
            value: date_raw.to_string(),
        }
    })?;

    Ok(DailyRecord {
        date,
        precipitation: parse_precipitation(row, field(PRECIPITATION))?,
        events: parse_events(field(EVENTS), EVENT_DELIMITER),
        min_temperature: parse_temperature(row, "min_temperature", field(MIN_TEMPERATURE))?,
        max_temperature: parse_temperature(row, "max_temperature", field(MAX_TEMPERATURE))?,
    })
}
