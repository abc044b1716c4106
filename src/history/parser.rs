//! The single parsing interface for yearly history content, plus the value coercion
//! rules every source shape shares.
//!
//! Column positions stay inside the format adapters ([`DelimitedParser`] and
//! [`MarkupParser`]); callers only ever see [`DailyRecord`]s.

use crate::history::delimited::DelimitedParser;
use crate::history::error::HistoryParseError;
use crate::history::markup::MarkupParser;
use crate::types::daily_record::DailyRecord;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Marker the provider uses for a trace amount of precipitation.
const TRACE: &str = "T";

/// Turns one fetched year of raw content into chronologically ordered records.
///
/// A malformed row fails the whole year; no partial results are returned.
pub trait HistoryParser {
    fn parse(&self, raw: &str) -> Result<Vec<DailyRecord>, HistoryParseError>;
}

/// The wire shape the history provider is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFormat {
    /// Comma-separated rows, one per day, after a single header line.
    #[default]
    Delimited,
    /// An HTML table grouped into year and month header blocks.
    Markup,
}

impl HistoryParser for HistoryFormat {
    fn parse(&self, raw: &str) -> Result<Vec<DailyRecord>, HistoryParseError> {
        match self {
            HistoryFormat::Delimited => DelimitedParser.parse(raw),
            HistoryFormat::Markup => MarkupParser.parse(raw),
        }
    }
}

impl FromStr for HistoryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" | "delimited" => Ok(HistoryFormat::Delimited),
            "html" | "markup" => Ok(HistoryFormat::Markup),
            other => Err(format!("unknown history format '{}'", other)),
        }
    }
}

impl fmt::Display for HistoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryFormat::Delimited => write!(f, "csv"),
            HistoryFormat::Markup => write!(f, "html"),
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == "-"
}

/// Trace, empty and dash cells count as no measurable precipitation.
pub(crate) fn parse_precipitation(row: u64, raw: &str) -> Result<f64, HistoryParseError> {
    let value = raw.trim();
    if value == TRACE || is_placeholder(value) {
        return Ok(0.0);
    }
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(amount),
        _ => Err(HistoryParseError::InvalidNumber {
            row,
            column: "precipitation",
            value: value.to_string(),
        }),
    }
}

/// Empty and dash cells are absent temperatures, never zero.
pub(crate) fn parse_temperature(
    row: u64,
    column: &'static str,
    raw: &str,
) -> Result<Option<f64>, HistoryParseError> {
    let value = raw.trim();
    if is_placeholder(value) {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .map(Some)
        .ok_or_else(|| HistoryParseError::InvalidNumber {
            row,
            column,
            value: value.to_string(),
        })
}

pub(crate) fn parse_events(raw: &str, delimiter: char) -> BTreeSet<String> {
    raw.split(delimiter)
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
