//! Adapter for the HTML history table.
//!
//! The table is split into blocks: a header row whose first cell is a year, then a row
//! whose first cell is an abbreviated month name, then one row per day of that month
//! with the day-of-month in the first cell.
//!
//! ```html
//! <table id="obsTable">
//!   <tbody>
//!     <tr><th>2015</th><th>Temp. (°F)</th>...</tr>
//!     <tr><td>Jan</td><td>high</td><td>avg</td><td>low</td>...</tr>
//!     <tr><td>1</td><td>37</td><td>32</td><td>26</td>...<td>0.00</td><td></td></tr>
//!     <tr><td>2</td><td>43</td><td>36</td><td>29</td>...<td>T</td><td>Rain , Snow</td></tr>
//!   </tbody>
//! </table>
//! ```

use crate::history::error::HistoryParseError;
use crate::history::parser::{parse_events, parse_precipitation, parse_temperature, HistoryParser};
use crate::types::daily_record::DailyRecord;
use chrono::{Month, NaiveDate};
use log::debug;
use scraper::{ElementRef, Html, Selector};

pub(crate) const TABLE: &str = "table#obsTable";
pub(crate) const COLUMNS: usize = 21;
const MAX_TEMPERATURE: usize = 1;
const MIN_TEMPERATURE: usize = 3;
const PRECIPITATION: usize = 19;
const EVENTS: usize = 20;

const EVENT_DELIMITER: char = ',';

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupParser;

enum RowKind {
    Year(i32),
    Month(u32),
    Day(u32),
    Label,
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_header_row(row: &ElementRef<'_>, first_cell: &ElementRef<'_>) -> bool {
    first_cell.value().name() == "th"
        || row
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| parent.value().name() == "thead")
}

fn classify(first: &str, header: bool) -> Option<RowKind> {
    let all_digits = !first.is_empty() && first.chars().all(|c| c.is_ascii_digit());
    if all_digits && first.len() == 4 {
        return first.parse().ok().map(RowKind::Year);
    }
    if all_digits && first.len() <= 2 {
        return first.parse().ok().map(RowKind::Day);
    }
    if let Ok(month) = first.parse::<Month>() {
        return Some(RowKind::Month(month.number_from_month()));
    }
    header.then_some(RowKind::Label)
}

impl HistoryParser for MarkupParser {
    fn parse(&self, raw: &str) -> Result<Vec<DailyRecord>, HistoryParseError> {
        let document = Html::parse_document(raw);
        let table = document
            .select(&selector(TABLE))
            .next()
            .ok_or(HistoryParseError::MissingTable(TABLE))?;

        let row_selector = selector("tr");
        let cell_selector = selector("th, td");

        let mut year: Option<i32> = None;
        let mut month: Option<u32> = None;
        let mut history = Vec::new();

        for (idx, tr) in table.select(&row_selector).enumerate() {
            let row = idx as u64 + 1;
            let cells: Vec<ElementRef<'_>> = tr.select(&cell_selector).collect();
            let Some(first_cell) = cells.first() else {
                continue;
            };
            let first = cell_text(first_cell);

            match classify(&first, is_header_row(&tr, first_cell)) {
                Some(RowKind::Year(y)) => {
                    year = Some(y);
                    month = None;
                }
                Some(RowKind::Month(m)) => month = Some(m),
                Some(RowKind::Label) => {}
                Some(RowKind::Day(day)) => {
                    let (Some(y), Some(m)) = (year, month) else {
                        return Err(HistoryParseError::MissingPeriodHeader { row });
                    };
                    let texts: Vec<String> = cells.iter().map(cell_text).collect();
                    history.push(parse_day(row, y, m, day, &texts)?);
                }
                None => {
                    return Err(HistoryParseError::UnrecognizedRow { row, value: first });
                }
            }
        }

        debug!("Parsed {} markup history rows", history.len());
        Ok(history)
    }
}

fn parse_day(
    row: u64,
    year: i32,
    month: u32,
    day: u32,
    cells: &[String],
) -> Result<DailyRecord, HistoryParseError> {
    if cells.len() != COLUMNS {
        return Err(HistoryParseError::ColumnCount {
            row,
            expected: COLUMNS,
            found: cells.len(),
        });
    }
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        HistoryParseError::InvalidDate {
            row,
            value: format!("{}-{}-{}", year, month, day),
        }
    })?;

    Ok(DailyRecord {
        date,
        precipitation: parse_precipitation(row, &cells[PRECIPITATION])?,
        events: parse_events(&cells[EVENTS], EVENT_DELIMITER),
        min_temperature: parse_temperature(row, "min_temperature", &cells[MIN_TEMPERATURE])?,
        max_temperature: parse_temperature(row, "max_temperature", &cells[MAX_TEMPERATURE])?,
    })
}
