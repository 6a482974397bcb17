//! Datetime detection and coercion

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;

use crate::model::{CellValue, ColumnType, Table};

use super::{fraction_exceeds, DATE_SAMPLE_RATIO, DATE_SAMPLE_SIZE};

/// Name fragments that mark a column as holding dates
const DATE_NAME_MARKERS: &[&str] = &["date", "fecha"];

/// Datetime layouts with an explicit UTC offset
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, month-first before day-first
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d-%b-%Y",
];

/// Which rule promoted a column to datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateTrigger {
    /// The column name mentions a date
    Name,
    /// Enough of the sampled values parsed as dates
    Sample,
}

impl std::fmt::Display for DateTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateTrigger::Name => write!(f, "name"),
            DateTrigger::Sample => write!(f, "sample"),
        }
    }
}

/// A column promoted to datetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatePromotion {
    pub column: String,
    pub trigger: DateTrigger,
    /// Cells left missing after parsing
    pub unparsed: usize,
}

/// Check whether a column name marks the column as a date column
pub fn is_date_column_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    DATE_NAME_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Parse a string as a datetime. Date-only values land at midnight and
/// offset-aware values are converted to UTC.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.naive_utc());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // Compact YYYYMMDD
    if trimmed.len() == 8 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(trimmed, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }

    None
}

/// Coerce one cell to a datetime. Numbers are parsed from their text form,
/// so compact `YYYYMMDD` values resolve. Failures become `Null`.
fn coerce_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::String(s) => parse_datetime(s).into(),
        CellValue::Int(_) | CellValue::Float(_) => parse_datetime(&cell.display()).into(),
        CellValue::Date(_) | CellValue::DateTime(_) => cell.clone(),
        _ => CellValue::Null,
    }
}

fn parses_as_datetime(cell: &CellValue) -> bool {
    match cell {
        CellValue::String(s) => parse_datetime(s).is_some(),
        CellValue::Date(_) | CellValue::DateTime(_) => true,
        _ => false,
    }
}

/// Decide whether a column should become a datetime column.
fn date_trigger(table: &Table, col_idx: usize, numeric_promoted: &[String]) -> Option<DateTrigger> {
    let column = &table.columns[col_idx];
    if numeric_promoted.contains(&column.name) {
        return None;
    }
    if is_date_column_name(&column.name) {
        return Some(DateTrigger::Name);
    }
    match column.column_type {
        ColumnType::Text => {
            let sample: Vec<&CellValue> = table
                .column_cells(col_idx)
                .filter(|c| !c.is_null())
                .take(DATE_SAMPLE_SIZE)
                .collect();
            if sample.is_empty() {
                return None;
            }

            let hits = sample.iter().filter(|c| parses_as_datetime(c)).count();
            let promote = fraction_exceeds(hits, sample.len(), DATE_SAMPLE_RATIO);
            tracing::debug!(
                column = %column.name,
                parsed = hits,
                sample = sample.len(),
                promote,
                "datetime sample"
            );
            promote.then_some(DateTrigger::Sample)
        }
        ColumnType::Numeric | ColumnType::Datetime | ColumnType::Boolean => None,
    }
}

/// Promote columns to datetime by name or by sampling their values.
///
/// Columns named in `numeric_promoted` (the numeric stage's output) are
/// never reconsidered. A name match converts any other column regardless of
/// its type or how many values parse.
pub fn coerce_datetime_columns(
    table: &mut Table,
    numeric_promoted: &[String],
) -> Vec<DatePromotion> {
    let promotions: Vec<(usize, DateTrigger, Vec<CellValue>)> = {
        let snapshot = &*table;
        (0..snapshot.column_count())
            .into_par_iter()
            .filter_map(|idx| {
                let trigger = date_trigger(snapshot, idx, numeric_promoted)?;
                let cells = snapshot.column_cells(idx).map(coerce_cell).collect();
                Some((idx, trigger, cells))
            })
            .collect()
    };

    promotions
        .into_iter()
        .map(|(idx, trigger, cells)| {
            let before = table.non_null_count(idx);
            table.replace_column(idx, cells, ColumnType::Datetime);
            let unparsed = before - table.non_null_count(idx);
            DatePromotion {
                column: table.columns[idx].name.clone(),
                trigger,
                unparsed,
            }
        })
        .collect()
}
