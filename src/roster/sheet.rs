//! Per-sheet scan for one person's row.

use super::date_header::{DateColumnMap, DateHeaderDetector, DateStyle};
use super::ScheduleEntry;
use crate::workbook::Row;
use log::{debug, trace};

/// Why a sheet contributed no entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    #[error("no row for '{name}' in this sheet")]
    NoEntries { name: String },
    #[error("found '{name}' before any date header, not a schedule sheet")]
    NotScheduleSheet { name: String },
}

/// Scan one sheet's rows for the row of `name`.
///
/// The most recent date header above the name row supplies the dates. The first
/// row whose first cell starts with `name` wins; one entry is produced for every
/// header column inside that row, sorted by date.
pub fn scan_sheet<F>(
    rows: &[Row],
    name: &str,
    detector: &DateHeaderDetector,
    style_of: F,
) -> Result<Vec<ScheduleEntry>, SheetError>
where
    F: Fn(usize, usize) -> Option<DateStyle>,
{
    let mut header: Option<DateColumnMap> = None;

    for (row_idx, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }

        if let Some(mapping) = detector.detect(row, |col| style_of(row_idx, col)) {
            trace!("Date header at row {} with {} dates", row_idx, mapping.len());
            header = Some(mapping);
        }

        if !row[0].starts_with(name) {
            continue;
        }

        let Some(mapping) = header else {
            return Err(SheetError::NotScheduleSheet { name: name.to_string() });
        };

        debug!("Found row for '{}' at row {}", name, row_idx);
        let mut entries: Vec<ScheduleEntry> = mapping
            .iter()
            .filter_map(|(&col, &date)| {
                row.get(col).map(|cell| ScheduleEntry { date, shift_code: cell.clone() })
            })
            .collect();
        entries.sort_by_key(|entry| entry.date);
        return Ok(entries);
    }

    Err(SheetError::NoEntries { name: name.to_string() })
}
