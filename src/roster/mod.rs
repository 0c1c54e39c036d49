//! Roster extraction: find a person's shift codes in every sheet of a workbook.

use crate::workbook::{Workbook, WorkbookError};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

mod date_header;
mod sheet;

pub use date_header::*;
pub use sheet::{scan_sheet, SheetError};

/// One shift code for one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub shift_code: String,
}

/// Fatal roster scan failures.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Workbook contains no sheets")]
    NoSheets,
    #[error("No name given to search the roster for")]
    EmptyName,
    #[error("Failed to scan sheet '{sheet}': {source}")]
    Rows {
        sheet: String,
        #[source]
        source: WorkbookError,
    },
}

/// A sheet that produced no entries, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSheet {
    pub sheet: String,
    pub reason: SheetError,
}

/// Sheets without a schedule for the person, reported next to the entries found elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSchedules {
    pub name: String,
    pub sheets: Vec<MissingSheet>,
}

impl MissingSchedules {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.sheet.as_str()).collect()
    }
}

impl fmt::Display for MissingSchedules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No schedule found for '{}' in {} sheet(s): {}",
            self.name,
            self.sheets.len(),
            self.sheet_names().join(", ")
        )
    }
}

impl std::error::Error for MissingSchedules {}

/// Outcome of a roster scan: all entries found, plus the sheets that had none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterScan {
    pub entries: Vec<ScheduleEntry>,
    pub missing: Option<MissingSchedules>,
}

impl RosterScan {
    /// True when every sheet contributed entries.
    pub fn is_complete(&self) -> bool {
        self.missing.is_none()
    }

    /// Entries when every sheet contributed, otherwise the missing-sheet report.
    pub fn into_result(self) -> Result<Vec<ScheduleEntry>, MissingSchedules> {
        match self.missing {
            None => Ok(self.entries),
            Some(missing) => Err(missing),
        }
    }
}

/// Runs the per-sheet scan over a whole workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterScanner {
    detector: DateHeaderDetector,
}

impl RosterScanner {
    pub fn new(detector: DateHeaderDetector) -> Self {
        Self { detector }
    }

    /// Collect the shift codes of `name` from every sheet.
    ///
    /// Entries keep sheet order, then date order within a sheet. Sheets without a
    /// row for `name` are reported in [`RosterScan::missing`] rather than failing
    /// the scan; a sheet whose rows cannot be read fails it.
    pub fn scan(&self, workbook: &dyn Workbook, name: &str) -> Result<RosterScan, RosterError> {
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }

        let sheets = workbook.sheet_names();
        if sheets.is_empty() {
            return Err(RosterError::NoSheets);
        }

        let mut entries = Vec::new();
        let mut missing = Vec::new();

        for sheet in &sheets {
            let rows = workbook
                .rows(sheet)
                .map_err(|source| RosterError::Rows { sheet: sheet.clone(), source })?;

            match scan_sheet(rows, name, &self.detector, |row, col| {
                workbook.date_style(sheet, row, col)
            }) {
                Ok(found) => {
                    debug!("Sheet '{}': {} entries for '{}'", sheet, found.len(), name);
                    entries.extend(found);
                }
                Err(reason) => {
                    debug!("Sheet '{}': {}", sheet, reason);
                    missing.push(MissingSheet { sheet: sheet.clone(), reason });
                }
            }
        }

        info!(
            "Found {} roster entries for '{}' in {}/{} sheets",
            entries.len(),
            name,
            sheets.len() - missing.len(),
            sheets.len()
        );

        let missing = if missing.is_empty() {
            None
        } else {
            let report = MissingSchedules { name: name.to_string(), sheets: missing };
            warn!("{}", report);
            Some(report)
        };

        Ok(RosterScan { entries, missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MemoryWorkbook;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn header(start: NaiveDate, days: i64) -> Vec<String> {
        let mut cells = vec![String::new()];
        cells.extend((0..days).map(|i| (start + Duration::days(i)).format("%Y-%m-%d").to_string()));
        cells
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(name: &str, codes: &[&str]) -> Vec<String> {
        std::iter::once(name).chain(codes.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_no_sheets_is_fatal() {
        let err = RosterScanner::default().scan(&MemoryWorkbook::new(), "Jones").unwrap_err();
        assert!(matches!(err, RosterError::NoSheets));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let workbook = MemoryWorkbook::new().with_sheet("Blad1", vec![person("Jones", &["d"])]);
        let err = RosterScanner::default().scan(&workbook, "").unwrap_err();
        assert!(matches!(err, RosterError::EmptyName));
    }

    #[test]
    fn test_unreadable_sheet_is_fatal() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Jan", vec![header(ymd(2024, 1, 1), 14), person("Jones", &["d"])])
            .with_unreadable_sheet("Feb", "truncated");

        match RosterScanner::default().scan(&workbook, "Jones").unwrap_err() {
            RosterError::Rows { sheet, .. } => assert_eq!(sheet, "Feb"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_concatenates_sheets_in_order() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Feb", vec![header(ymd(2024, 2, 1), 14), person("Jones", &["a", "n"])])
            .with_sheet("Jan", vec![header(ymd(2024, 1, 1), 14), person("Jones", &["d"])]);

        let scan = RosterScanner::default().scan(&workbook, "Jones").unwrap();

        assert!(scan.is_complete());
        let dates: Vec<NaiveDate> = scan.entries.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![ymd(2024, 2, 1), ymd(2024, 2, 2), ymd(2024, 1, 1)]);
    }

    #[test]
    fn test_missing_sheets_are_reported_with_entries() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Week 1", vec![header(ymd(2024, 1, 1), 14), person("Jones", &["d"])])
            .with_sheet("Notities", vec![person("Jones", &["bellen"])])
            .with_sheet("Week 3", vec![header(ymd(2024, 1, 15), 14), person("Smith", &["d"])]);

        let scan = RosterScanner::default().scan(&workbook, "Jones").unwrap();
        assert_eq!(scan.entries.len(), 1);

        let missing = scan.clone().into_result().unwrap_err();
        assert_eq!(missing.sheet_names(), vec!["Notities", "Week 3"]);
        assert_eq!(
            missing.sheets[0].reason,
            SheetError::NotScheduleSheet { name: "Jones".to_string() }
        );
        assert_eq!(missing.sheets[1].reason, SheetError::NoEntries { name: "Jones".to_string() });
        assert_eq!(
            missing.to_string(),
            "No schedule found for 'Jones' in 2 sheet(s): Notities, Week 3"
        );
    }

    #[test]
    fn test_scan_is_repeatable() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Blad1", vec![header(ymd(2024, 1, 1), 14), person("Jones", &["d", "", "x"])]);
        let scanner = RosterScanner::default();

        assert_eq!(scanner.scan(&workbook, "Jones").unwrap(), scanner.scan(&workbook, "Jones").unwrap());
    }
}
