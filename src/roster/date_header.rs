//! Date header detection for roster sheets.
//
// A roster has no fixed layout. The row carrying the date axis is recognised by
// a long run of consecutive days, which separates it from stray dates elsewhere.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of consecutive dates before a row counts as a header.
pub const MIN_HEADER_DATES: usize = 10;

/// Column index to calendar date for one detected header row.
pub type DateColumnMap = BTreeMap<usize, NaiveDate>;

/// Date number formats a spreadsheet cell can carry.
///
/// These are the built-in spreadsheet date formats; the cell text is expected to
/// be rendered in the matching pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateStyle {
    /// `mm-dd-yy`, e.g. `01-07-24`
    MonthDayYear,
    /// `d-mmm-yy`, e.g. `7-Jan-24`
    DayMonthNameYear,
    /// `d-mmm`, e.g. `7-Jan`
    DayMonthName,
    /// `mmm-yy`, e.g. `Jan-24`
    MonthNameYear,
    /// `m/d/yy h:mm`, e.g. `1/7/24 0:00`
    MonthDayYearTime,
}

impl DateStyle {
    /// Number format pattern of this style.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::MonthDayYear => "mm-dd-yy",
            Self::DayMonthNameYear => "d-mmm-yy",
            Self::DayMonthName => "d-mmm",
            Self::MonthNameYear => "mmm-yy",
            Self::MonthDayYearTime => "m/d/yy h:mm",
        }
    }

    /// Render a timestamp the way a cell in this style displays it.
    pub fn render(self, value: NaiveDateTime) -> String {
        match self {
            Self::MonthDayYear => value.format("%m-%d-%y").to_string(),
            Self::DayMonthNameYear => value.format("%-d-%b-%y").to_string(),
            Self::DayMonthName => value.format("%-d-%b").to_string(),
            Self::MonthNameYear => value.format("%b-%y").to_string(),
            Self::MonthDayYearTime => value.format("%-m/%-d/%y %-H:%M").to_string(),
        }
    }

    /// Parse cell text rendered in this style.
    ///
    /// `year_hint` supplies the year for `d-mmm`, which carries none.
    pub fn parse(self, text: &str, year_hint: Option<i32>) -> Option<NaiveDate> {
        let text = text.trim();
        match self {
            Self::MonthDayYear => NaiveDate::parse_from_str(text, "%m-%d-%y").ok(),
            Self::DayMonthNameYear => NaiveDate::parse_from_str(text, "%d-%b-%y").ok(),
            Self::DayMonthName => {
                let year = year_hint?;
                NaiveDate::parse_from_str(&format!("{text}-{year}"), "%d-%b-%Y").ok()
            }
            Self::MonthNameYear => NaiveDate::parse_from_str(&format!("1-{text}"), "%d-%b-%y").ok(),
            Self::MonthDayYearTime => NaiveDateTime::parse_from_str(text, "%m/%d/%y %H:%M")
                .ok()
                .map(|dt| dt.date()),
        }
    }
}

impl fmt::Display for DateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

/// Parse `year-month-day` text, e.g. `2024-1-7` or `2024-01-07`.
///
/// A trailing time part (`2024-01-07 00:00:00`, `2024-01-07T00:00`) is ignored.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let [year, month, day] = split_date_parts(text)?;
    if year.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse `day-month-year` text, e.g. `7-1-2024` or `07-01-2024`.
pub fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let [day, month, year] = split_date_parts(text)?;
    if year.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn split_date_parts(text: &str) -> Option<[&str; 3]> {
    let date_part = text.trim().split([' ', 'T']).next()?;
    let mut parts = date_part.split('-');
    let parts = [parts.next()?, parts.next()?, parts.next()?];
    let all_digits = parts
        .iter()
        .all(|p| !p.is_empty() && p.len() <= 4 && p.bytes().all(|b| b.is_ascii_digit()));
    if !all_digits || date_part.split('-').count() != 3 {
        return None;
    }
    Some(parts)
}

/// Decides whether a row is a date header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateHeaderDetector {
    min_dates: usize,
}

impl Default for DateHeaderDetector {
    fn default() -> Self {
        Self { min_dates: MIN_HEADER_DATES }
    }
}

impl DateHeaderDetector {
    /// Detector requiring `min_dates` consecutive dates; values below 2 are raised to 2.
    pub fn new(min_dates: usize) -> Self {
        Self { min_dates: min_dates.max(2) }
    }

    pub fn min_dates(&self) -> usize {
        self.min_dates
    }

    /// Returns the column to date mapping when `row` is a date header.
    ///
    /// `style_of` yields the stored date style of the cell at a column, if any.
    /// Cells that parse under none of the supported formats are left out; the row
    /// qualifies only when enough cells parse and they form a run of consecutive days.
    pub fn detect<F>(&self, row: &[String], style_of: F) -> Option<DateColumnMap>
    where
        F: Fn(usize) -> Option<DateStyle>,
    {
        let mut candidates = DateColumnMap::new();
        let mut previous: Option<NaiveDate> = None;

        for (col, cell) in row.iter().enumerate() {
            if cell.trim().is_empty() {
                continue;
            }
            if let Some(date) = parse_cell(cell, style_of(col), previous) {
                candidates.insert(col, date);
                previous = Some(date);
            }
        }

        if candidates.len() < self.min_dates {
            return None;
        }

        let consecutive = candidates
            .values()
            .zip(candidates.values().skip(1))
            .all(|(prev, next)| prev.succ_opt() == Some(*next));
        if !consecutive {
            trace!("Rejected {} candidate dates: not consecutive", candidates.len());
            return None;
        }

        Some(candidates)
    }
}

fn parse_cell(text: &str, style: Option<DateStyle>, previous: Option<NaiveDate>) -> Option<NaiveDate> {
    let styled = style.and_then(|style| {
        let parsed = style.parse(text, previous.map(|p| p.year()))?;
        match (style, previous) {
            // d-mmm borrows the year of the previous cell; a wrap past December moves it on
            (DateStyle::DayMonthName, Some(prev)) if parsed < prev => {
                parsed.with_year(parsed.year() + 1)
            }
            _ => Some(parsed),
        }
    });

    styled
        .or_else(|| parse_iso_date(text))
        .or_else(|| parse_day_month_year(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_case::test_case;

    fn iso_row(start: NaiveDate, days: usize) -> Vec<String> {
        (0..days)
            .map(|i| (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string())
            .collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_detects_iso_header() {
        let mut row = vec!["Naam".to_string()];
        row.extend(iso_row(ymd(2024, 1, 1), 14));

        let map = DateHeaderDetector::default().detect(&row, |_| None).unwrap();

        assert_eq!(map.len(), 14);
        assert_eq!(map[&1], ymd(2024, 1, 1));
        assert_eq!(map[&14], ymd(2024, 1, 14));
        assert!(!map.contains_key(&0));
    }

    #[test]
    fn test_rejects_short_run() {
        let row = iso_row(ymd(2024, 1, 1), 9);
        assert!(DateHeaderDetector::default().detect(&row, |_| None).is_none());
    }

    #[test]
    fn test_rejects_gap() {
        // Sunday 2024-01-07 missing
        let mut row = iso_row(ymd(2024, 1, 1), 6);
        row.extend(iso_row(ymd(2024, 1, 8), 7));
        assert_eq!(row.len(), 13);
        assert!(DateHeaderDetector::default().detect(&row, |_| None).is_none());
    }

    #[test]
    fn test_noise_between_dates_is_ignored() {
        let mut row = iso_row(ymd(2024, 2, 26), 12);
        row.insert(3, "totaal".to_string());
        row.insert(7, String::new());

        let map = DateHeaderDetector::default().detect(&row, |_| None).unwrap();
        assert_eq!(map.len(), 12);
        // Leap day survives the run
        assert!(map.values().any(|d| *d == ymd(2024, 2, 29)));
    }

    #[test]
    fn test_stray_date_breaks_run() {
        let mut row = iso_row(ymd(2024, 1, 1), 12);
        row.push("2023-05-01".to_string());
        assert!(DateHeaderDetector::default().detect(&row, |_| None).is_none());
    }

    #[test]
    fn test_day_month_year_fallback() {
        let row: Vec<String> = (1..=10).map(|d| format!("{d:02}-04-2024")).collect();
        let map = DateHeaderDetector::default().detect(&row, |_| None).unwrap();
        assert_eq!(map[&0], ymd(2024, 4, 1));
        assert_eq!(map[&9], ymd(2024, 4, 10));
    }

    #[test]
    fn test_styled_cells() {
        let row: Vec<String> = (0..10)
            .map(|i| {
                let dt = (ymd(2024, 1, 28) + Duration::days(i)).and_hms_opt(0, 0, 0).unwrap();
                DateStyle::MonthDayYear.render(dt)
            })
            .collect();
        assert_eq!(row[0], "01-28-24");

        let map = DateHeaderDetector::default()
            .detect(&row, |_| Some(DateStyle::MonthDayYear))
            .unwrap();
        assert_eq!(map[&0], ymd(2024, 1, 28));
        assert_eq!(map[&9], ymd(2024, 2, 6));
    }

    #[test]
    fn test_day_month_name_takes_year_from_row() {
        // First cell carries the year, the rest are d-mmm across new year
        let mut row = vec!["27-Dec-23".to_string()];
        row.extend(["28-Dec", "29-Dec", "30-Dec", "31-Dec", "1-Jan", "2-Jan", "3-Jan", "4-Jan", "5-Jan"]
            .iter()
            .map(|s| s.to_string()));

        let map = DateHeaderDetector::default()
            .detect(&row, |col| {
                Some(if col == 0 { DateStyle::DayMonthNameYear } else { DateStyle::DayMonthName })
            })
            .unwrap();
        assert_eq!(map[&0], ymd(2023, 12, 27));
        assert_eq!(map[&5], ymd(2024, 1, 1));
        assert_eq!(map[&9], ymd(2024, 1, 5));
    }

    #[test]
    fn test_day_month_name_without_year_is_absent() {
        assert_eq!(parse_cell("7-Jan", Some(DateStyle::DayMonthName), None), None);
    }

    #[test_case(DateStyle::MonthDayYear, "03-04-24" ; "mm-dd-yy")]
    #[test_case(DateStyle::DayMonthNameYear, "4-Mar-24" ; "d-mmm-yy")]
    #[test_case(DateStyle::MonthDayYearTime, "3/4/24 7:45" ; "m/d/yy h:mm")]
    fn test_style_parse(style: DateStyle, text: &str) {
        assert_eq!(style.parse(text, None), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn test_month_name_year_is_first_of_month() {
        assert_eq!(DateStyle::MonthNameYear.parse("Mar-24", None), Some(ymd(2024, 3, 1)));
    }

    #[test_case("2024-1-7", Some((2024, 1, 7)))]
    #[test_case("2024-01-07 00:00:00", Some((2024, 1, 7)))]
    #[test_case("2024-01-07T00:00:00", Some((2024, 1, 7)))]
    #[test_case("2024-02-30", None)]
    #[test_case("24-01-07", None)]
    #[test_case("Jones", None)]
    #[test_case("1b", None)]
    fn test_parse_iso_date(text: &str, expected: Option<(i32, u32, u32)>) {
        assert_eq!(parse_iso_date(text), expected.map(|(y, m, d)| ymd(y, m, d)));
    }

    #[test]
    fn test_threshold_floor() {
        assert_eq!(DateHeaderDetector::new(0).min_dates(), 2);
        let row = iso_row(ymd(2024, 1, 1), 3);
        assert!(DateHeaderDetector::new(3).detect(&row, |_| None).is_some());
    }
}
