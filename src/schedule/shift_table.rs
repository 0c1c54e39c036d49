//! Known roster shift codes.
//
// Codes are matched after trimming and lower-casing. Adding a shift means adding
// a row here; the converter has no per-code logic.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// `hour:minute` as a [`NaiveTime`], usable in constants.
pub const fn clock(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("invalid clock time"),
    }
}

/// When a shift takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftWindow {
    /// Midnight to midnight of the next day.
    AllDay,
    /// A timed shift; an end at or before the start falls on the next day.
    Timed { start: NaiveTime, end: NaiveTime },
}

impl ShiftWindow {
    pub const fn timed(start: (u32, u32), end: (u32, u32)) -> Self {
        Self::Timed { start: clock(start.0, start.1), end: clock(end.0, end.1) }
    }

    /// Start, end and all-day flag of this window on `date`.
    pub fn on(self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime, bool) {
        match self {
            Self::AllDay => {
                let start = date.and_time(NaiveTime::MIN);
                (start, start + Duration::days(1), true)
            }
            Self::Timed { start, end } => {
                let start_at = date.and_time(start);
                let mut end_at = date.and_time(end);
                if end <= start {
                    end_at += Duration::days(1);
                }
                (start_at, end_at, false)
            }
        }
    }
}

/// What an event for a shift is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftLabel {
    Named(&'static str),
    /// The code as written in the roster.
    RawCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftDefinition {
    pub codes: &'static [&'static str],
    pub label: ShiftLabel,
    pub window: ShiftWindow,
}

/// Cell contents meaning "nothing scheduled".
pub const PLACEHOLDER_CODES: &[&str] = &["", "x", "-", "-c"];

/// Label of the all-day event for a placeholder on a weekday.
pub const FREE_DAY_LABEL: &str = "Vrij";

/// Window used for codes not in [`SHIFT_TABLE`].
pub const DEFAULT_WINDOW: ShiftWindow = ShiftWindow::timed((8, 0), (17, 0));

pub static SHIFT_TABLE: &[ShiftDefinition] = &[
    ShiftDefinition {
        codes: &["d"],
        label: ShiftLabel::Named("Dag"),
        window: ShiftWindow::timed((7, 45), (16, 15)),
    },
    ShiftDefinition {
        codes: &["a", "wa"],
        label: ShiftLabel::Named("Avond"),
        window: ShiftWindow::timed((15, 30), (23, 59)),
    },
    ShiftDefinition {
        codes: &["n", "wn"],
        label: ShiftLabel::Named("Nacht"),
        window: ShiftWindow::timed((23, 30), (8, 30)),
    },
    ShiftDefinition {
        codes: &["t", "tu"],
        label: ShiftLabel::Named("Tussen"),
        window: ShiftWindow::timed((11, 0), (19, 30)),
    },
    ShiftDefinition {
        codes: &["wk"],
        label: ShiftLabel::Named("Weekend kort"),
        window: ShiftWindow::timed((8, 0), (13, 0)),
    },
    ShiftDefinition {
        codes: &["1b", "1d", "ccu", "seh", "seh l", "seh c"],
        label: ShiftLabel::RawCode,
        window: ShiftWindow::timed((8, 0), (17, 0)),
    },
    ShiftDefinition {
        codes: &["vak", "vk", "aanvraag verlof", "aanvraag vrij"],
        label: ShiftLabel::Named("Vakantiedag"),
        window: ShiftWindow::AllDay,
    },
    ShiftDefinition {
        codes: &["c"],
        label: ShiftLabel::Named("Compensatiedag"),
        window: ShiftWindow::AllDay,
    },
];

/// Look up a normalised (trimmed, lower-case) code.
pub fn lookup(code: &str) -> Option<&'static ShiftDefinition> {
    SHIFT_TABLE.iter().find(|def| def.codes.contains(&code))
}

pub fn is_placeholder(code: &str) -> bool {
    PLACEHOLDER_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique_and_normalised() {
        let mut seen = HashSet::new();
        for code in SHIFT_TABLE.iter().flat_map(|def| def.codes.iter()) {
            assert!(seen.insert(*code), "duplicate code {code}");
            assert_eq!(*code, code.trim().to_lowercase());
            assert!(!is_placeholder(code), "{code} is also a placeholder");
        }
    }

    #[test]
    fn test_night_window_ends_next_day() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let (start, end, all_day) = lookup("n").unwrap().window.on(date);

        assert_eq!(start, date.and_hms_opt(23, 30, 0).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(8, 30, 0).unwrap());
        assert!(!all_day);
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(7, 45), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert_eq!(clock(23, 59).format("%H:%M").to_string(), "23:59");
    }

    #[test]
    fn test_all_day_window() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let (start, end, all_day) = ShiftWindow::AllDay.on(date);
        assert_eq!(end - start, Duration::hours(24));
        assert_eq!(start.date(), date);
        assert!(all_day);
    }

    #[test]
    fn test_lookup_misses_unknown() {
        assert!(lookup("zz").is_none());
        assert!(lookup("D").is_none());
    }
}
