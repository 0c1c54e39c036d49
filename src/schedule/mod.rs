//! Shift code conversion into calendar events.

use crate::roster::ScheduleEntry;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod shift_table;

use shift_table::{clock, ShiftLabel, ShiftWindow, DEFAULT_WINDOW, FREE_DAY_LABEL};

/// Time of day at which the weekday of a roster date is decided.
pub const WEEKDAY_REFERENCE: NaiveTime = clock(16, 0);

/// A calendar-ready event derived from one roster entry.
///
/// Times are local wall-clock times. Equality and hashing cover all four fields,
/// which is what reconciliation against an existing calendar relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub schedule_type: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

impl ScheduleEvent {
    fn from_window(schedule_type: impl Into<String>, date: NaiveDate, window: ShiftWindow) -> Self {
        let (start, end, all_day) = window.on(date);
        Self { schedule_type: schedule_type.into(), start, end, all_day }
    }

    /// One-line description, e.g. `Dag: 04/03 (07:45 - 16:15)`.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} ({} - {})",
            self.schedule_type,
            self.start.format("%d/%m"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }

    /// Start and end placed in `tz`. `None` when a time does not exist there.
    pub fn zoned(&self, tz: &Tz) -> Option<(chrono::DateTime<Tz>, chrono::DateTime<Tz>)> {
        let start = tz.from_local_datetime(&self.start).earliest()?;
        let end = tz.from_local_datetime(&self.end).earliest()?;
        Some((start, end))
    }
}

impl fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.all_day {
            write!(f, "{}: {} (all day)", self.schedule_type, self.start.format("%d/%m"))
        } else {
            f.write_str(&self.summary())
        }
    }
}

/// How confidently a shift code was converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conversion {
    /// Free or leave day on a weekday; kept, but not a working shift.
    Vrij,
    /// Known shift code.
    Converted,
    /// Unknown code, given the default window. Needs review.
    Defaulted,
    /// Nothing scheduled on a weekend; not turned into an event.
    Skipped,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Conversion::Vrij => "vrij",
            Conversion::Converted => "converted",
            Conversion::Defaulted => "defaulted",
            Conversion::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Whether `date` falls on a weekend, judged at [`WEEKDAY_REFERENCE`].
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.and_time(WEEKDAY_REFERENCE).weekday(), Weekday::Sat | Weekday::Sun)
}

/// Convert one roster cell into an event and its classification.
///
/// Never fails: unknown codes get the default window and are marked
/// [`Conversion::Defaulted`]. The event of a [`Conversion::Skipped`] result is
/// not meant to be used.
pub fn convert_shift(shift_code: &str, date: NaiveDate) -> (ScheduleEvent, Conversion) {
    let normalized = shift_code.trim().to_lowercase();

    if shift_table::is_placeholder(&normalized) {
        let event = ScheduleEvent::from_window(FREE_DAY_LABEL, date, ShiftWindow::AllDay);
        let conversion = if is_weekend(date) { Conversion::Skipped } else { Conversion::Vrij };
        return (event, conversion);
    }

    match shift_table::lookup(&normalized) {
        Some(def) => {
            let label = match def.label {
                ShiftLabel::Named(name) => name.to_string(),
                ShiftLabel::RawCode => shift_code.to_string(),
            };
            (ScheduleEvent::from_window(label, date, def.window), Conversion::Converted)
        }
        None => {
            debug!("Unknown shift code '{}' on {}, using default window", shift_code, date);
            (ScheduleEvent::from_window(shift_code, date, DEFAULT_WINDOW), Conversion::Defaulted)
        }
    }
}

/// One roster entry after conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub date: NaiveDate,
    pub shift_code: String,
    pub event: ScheduleEvent,
    pub conversion: Conversion,
}

/// Conversion results for a whole roster, in entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub classified: Vec<ClassifiedEvent>,
}

impl ConversionReport {
    /// Every event meant for the calendar: all but the skipped entries.
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.classified
            .iter()
            .filter(|c| c.conversion != Conversion::Skipped)
            .map(|c| c.event.clone())
            .collect()
    }

    /// Events from unknown codes.
    pub fn warnings(&self) -> Vec<&ScheduleEvent> {
        self.with(Conversion::Defaulted).map(|c| &c.event).collect()
    }

    pub fn free_days(&self) -> Vec<NaiveDate> {
        self.with(Conversion::Vrij).map(|c| c.date).collect()
    }

    pub fn skipped_days(&self) -> Vec<NaiveDate> {
        self.with(Conversion::Skipped).map(|c| c.date).collect()
    }

    pub fn count(&self, conversion: Conversion) -> usize {
        self.with(conversion).count()
    }

    fn with(&self, conversion: Conversion) -> impl Iterator<Item = &ClassifiedEvent> {
        self.classified.iter().filter(move |c| c.conversion == conversion)
    }
}

/// Convert every entry of a roster.
pub fn convert_entries(entries: &[ScheduleEntry]) -> ConversionReport {
    let classified: Vec<ClassifiedEvent> = entries
        .iter()
        .map(|entry| {
            let (event, conversion) = convert_shift(&entry.shift_code, entry.date);
            ClassifiedEvent {
                date: entry.date,
                shift_code: entry.shift_code.clone(),
                event,
                conversion,
            }
        })
        .collect();

    let report = ConversionReport { classified };
    let defaulted = report.count(Conversion::Defaulted);
    if defaulted > 0 {
        warn!("{} shift code(s) were not recognised and need review", defaulted);
    }
    report
}
