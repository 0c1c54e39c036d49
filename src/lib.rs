pub mod app;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod reconcile;
pub mod roster;
pub mod schedule;
pub mod workbook;

/// Debug-level logger for tests and embedding; does nothing if a logger is already set.
pub fn init_logger() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .is_test(true)
        .try_init();
}

// Re-export commonly used types
pub use app::{Importer, PreparedImport};
pub use config::Config;
pub use reconcile::reconcile;
pub use roster::{RosterError, RosterScan, RosterScanner, ScheduleEntry};
pub use schedule::{convert_entries, convert_shift, Conversion, ConversionReport, ScheduleEvent};
pub use workbook::{MemoryWorkbook, Workbook, XlsxWorkbook};
