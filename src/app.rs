//! Roster to calendar pipeline.

use crate::calendar::{import_events, CalendarError, CalendarService, Progress};
use crate::config::RosterConfig;
use crate::reconcile::reconcile;
use crate::roster::{DateHeaderDetector, MissingSchedules, RosterError, RosterScanner, ScheduleEntry};
use crate::schedule::{convert_entries, ConversionReport, ScheduleEvent};
use crate::workbook::Workbook;
use log::info;

/// A roster scanned and converted, ready to compare with a calendar.
#[derive(Debug, Clone, Default)]
pub struct PreparedImport {
    pub entries: Vec<ScheduleEntry>,
    pub report: ConversionReport,
    /// Sheets that had no schedule for the person.
    pub scan_warning: Option<MissingSchedules>,
}

impl PreparedImport {
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.report.events()
    }
}

pub struct Importer {
    scanner: RosterScanner,
}

impl Default for Importer {
    fn default() -> Self {
        Self::new(&RosterConfig::default())
    }
}

impl Importer {
    pub fn new(config: &RosterConfig) -> Self {
        Self { scanner: RosterScanner::new(DateHeaderDetector::new(config.min_header_dates)) }
    }

    /// Scan the roster for `name` and convert every entry.
    pub fn prepare(&self, workbook: &dyn Workbook, name: &str) -> Result<PreparedImport, RosterError> {
        let scan = self.scanner.scan(workbook, name)?;
        let report = convert_entries(&scan.entries);
        Ok(PreparedImport { entries: scan.entries, report, scan_warning: scan.missing })
    }

    /// Events of `prepared` not yet in the calendar.
    pub async fn plan<S>(
        &self,
        prepared: &PreparedImport,
        service: &S,
        calendar_id: &str,
    ) -> Result<Vec<ScheduleEvent>, CalendarError>
    where
        S: CalendarService + ?Sized,
    {
        let existing: Vec<ScheduleEvent> = service
            .list_events(calendar_id)
            .await?
            .iter()
            .map(|e| e.to_schedule_event())
            .collect();
        let events = prepared.events();
        let total = events.len();
        let fresh = reconcile(events, &existing);
        info!("{} of {} events are new to calendar {}", fresh.len(), total, calendar_id);
        Ok(fresh)
    }

    /// Plan and create the new events in the calendar called `calendar_name`.
    pub async fn import<S, F>(
        &self,
        prepared: &PreparedImport,
        service: &mut S,
        calendar_name: &str,
        on_progress: F,
    ) -> anyhow::Result<usize>
    where
        S: CalendarService + ?Sized,
        F: FnMut(Progress),
    {
        let calendar_id = service.find_calendar_id_by_name(calendar_name).await?;
        let fresh = self.plan(prepared, &*service, &calendar_id).await?;
        let created = import_events(service, &calendar_id, &fresh, on_progress).await?;
        Ok(created)
    }
}
