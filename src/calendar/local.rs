//! Calendar kept in a local JSON file.
//
// Lets the import run end to end without a remote calendar service. The whole
// store is one document that is rewritten after every change.

use super::{CalendarError, CalendarEvent, CalendarInfo, CalendarService};
use crate::schedule::ScheduleEvent;
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// Maximum allowed size for the store file (10MB)
const MAX_STORE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    calendars: Vec<StoredCalendar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCalendar {
    #[serde(flatten)]
    info: CalendarInfo,
    #[serde(default)]
    events: Vec<CalendarEvent>,
    #[serde(default)]
    next_event: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LocalCalendar {
    path: Option<PathBuf>,
    document: StoreDocument,
}

impl LocalCalendar {
    /// A store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CalendarError> {
        let path = path.into();
        let document = if path.exists() {
            let metadata = std::fs::metadata(&path).map_err(store_error)?;
            if metadata.len() > MAX_STORE_SIZE {
                return Err(CalendarError::Store(format!(
                    "{} exceeds the maximum store size",
                    path.display()
                )));
            }
            let reader = BufReader::new(File::open(&path).map_err(store_error)?);
            serde_json::from_reader(reader).map_err(|e| {
                CalendarError::Store(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            debug!("No calendar store at {}, starting empty", path.display());
            StoreDocument::default()
        };

        Ok(Self { path: Some(path), document })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add a calendar and return its id. Names must be unique within a store.
    pub fn create_calendar(&mut self, name: &str, color: Option<&str>) -> Result<String, CalendarError> {
        if self.document.calendars.iter().any(|c| c.info.name == name) {
            return Err(CalendarError::CalendarExists(name.to_string()));
        }

        let id = format!("cal-{}", self.document.calendars.len() + 1);
        let mut document = self.document.clone();
        document.calendars.push(StoredCalendar {
            info: CalendarInfo {
                id: id.clone(),
                name: name.to_string(),
                color: color.map(str::to_string),
            },
            events: Vec::new(),
            next_event: 1,
        });
        self.commit(document)?;
        info!("Created calendar '{}' ({})", name, id);
        Ok(id)
    }

    fn calendar(&self, calendar_id: &str) -> Result<&StoredCalendar, CalendarError> {
        self.document
            .calendars
            .iter()
            .find(|c| c.info.id == calendar_id)
            .ok_or_else(|| CalendarError::CalendarNotFound(calendar_id.to_string()))
    }

    /// Write `document` to the store file, then make it the current state.
    ///
    /// On a failed write the in-memory state is left as it was.
    fn commit(&mut self, document: StoreDocument) -> Result<(), CalendarError> {
        if let Some(path) = &self.path {
            write_document(path, &document)?;
        }
        self.document = document;
        Ok(())
    }
}

fn write_document(path: &Path, document: &StoreDocument) -> Result<(), CalendarError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(store_error)?;
    }
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(store_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|e| CalendarError::Store(e.to_string()))?;
    writer.flush().map_err(store_error)
}

fn store_error(e: std::io::Error) -> CalendarError {
    CalendarError::Store(e.to_string())
}

#[async_trait]
impl CalendarService for LocalCalendar {
    async fn list_calendars(&self) -> Result<Vec<CalendarInfo>, CalendarError> {
        Ok(self.document.calendars.iter().map(|c| c.info.clone()).collect())
    }

    async fn list_events(&self, calendar_id: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
        Ok(self.calendar(calendar_id)?.events.clone())
    }

    async fn create_event(
        &mut self,
        calendar_id: &str,
        event: &ScheduleEvent,
    ) -> Result<String, CalendarError> {
        let mut document = self.document.clone();
        let calendar = document
            .calendars
            .iter_mut()
            .find(|c| c.info.id == calendar_id)
            .ok_or_else(|| CalendarError::CalendarNotFound(calendar_id.to_string()))?;

        let id = format!("{}-{}", calendar_id, calendar.next_event);
        calendar.next_event += 1;
        calendar.events.push(CalendarEvent {
            id: id.clone(),
            title: event.schedule_type.clone(),
            start: event.start,
            end: event.end,
            all_day: event.all_day,
        });

        self.commit(document)?;
        Ok(id)
    }
}
