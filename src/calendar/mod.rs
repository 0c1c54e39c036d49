//! Calendar collaborator interface and batch import.

use crate::schedule::ScheduleEvent;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

mod local;

pub use local::*;

/// Custom error type for calendar operations
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Calendar '{0}' not found")]
    CalendarNotFound(String),
    #[error("Calendar name '{0}' is ambiguous ({1} calendars share it)")]
    AmbiguousCalendar(String, usize),
    #[error("Calendar '{0}' already exists")]
    CalendarExists(String),
    #[error("Calendar store error: {0}")]
    Store(String),
    #[error("Failed to create event '{title}': {reason}")]
    CreateFailed { title: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

/// An event already present in a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

impl CalendarEvent {
    /// The comparable part of this event; the calendar-assigned id is dropped.
    pub fn to_schedule_event(&self) -> ScheduleEvent {
        ScheduleEvent {
            schedule_type: self.title.clone(),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
        }
    }
}

/// A calendar backend events can be read from and written to.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn list_calendars(&self) -> Result<Vec<CalendarInfo>, CalendarError>;

    async fn list_events(&self, calendar_id: &str) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Create an event and return its id.
    async fn create_event(
        &mut self,
        calendar_id: &str,
        event: &ScheduleEvent,
    ) -> Result<String, CalendarError>;

    /// Id of the one calendar called `name`.
    async fn find_calendar_id_by_name(&self, name: &str) -> Result<String, CalendarError> {
        let mut matches: Vec<CalendarInfo> =
            self.list_calendars().await?.into_iter().filter(|c| c.name == name).collect();
        match matches.len() {
            0 => Err(CalendarError::CalendarNotFound(name.to_string())),
            1 => Ok(matches.remove(0).id),
            n => Err(CalendarError::AmbiguousCalendar(name.to_string(), n)),
        }
    }
}

/// Import progress after each create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("{failed} of {total} events could not be created; first error: {first}")]
    Partial {
        failed: usize,
        total: usize,
        created: usize,
        #[source]
        first: CalendarError,
    },
}

/// Create `events` in a calendar one at a time.
///
/// A failed create does not stop the batch. `on_progress` is called after every
/// attempt. Returns the number of events created, or a summary of the failures.
pub async fn import_events<S, F>(
    service: &mut S,
    calendar_id: &str,
    events: &[ScheduleEvent],
    mut on_progress: F,
) -> Result<usize, ImportError>
where
    S: CalendarService + ?Sized,
    F: FnMut(Progress),
{
    let total = events.len();
    let mut failures: Vec<CalendarError> = Vec::new();

    for (i, event) in events.iter().enumerate() {
        match service.create_event(calendar_id, event).await {
            Ok(id) => debug!("Created '{}' as {}", event.summary(), id),
            Err(e) => {
                error!("Failed to create '{}': {}", event.summary(), e);
                failures.push(e);
            }
        }
        on_progress(Progress { done: i + 1, total });
    }

    let failed = failures.len();
    let created = total - failed;
    match failures.into_iter().next() {
        None => {
            info!("Successfully imported {} events", created);
            Ok(created)
        }
        Some(first) => Err(ImportError::Partial { failed, total, created, first }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Calendar that fails every create for a given event type.
    struct Flaky {
        inner: LocalCalendar,
        fail_on: &'static str,
    }

    #[async_trait]
    impl CalendarService for Flaky {
        async fn list_calendars(&self) -> Result<Vec<CalendarInfo>, CalendarError> {
            self.inner.list_calendars().await
        }

        async fn list_events(&self, calendar_id: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
            self.inner.list_events(calendar_id).await
        }

        async fn create_event(
            &mut self,
            calendar_id: &str,
            event: &ScheduleEvent,
        ) -> Result<String, CalendarError> {
            if event.schedule_type == self.fail_on {
                return Err(CalendarError::CreateFailed {
                    title: event.schedule_type.clone(),
                    reason: "rejected".to_string(),
                });
            }
            self.inner.create_event(calendar_id, event).await
        }
    }

    fn event(schedule_type: &str, day: u32) -> ScheduleEvent {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        ScheduleEvent {
            schedule_type: schedule_type.to_string(),
            start: date.and_hms_opt(8, 0, 0).unwrap(),
            end: date.and_hms_opt(17, 0, 0).unwrap(),
            all_day: false,
        }
    }

    #[tokio::test]
    async fn test_import_reports_progress() {
        let mut calendar = LocalCalendar::in_memory();
        let id = calendar.create_calendar("Werk", None).unwrap();
        let events = vec![event("Dag", 1), event("Avond", 2)];

        let mut seen = Vec::new();
        let created = import_events(&mut calendar, &id, &events, |p| seen.push(p)).await.unwrap();

        assert_eq!(created, 2);
        assert_eq!(seen, vec![Progress { done: 1, total: 2 }, Progress { done: 2, total: 2 }]);
        assert_eq!(calendar.list_events(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_import_continues_after_failures() {
        let mut inner = LocalCalendar::in_memory();
        let id = inner.create_calendar("Werk", None).unwrap();
        let mut calendar = Flaky { inner, fail_on: "Nacht" };
        let events = vec![event("Nacht", 1), event("Dag", 2), event("Nacht", 3), event("Dag", 4)];

        let mut calls = 0;
        let err = import_events(&mut calendar, &id, &events, |_| calls += 1).await.unwrap_err();

        assert_eq!(calls, 4);
        let ImportError::Partial { failed, total, created, first } = err;
        assert_eq!((failed, total, created), (2, 4, 2));
        assert!(matches!(first, CalendarError::CreateFailed { .. }));
        assert_eq!(calendar.list_events(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_find_calendar_by_name() {
        let mut calendar = LocalCalendar::in_memory();
        let werk = calendar.create_calendar("Werk", Some("#00ff00")).unwrap();
        calendar.create_calendar("Prive", None).unwrap();

        assert_eq!(calendar.find_calendar_id_by_name("Werk").await.unwrap(), werk);
        assert!(matches!(
            calendar.find_calendar_id_by_name("Vakantie").await,
            Err(CalendarError::CalendarNotFound(_))
        ));
    }

    struct SameNames;

    #[async_trait]
    impl CalendarService for SameNames {
        async fn list_calendars(&self) -> Result<Vec<CalendarInfo>, CalendarError> {
            Ok(["a", "b"]
                .iter()
                .map(|id| CalendarInfo { id: id.to_string(), name: "Werk".to_string(), color: None })
                .collect())
        }

        async fn list_events(&self, _: &str) -> Result<Vec<CalendarEvent>, CalendarError> {
            Ok(Vec::new())
        }

        async fn create_event(&mut self, _: &str, _: &ScheduleEvent) -> Result<String, CalendarError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_ambiguous_calendar_name() {
        assert!(matches!(
            SameNames.find_calendar_id_by_name("Werk").await,
            Err(CalendarError::AmbiguousCalendar(_, 2))
        ));
    }

    #[test]
    fn test_calendar_event_drops_id() {
        let e = event("Dag", 5);
        let stored = CalendarEvent {
            id: "abc".to_string(),
            title: e.schedule_type.clone(),
            start: e.start,
            end: e.end,
            all_day: e.all_day,
        };
        assert_eq!(stored.to_schedule_event(), e);
    }
}
