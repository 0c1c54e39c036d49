use super::{describe_event, open_workbook, person_name};
use crate::app::Importer;
use crate::calendar::{CalendarError, CalendarService, LocalCalendar};
use crate::cli::RosterArgs;
use crate::config::Config;
use anyhow::{anyhow, Result};
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct ImportOptions {
    pub calendar: Option<String>,
    pub store: Option<PathBuf>,
    pub create_calendar: bool,
    pub dry_run: bool,
    pub json: bool,
}

fn open_store(config: &Config, store: Option<PathBuf>) -> Result<LocalCalendar> {
    let path = match store {
        Some(path) => path,
        None => config.store_path()?,
    };
    let store = LocalCalendar::open(path)?;
    if let Some(path) = store.path() {
        info!("Using calendar store {}", path.display());
    }
    Ok(store)
}

pub async fn import(config: &Config, args: &RosterArgs, options: ImportOptions) -> Result<()> {
    let name = person_name(args.name.as_deref(), config)?;
    let calendar_name = options
        .calendar
        .or_else(|| config.calendar.default_calendar.clone())
        .ok_or_else(|| anyhow!("No calendar given. Use --calendar or set calendar.default_calendar"))?;
    let tz = config.calendar.timezone()?;

    let workbook = open_workbook(&args.file)?;
    let importer = Importer::new(&config.roster);
    let prepared = importer.prepare(&workbook, &name)?;
    if let Some(warning) = &prepared.scan_warning {
        eprintln!("⚠️  {}", warning);
    }

    let mut store = open_store(config, options.store)?;
    if options.create_calendar {
        match store.create_calendar(&calendar_name, None) {
            Ok(_) | Err(CalendarError::CalendarExists(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if options.dry_run {
        let calendar_id = store.find_calendar_id_by_name(&calendar_name).await?;
        let fresh = importer.plan(&prepared, &store, &calendar_id).await?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&fresh)?);
        } else {
            println!("{} new event(s) for '{}':", fresh.len(), calendar_name);
            for event in &fresh {
                println!("  - {}", describe_event(event, tz.as_ref()));
            }
        }
        return Ok(());
    }

    let created = importer
        .import(&prepared, &mut store, &calendar_name, |progress| {
            print!("\r  Creating events {}/{}", progress.done, progress.total);
            let _ = io::stdout().flush();
        })
        .await;
    println!();

    let created = created?;
    if options.json {
        println!("{}", serde_json::json!({ "created": created }));
    } else {
        println!("✅ Successfully imported {} events into '{}'", created, calendar_name);
    }
    Ok(())
}

pub async fn list(config: &Config, store: Option<PathBuf>, json: bool) -> Result<()> {
    let store = open_store(config, store)?;
    let calendars = store.list_calendars().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&calendars)?);
        return Ok(());
    }

    if calendars.is_empty() {
        println!("No calendars found. Use 'import --create-calendar' to add one.");
        return Ok(());
    }
    println!("Available calendars:");
    for calendar in calendars {
        let events = store.list_events(&calendar.id).await?.len();
        match &calendar.color {
            Some(color) => println!("  - {} ({} events, {})", calendar.name, events, color),
            None => println!("  - {} ({} events)", calendar.name, events),
        }
    }
    Ok(())
}
