use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::schedule::ScheduleEvent;
use crate::workbook::XlsxWorkbook;
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use log::debug;
use std::path::Path;

pub mod calendar;
pub mod config;
pub mod roster;

/// Run one parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    debug!("Loaded config: {:?}", config);

    match cli.command {
        Commands::Scan(args) => roster::scan(&config, &args, cli.json),
        Commands::Convert(args) => roster::convert(&config, &args, cli.json),
        Commands::Import { roster, calendar, store, create_calendar, dry_run } => {
            let options = calendar::ImportOptions {
                calendar,
                store,
                create_calendar,
                dry_run,
                json: cli.json,
            };
            calendar::import(&config, &roster, options).await
        }
        Commands::Calendars { store } => calendar::list(&config, store, cli.json).await,
        Commands::Config { action } => config::handle(&config, action),
    }
}

/// The name from the command line, or the configured one.
fn person_name(arg: Option<&str>, config: &Config) -> Result<String> {
    arg.map(str::to_string)
        .or_else(|| config.roster.person_name.clone())
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| anyhow!("No name given. Use --name or set roster.person_name in the config"))
}

fn open_workbook(path: &Path) -> Result<XlsxWorkbook> {
    XlsxWorkbook::open(path).with_context(|| format!("Failed to open roster {}", path.display()))
}

/// Event line for terminal output, with zone abbreviation when a timezone is configured.
fn describe_event(event: &ScheduleEvent, tz: Option<&Tz>) -> String {
    if event.all_day {
        return event.to_string();
    }
    match tz.and_then(|tz| event.zoned(tz)) {
        Some((start, end)) => format!(
            "{}: {} ({} - {} {})",
            event.schedule_type,
            start.format("%d/%m"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            end.format("%Z")
        ),
        None => event.summary(),
    }
}
