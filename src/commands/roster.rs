use super::{describe_event, open_workbook, person_name};
use crate::app::Importer;
use crate::cli::RosterArgs;
use crate::config::Config;
use crate::schedule::Conversion;
use anyhow::Result;

pub fn scan(config: &Config, args: &RosterArgs, json: bool) -> Result<()> {
    let name = person_name(args.name.as_deref(), config)?;
    let workbook = open_workbook(&args.file)?;
    let prepared = Importer::new(&config.roster).prepare(&workbook, &name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prepared.entries)?);
    } else {
        println!("📅 Roster for {}: {} entries", name, prepared.entries.len());
        for entry in &prepared.entries {
            println!("  {} ({})  {}", entry.date, entry.date.format("%a"), entry.shift_code);
        }
    }

    if let Some(warning) = &prepared.scan_warning {
        eprintln!("⚠️  {}", warning);
    }
    Ok(())
}

pub fn convert(config: &Config, args: &RosterArgs, json: bool) -> Result<()> {
    let name = person_name(args.name.as_deref(), config)?;
    let tz = config.calendar.timezone()?;
    let workbook = open_workbook(&args.file)?;
    let prepared = Importer::new(&config.roster).prepare(&workbook, &name)?;
    let report = &prepared.report;

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("📅 Events for {}:", name);
        for item in report.classified.iter().filter(|c| c.conversion != Conversion::Skipped) {
            println!(
                "  {:<10} {:<8} {} [{}]",
                item.date.to_string(),
                item.shift_code,
                describe_event(&item.event, tz.as_ref()),
                item.conversion
            );
        }

        println!(
            "\n{} converted, {} free, {} defaulted, {} skipped",
            report.count(Conversion::Converted),
            report.count(Conversion::Vrij),
            report.count(Conversion::Defaulted),
            report.count(Conversion::Skipped)
        );

        let warnings = report.warnings();
        if !warnings.is_empty() {
            println!("\n⚠️  Unrecognised shift codes, check these events:");
            for event in warnings {
                println!("  - {}", event.summary());
            }
        }

        let free_days = report.free_days();
        if !free_days.is_empty() {
            let days: Vec<String> = free_days.iter().map(|d| d.format("%d/%m").to_string()).collect();
            println!("\nFree days: {}", days.join(", "));
        }
    }

    if let Some(warning) = &prepared.scan_warning {
        eprintln!("⚠️  {}", warning);
    }
    Ok(())
}
