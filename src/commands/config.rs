use crate::cli::ConfigActions;
use crate::config::{get_config_path, Config};
use anyhow::Result;

pub fn handle(config: &Config, action: ConfigActions) -> Result<()> {
    match action {
        ConfigActions::Show => {
            println!("\nCurrent Configuration:");
            println!("\nRoster Settings:");
            println!("  Person Name: {}", config.roster.person_name.as_deref().unwrap_or("None"));
            println!("  Minimum Header Dates: {}", config.roster.min_header_dates);
            println!("\nCalendar Settings:");
            println!(
                "  Default Calendar: {}",
                config.calendar.default_calendar.as_deref().unwrap_or("None")
            );
            println!("  Store: {}", config.store_path()?.display());
            println!("  Timezone: {}", config.calendar.timezone.as_deref().unwrap_or("None"));
        }
        ConfigActions::Path => {
            println!("{}", get_config_path()?.display());
        }
    }
    Ok(())
}
