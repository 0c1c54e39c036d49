use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// rostercal - turn a roster spreadsheet into calendar events
#[derive(Debug, Parser)]
#[command(name = "rostercal")]
#[command(about = "Import a person's shifts from a roster spreadsheet into a calendar", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the shift codes found for a person
    Scan(RosterArgs),

    /// Convert a person's shifts into events
    Convert(RosterArgs),

    /// Create the events that are not yet in a calendar
    Import {
        #[command(flatten)]
        roster: RosterArgs,

        /// Calendar name (defaults to the configured calendar)
        #[arg(long, short)]
        calendar: Option<String>,

        /// Calendar store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Create the calendar in the store if it does not exist
        #[arg(long)]
        create_calendar: bool,

        /// Only list the events that would be created
        #[arg(long)]
        dry_run: bool,
    },

    /// List calendars in the store
    #[command(alias = "list")]
    Calendars {
        /// Calendar store file (defaults to the configured store)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Args)]
pub struct RosterArgs {
    /// Roster spreadsheet (xlsx, xls or ods)
    #[arg(required = true)]
    pub file: PathBuf,

    /// Name at the start of the person's row (defaults to the configured name)
    #[arg(long, short)]
    pub name: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show current configuration
    Show,
    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::parse_from([
            "rostercal", "import", "rooster.xlsx", "--name", "Jones", "-c", "Werk", "--dry-run",
        ]);
        match cli.command {
            Commands::Import { roster, calendar, dry_run, store, create_calendar } => {
                assert_eq!(roster.file, PathBuf::from("rooster.xlsx"));
                assert_eq!(roster.name.as_deref(), Some("Jones"));
                assert_eq!(calendar.as_deref(), Some("Werk"));
                assert!(dry_run);
                assert!(store.is_none());
                assert!(!create_calendar);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_json_flag_is_global() {
        let cli = Cli::parse_from(["rostercal", "scan", "rooster.xlsx", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Scan(_)));
    }
}
