use crate::roster::MIN_HEADER_DATES;
use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Overrides the location of the config file.
pub const CONFIG_ENV: &str = "ROSTERCAL_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Name looked up in the first column of the roster
    pub person_name: Option<String>,
    #[serde(default = "default_min_header_dates")]
    pub min_header_dates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    pub default_calendar: Option<String>,
    /// JSON calendar store used by `import`
    pub store_path: Option<PathBuf>,
    /// IANA zone events are shown in, e.g. "Europe/Amsterdam"
    pub timezone: Option<String>,
}

fn default_min_header_dates() -> usize {
    MIN_HEADER_DATES
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { person_name: None, min_header_dates: MIN_HEADER_DATES }
    }
}

impl CalendarConfig {
    pub fn timezone(&self) -> Result<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| name.parse::<Tz>().map_err(|e| anyhow!("Invalid timezone '{}': {}", name, e)))
            .transpose()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.calendar.timezone()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Store path from the config, or `calendar.json` in the data dir.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.calendar.store_path {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join("calendar.json"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "rostercal", "rostercal").context("Failed to determine config directory")
}

pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(project_dirs()?.config_dir().join("config.toml"))
}
