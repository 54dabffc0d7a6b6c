// Configuration management with layered configuration (file, env)

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main settings structure for the planner binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// One configured calendar event to preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub name: String,
    /// Calendar event expression, passed to the parser verbatim.
    pub event: String,
    /// Evaluation zone override for this entry (IANA name).
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// How many upcoming occurrences to emit per schedule.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Default evaluation zone for entries without an override.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Reference instant to search from; defaults to now.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
}

fn default_count() -> usize {
    5
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            timezone: default_timezone(),
            start: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schedules: Vec::new(),
            preview: PreviewConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local configuration (not committed to git)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment-specific configuration
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.preview.count == 0 {
            return Err("Preview count must be greater than 0".to_string());
        }
        if self.preview.timezone.parse::<Tz>().is_err() {
            return Err(format!(
                "Preview timezone '{}' is not a known zone",
                self.preview.timezone
            ));
        }

        for entry in &self.schedules {
            if entry.name.is_empty() {
                return Err("Schedule name cannot be empty".to_string());
            }
            if entry.event.trim().is_empty() {
                return Err(format!("Schedule '{}' has an empty event", entry.name));
            }
            if let Some(zone) = &entry.timezone {
                if zone.parse::<Tz>().is_err() {
                    return Err(format!(
                        "Schedule '{}' timezone '{}' is not a known zone",
                        entry.name, zone
                    ));
                }
            }
        }

        Ok(())
    }
}
