//! Global prioritize configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::SortOrder;
use crate::context::DEFAULT_EXTRA_DATE_FORMATS;
use crate::error::{ScheduleError, ScheduleResult};
use crate::export::CalendarExport;

static DEFAULT_CALENDAR_NAME: &str = "Prioritize";
static DEFAULT_OUTPUT: &str = CalendarExport::FILENAME;

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_EXTRA_DATE_FORMATS
        .iter()
        .map(|f| f.to_string())
        .collect()
}

/// Configuration at ~/.config/prioritize/config.toml
///
/// Every field is optional in the file; a missing file means defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PrioritizeConfig {
    /// Name written to the exported calendar (X-WR-CALNAME)
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default)]
    pub sort: SortOrder,

    /// Due-date formats tried after `Month DD, YYYY`
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,

    /// Course calendar feeds (URLs or paths) always included
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<String>,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PrioritizeConfig {
    fn default() -> Self {
        PrioritizeConfig {
            calendar_name: default_calendar_name(),
            sort: SortOrder::default(),
            date_formats: default_date_formats(),
            feeds: Vec::new(),
            output: default_output(),
        }
    }
}

impl PrioritizeConfig {
    pub fn config_path() -> ScheduleResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ScheduleError::Config("Could not determine config directory".into()))?
            .join("prioritize");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> ScheduleResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> ScheduleResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ScheduleError::Config(format!("Could not read config file: {e}")))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ScheduleResult<Self> {
        toml::from_str(content)
            .map_err(|e| ScheduleError::Config(format!("Invalid config file: {e}")))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ScheduleResult<()> {
        let formats = DEFAULT_EXTRA_DATE_FORMATS
            .iter()
            .map(|f| format!("\"{}\"", f))
            .collect::<Vec<_>>()
            .join(", ");

        let contents = format!(
            "\
# prioritize configuration

# Name of the exported calendar:
# calendar_name = \"{DEFAULT_CALENDAR_NAME}\"

# Event order: \"producer\" (courses, tasks, schedule) or \"chronological\":
# sort = \"producer\"

# Due-date formats accepted after \"Month DD, YYYY\":
# date_formats = [{formats}]

# Course calendar feeds to always include:
# feeds = [\"https://example.instructure.com/feeds/calendars/course_abc.ics\"]

# Where `prioritize export` writes:
# output = \"{DEFAULT_OUTPUT}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ScheduleError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ScheduleError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
