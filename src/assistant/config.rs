use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::ais::asst::AsstSpec;
use crate::ais::run::PollConfig;
use crate::utils::files::{expand_paths, load_from_toml, read_to_string};
use crate::{Error, Result};

const ASSISTANT_TOML: &str = "assistant.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub instructions_file: Option<String>,
    #[serde(default)]
    pub knowledge_files: Vec<String>,
    #[serde(default)]
    pub auto_approve: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub poll: PollSection,
    #[serde(default)]
    pub maintenance: Maintenance,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollSection {
    pub interval_ms: u64,
    pub backoff: f64,
    pub max_interval_ms: u64,
    /// `0` disables the timeout.
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Maintenance {
    pub delete_assistants: Vec<String>,
    pub delete_all_files: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for PollSection {
    fn default() -> Self {
        let poll = PollConfig::default();
        Self {
            interval_ms: poll.interval.as_millis() as u64,
            backoff: poll.backoff,
            max_interval_ms: poll.max_interval.as_millis() as u64,
            timeout_secs: poll.timeout.map(|t| t.as_secs()).unwrap_or(0),
        }
    }
}

impl Config {
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        load_from_toml(dir.join(ASSISTANT_TOML))
    }

    /// Builds the desired assistant state. Paths are relative to `dir`.
    pub fn to_spec(&self, dir: &Path) -> Result<AsstSpec> {
        Ok(AsstSpec {
            name: self.name.clone(),
            instructions: self.instructions(dir)?,
            model: self.model.clone(),
            knowledge_files: expand_paths(dir, &self.knowledge_files)?,
            auto_approve: self.auto_approve,
        })
    }

    fn instructions(&self, dir: &Path) -> Result<String> {
        match (&self.instructions_file, &self.instructions) {
            (Some(file), inline) => {
                if inline.is_some() {
                    warn!(file = %file, "both instructions and instructions_file set, using the file");
                }
                read_to_string(&dir.join(file))
            }
            (None, Some(inline)) => Ok(inline.clone()),
            (None, None) => Err(format!("No instructions for assistant '{}'", self.name).into()),
        }
    }
}

// region --- Froms

impl TryFrom<&PollSection> for PollConfig {
    type Error = Error;

    fn try_from(poll: &PollSection) -> Result<Self> {
        if poll.interval_ms == 0 || poll.max_interval_ms == 0 {
            return Err("poll.interval_ms and poll.max_interval_ms must be greater than 0".into());
        }

        Ok(Self {
            interval: Duration::from_millis(poll.interval_ms),
            backoff: poll.backoff,
            max_interval: Duration::from_millis(poll.max_interval_ms),
            timeout: (poll.timeout_secs > 0).then(|| Duration::from_secs(poll.timeout_secs)),
        })
    }
}

// endregion --- Froms
