//! Client configuration.
//!
//! Read from ~/.config/agenda/config.toml, with `AGENDA_*` environment
//! variables layered on top (e.g. `AGENDA_BASE_URL`, `AGENDA_DIALECT`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{AgendaError, AgendaResult};
use crate::view::{Palette, SortKey};

static DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub dialect: Dialect,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub default_sort: SortKey,

    /// IANA zone used to read and show local times. Defaults to the system zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_file: Option<String>,

    /// Colour overrides keyed by category, `itinerary` or `default`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub palette: HashMap<String, String>,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            base_url: default_base_url(),
            dialect: Dialect::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_sort: SortKey::default(),
            timezone: None,
            session_file: None,
            palette: HashMap::new(),
        }
    }
}

impl AgendaConfig {
    pub fn config_dir() -> AgendaResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda"))
    }

    pub fn config_path() -> AgendaResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the global config, creating a commented default file on first run.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        let config: AgendaConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("AGENDA"))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AgendaResult<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| AgendaError::Config(format!("Invalid base_url '{}': {e}", self.base_url)))?;

        if self.timeout_secs == 0 {
            return Err(AgendaError::Config("timeout_secs must be positive".into()));
        }

        Ok(())
    }

    /// Session file path with `~` expanded.
    pub fn session_path(&self) -> AgendaResult<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => Ok(Self::config_dir()?.join("session.toml")),
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::with_overrides(&self.palette)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Backend API root:
# base_url = \"{}\"

# Backend variant, \"spring\" or \"laravel\":
# dialect = \"spring\"

# Request timeout in seconds:
# timeout_secs = {}

# Default ordering for listings, \"start\" or \"title\":
# default_sort = \"start\"

# Time zone for reading and showing times (defaults to the system zone):
# timezone = \"Europe/Lisbon\"

# Where the login session is stored:
# session_file = \"~/.config/agenda/session.toml\"

# Colour overrides:
# [palette]
# work = \"#1e88e5\"
# itinerary = \"#3949ab\"
",
            DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
