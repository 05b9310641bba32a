//! Top-level context shared by every command.

use anyhow::{Context, Result};
use agenda_core::{AgendaConfig, Client, Palette, Session};
use chrono_tz::Tz;
use tracing::{debug, warn};

pub struct App {
    pub config: AgendaConfig,
    pub session: Session,
    pub tz: Tz,
    pub palette: Palette,
}

impl App {
    pub fn load() -> Result<Self> {
        let config = AgendaConfig::load().context("Failed to load configuration")?;
        let session_path = config.session_path()?;
        let session = Session::load(&session_path)?;
        let tz = resolve_timezone(config.timezone.as_deref())?;
        let palette = config.palette();

        debug!(base_url = %config.base_url, dialect = %config.dialect, %tz, "Loaded configuration");

        Ok(App {
            config,
            session,
            tz,
            palette,
        })
    }

    /// Client carrying the current session token.
    pub fn client(&self) -> Result<Client> {
        Ok(Client::new(&self.config, &self.session)?)
    }
}

/// Configured zone, else the system zone, else UTC.
pub fn resolve_timezone(configured: Option<&str>) -> Result<Tz> {
    if let Some(name) = configured {
        return name
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown timezone in config: '{}'", name));
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => Ok(name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(zone = %name, "Unrecognised system timezone, using UTC");
            Tz::UTC
        })),
        Err(e) => {
            warn!(error = %e, "Could not determine system timezone, using UTC");
            Ok(Tz::UTC)
        }
    }
}
