//! Persisted login session.
//!
//! Stored as TOML at the configured session file (by default
//! ~/.config/agenda/session.toml). The session is owned by the caller and
//! handed to [`crate::remote::Client::new`]; nothing reads it implicitly.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    path: PathBuf,
}

impl Session {
    /// Load the session at `path`. A missing file is an empty session.
    pub fn load(path: &Path) -> AgendaResult<Self> {
        if !path.exists() {
            return Ok(Session {
                path: path.to_path_buf(),
                ..Default::default()
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AgendaError::Session(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut session: Session = toml::from_str(&contents).map_err(|e| {
            AgendaError::Session(format!("Failed to parse {}: {e}", path.display()))
        })?;
        session.path = path.to_path_buf();

        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the session after a successful login and persist it.
    pub fn start(
        &mut self,
        token: String,
        email: impl Into<String>,
        name: Option<String>,
    ) -> AgendaResult<()> {
        self.token = Some(token);
        self.email = Some(email.into());
        self.name = name;
        self.logged_in_at = Some(Utc::now());
        self.save()
    }

    pub fn save(&self) -> AgendaResult<()> {
        let path = &self.path;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Session(format!(
                    "Failed to create session directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| AgendaError::Session(format!("Failed to serialize session: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            AgendaError::Session(format!("Failed to write {}: {e}", path.display()))
        })?;

        // Owner-only, the file holds a bearer token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Forget the token in memory and on disk.
    pub fn clear(&mut self) -> AgendaResult<()> {
        self.token = None;
        self.email = None;
        self.name = None;
        self.logged_in_at = None;

        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AgendaError::Session(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}
