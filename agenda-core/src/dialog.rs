//! Create/edit dialog state machine shared by event and itinerary forms.
//!
//! ```text
//! Closed -> Open -> Submitting -> Closed         (success)
//!                   Submitting -> Open + error   (failure)
//! Open(edit) -> Deleting -> Closed | Open(edit) + error
//! ```

use thiserror::Error;

use crate::event::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open {
        mode: DialogMode,
        /// Inline error from the last failed request.
        error: Option<String>,
    },
    Submitting {
        mode: DialogMode,
    },
    Deleting {
        id: EntityId,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    #[error("Dialog is not open")]
    NotOpen,

    #[error("A request is already in progress")]
    Busy,

    #[error("Only existing records can be deleted")]
    NotEditing,
}

#[derive(Debug, Clone, Default)]
pub struct Dialog {
    state: DialogState,
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn open_create(&mut self) -> Result<(), DialogError> {
        self.open(DialogMode::Create)
    }

    pub fn open_edit(&mut self, id: EntityId) -> Result<(), DialogError> {
        self.open(DialogMode::Edit(id))
    }

    fn open(&mut self, mode: DialogMode) -> Result<(), DialogError> {
        if self.is_busy() {
            return Err(DialogError::Busy);
        }
        self.state = DialogState::Open { mode, error: None };
        Ok(())
    }

    /// Start a save. Refused while another request is outstanding.
    pub fn begin_submit(&mut self) -> Result<DialogMode, DialogError> {
        let mode = match &self.state {
            DialogState::Open { mode, .. } => mode.clone(),
            DialogState::Closed => return Err(DialogError::NotOpen),
            _ => return Err(DialogError::Busy),
        };
        self.state = DialogState::Submitting { mode: mode.clone() };
        Ok(mode)
    }

    /// Close on success, or reopen with the error message.
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        let DialogState::Submitting { mode } = &self.state else {
            return;
        };
        let mode = mode.clone();
        self.state = match result {
            Ok(()) => DialogState::Closed,
            Err(error) => DialogState::Open {
                mode,
                error: Some(error),
            },
        };
    }

    pub fn begin_delete(&mut self) -> Result<EntityId, DialogError> {
        let id = match &self.state {
            DialogState::Open {
                mode: DialogMode::Edit(id),
                ..
            } => id.clone(),
            DialogState::Open { .. } => return Err(DialogError::NotEditing),
            DialogState::Closed => return Err(DialogError::NotOpen),
            _ => return Err(DialogError::Busy),
        };
        self.state = DialogState::Deleting { id: id.clone() };
        Ok(id)
    }

    pub fn finish_delete(&mut self, result: Result<(), String>) {
        let DialogState::Deleting { id } = &self.state else {
            return;
        };
        let id = id.clone();
        self.state = match result {
            Ok(()) => DialogState::Closed,
            Err(error) => DialogState::Open {
                mode: DialogMode::Edit(id),
                error: Some(error),
            },
        };
    }

    pub fn close(&mut self) -> Result<(), DialogError> {
        if self.is_busy() {
            return Err(DialogError::Busy);
        }
        self.state = DialogState::Closed;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            DialogState::Submitting { .. } | DialogState::Deleting { .. }
        )
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            DialogState::Open { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<&DialogMode> {
        match &self.state {
            DialogState::Open { mode, .. } | DialogState::Submitting { mode } => Some(mode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_submit_success_closes() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        assert_eq!(dialog.begin_submit(), Ok(DialogMode::Create));
        assert!(dialog.is_busy());

        dialog.finish_submit(Ok(()));
        assert_eq!(dialog.state(), &DialogState::Closed);
    }

    #[test]
    fn failure_returns_to_form_with_error() {
        let mut dialog = Dialog::new();
        dialog.open_edit(EntityId::from(4)).unwrap();
        dialog.begin_submit().unwrap();
        dialog.finish_submit(Err("Title is required".into()));

        assert!(dialog.is_open());
        assert_eq!(dialog.error(), Some("Title is required"));
        assert_eq!(dialog.mode(), Some(&DialogMode::Edit(EntityId::from(4))));

        // A retry clears the error.
        dialog.begin_submit().unwrap();
        assert_eq!(dialog.error(), None);
    }

    #[test]
    fn no_duplicate_submission() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        dialog.begin_submit().unwrap();

        assert_eq!(dialog.begin_submit(), Err(DialogError::Busy));
        assert_eq!(dialog.close(), Err(DialogError::Busy));
        assert_eq!(dialog.open_create(), Err(DialogError::Busy));
    }

    #[test]
    fn submit_requires_open_dialog() {
        let mut dialog = Dialog::new();
        assert_eq!(dialog.begin_submit(), Err(DialogError::NotOpen));
        assert_eq!(dialog.begin_delete(), Err(DialogError::NotOpen));
    }

    #[test]
    fn delete_only_in_edit_mode() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        assert_eq!(dialog.begin_delete(), Err(DialogError::NotEditing));

        dialog.open_edit(EntityId::from(9)).unwrap();
        assert_eq!(dialog.begin_delete(), Ok(EntityId::from(9)));
        assert_eq!(dialog.begin_submit(), Err(DialogError::Busy));

        dialog.finish_delete(Err("not found".into()));
        assert_eq!(dialog.error(), Some("not found"));

        dialog.begin_delete().unwrap();
        dialog.finish_delete(Ok(()));
        assert_eq!(dialog.state(), &DialogState::Closed);
    }

    #[test]
    fn finishing_in_the_wrong_state_is_ignored() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        dialog.finish_submit(Ok(()));
        dialog.finish_delete(Ok(()));
        assert!(dialog.is_open());
    }
}
