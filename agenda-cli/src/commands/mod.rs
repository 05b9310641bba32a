pub mod auth;
pub mod config;
pub mod contacts;
pub mod events;
pub mod friends;
pub mod itineraries;

use std::future::Future;

use anyhow::Result;
use agenda_core::{AgendaError, AgendaResult, DateRange, Dialog, EntityId};
use owo_colors::OwoColorize;
use tracing::info;

use crate::RangeArgs;
use crate::utils::tui::with_spinner;

pub fn parse_id(id: &str) -> EntityId {
    EntityId::from(id)
}

pub fn parse_range(args: &RangeArgs) -> Result<DateRange> {
    match &args.month {
        Some(month) => Ok(DateRange::month(month)?),
        None => Ok(DateRange::from_args(args.from.as_deref(), args.to.as_deref())?),
    }
}

/// Starting draft for an edit.
///
/// The stored record when it was found. Otherwise an interactive edit starts
/// from an empty form, and a flag-driven edit fails rather than overwrite the
/// record with defaults.
pub fn edit_draft<R, D, F>(
    found: Option<&R>,
    interactive: bool,
    what: &str,
    id: &EntityId,
    to_draft: F,
) -> Result<D>
where
    D: Default,
    F: FnOnce(&R) -> D,
{
    match found {
        Some(record) => Ok(to_draft(record)),
        None if interactive => {
            info!(%id, "No {} found, starting from an empty form", what);
            Ok(D::default())
        }
        None => anyhow::bail!("No {} with id {} in the current listing", what, id),
    }
}

/// Submit a form through `dialog` until it succeeds.
///
/// Interactive forms call `edit` before every attempt, so a failed submit
/// shows its error and returns to the form with the previous answers.
/// Non-interactive forms, and errors `retryable` refuses, fail straight away.
pub async fn run_form<D, T, E, S, Fut>(
    dialog: &mut Dialog,
    draft: &mut D,
    interactive: bool,
    mut edit: E,
    submit: S,
    retryable: impl Fn(&AgendaError) -> bool,
) -> Result<T>
where
    D: Clone,
    E: FnMut(&mut D) -> Result<()>,
    S: Fn(D) -> Fut,
    Fut: Future<Output = AgendaResult<T>>,
{
    loop {
        if interactive {
            if let Some(error) = dialog.error() {
                eprintln!("  {}", error.red());
            }
            edit(draft)?;
        }

        dialog.begin_submit()?;
        let result = with_spinner("Saving...", submit(draft.clone())).await;

        match result {
            Ok(saved) => {
                dialog.finish_submit(Ok(()));
                return Ok(saved);
            }
            Err(e) => {
                dialog.finish_submit(Err(e.to_string()));
                if !interactive || !retryable(&e) {
                    return Err(e.into());
                }
            }
        }
    }
}

/// Delete through `dialog`, asking first unless `force`.
pub async fn run_delete<S, Fut>(dialog: &mut Dialog, what: &str, force: bool, delete: S) -> Result<bool>
where
    S: FnOnce(EntityId) -> Fut,
    Fut: Future<Output = AgendaResult<()>>,
{
    if !force && !crate::prompt::confirm(&format!("Delete {}?", what))? {
        dialog.close()?;
        return Ok(false);
    }

    let id = dialog.begin_delete()?;
    let result = with_spinner("Deleting...", delete(id)).await;

    match result {
        Ok(()) => {
            dialog.finish_delete(Ok(()));
            Ok(true)
        }
        Err(e) => {
            dialog.finish_delete(Err(e.to_string()));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::{ValidationError, ValidationErrors};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn flag_edit_of_unknown_record_fails() {
        let id = EntityId::from(42);
        let found: Option<&String> = None;
        let result = edit_draft(found, false, "event", &id, |s: &String| s.clone());
        assert!(result.is_err());
    }

    #[test]
    fn interactive_edit_of_unknown_record_starts_empty() {
        let id = EntityId::from(42);
        let found: Option<&String> = None;
        let draft = edit_draft(found, true, "event", &id, |s: &String| s.clone()).unwrap();
        assert_eq!(draft, "");
    }

    #[test]
    fn found_record_seeds_the_draft() {
        let id = EntityId::from(1);
        let stored = "Standup".to_string();
        let draft = edit_draft(Some(&stored), false, "event", &id, |s: &String| s.len()).unwrap();
        assert_eq!(draft, 7);
    }

    #[tokio::test]
    async fn refused_errors_end_an_interactive_form() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        let edits = AtomicUsize::new(0);
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = run_form(
            &mut dialog,
            &mut (),
            true,
            |_| {
                edits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |_| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(AgendaError::Http {
                        status: 500,
                        message: "boom".into(),
                    })
                }
            },
            |_| false,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(edits.load(Ordering::SeqCst), 1);
        assert!(dialog.is_open());
        assert!(dialog.error().is_some_and(|e| e.contains("boom")));
    }

    #[tokio::test]
    async fn retryable_errors_return_to_the_form() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        let attempts = AtomicUsize::new(0);

        let result = run_form(
            &mut dialog,
            &mut (),
            true,
            |_| Ok(()),
            |_| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(AgendaError::Validation(ValidationErrors(vec![
                            ValidationError::MissingTitle,
                        ])))
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result.unwrap(), 1);
        assert!(!dialog.is_open());
    }
}
