use anyhow::Result;
use agenda_core::{
    AgendaError, Category, Client, DateRange, Dialog, EntityId, EventDraft, Itinerary,
    ItineraryDraft, ItinerarySave, save_itinerary,
};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

use super::{edit_draft, events, parse_id, parse_range, run_delete, run_form};
use crate::app::App;
use crate::prompt::{self, parse_end, parse_when};
use crate::render::render_itinerary;
use crate::utils::tui::with_spinner;
use crate::{ItineraryArgs, RangeArgs};

pub async fn list(app: &App, range: &RangeArgs) -> Result<()> {
    let range = parse_range(range)?;
    let client = app.client()?;

    let mut itineraries =
        with_spinner("Loading itineraries...", client.list_itineraries(&range)).await?;

    if itineraries.is_empty() {
        println!("{}", "No itineraries found".dimmed());
        return Ok(());
    }

    sort_by_start(&mut itineraries);
    for itinerary in &itineraries {
        println!("{}", render_itinerary(itinerary, app.tz));
    }
    Ok(())
}

pub async fn new(app: &App, args: ItineraryArgs) -> Result<()> {
    let interactive = args.title.is_none() || args.start.is_none();

    let mut draft = ItineraryDraft::default();
    apply_args(&mut draft, &args, app.tz)?;

    if interactive {
        fill_form(&mut draft, app.tz)?;
        prompt_members(&mut draft, app.tz)?;
    }

    let client = app.client()?;
    let mut dialog = Dialog::new();
    dialog.open_create()?;

    let saved = submit(&client, &mut dialog, &mut draft, interactive, None, app.tz).await?;

    report(&saved, "Created");
    Ok(())
}

pub async fn edit(app: &App, id: &str, args: ItineraryArgs) -> Result<()> {
    let id = parse_id(id);
    let interactive = args.is_empty();
    let client = app.client()?;

    let existing = with_spinner("Loading itinerary...", find_itinerary(&client, &id)).await?;
    let mut draft = edit_draft(
        existing.as_ref(),
        interactive,
        "itinerary",
        &id,
        |it| ItineraryDraft::from(it),
    )?;
    apply_args(&mut draft, &args, app.tz)?;

    if interactive {
        fill_form(&mut draft, app.tz)?;
        prompt_members(&mut draft, app.tz)?;
    }

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let saved = submit(&client, &mut dialog, &mut draft, interactive, Some(&id), app.tz).await?;

    report(&saved, "Updated");
    Ok(())
}

pub async fn delete(app: &App, id: &str, force: bool) -> Result<()> {
    let id = parse_id(id);
    let client = app.client()?;

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let deleted = run_delete(&mut dialog, &format!("itinerary #{}", id), force, |id| {
        let client = &client;
        async move { client.delete_itinerary(&id).await }
    })
    .await?;

    if deleted {
        println!("{}", format!("  Deleted itinerary #{}", id).green());
    }
    Ok(())
}

/// Start ascending; itineraries without a start go last, as in the event view.
fn sort_by_start(itineraries: &mut [Itinerary]) {
    itineraries.sort_by_key(|it| (it.start_time.is_none(), it.start_time));
}

/// Save through the dialog. The form is shown again only for errors raised
/// before any member event was created.
async fn submit(
    client: &Client,
    dialog: &mut Dialog,
    draft: &mut ItineraryDraft,
    interactive: bool,
    existing: Option<&EntityId>,
    tz: Tz,
) -> Result<ItinerarySave> {
    let has_new_members = !draft.new_events.is_empty();
    let mut first = true;

    run_form(
        dialog,
        draft,
        interactive,
        |d| {
            // The form was already filled once before members were collected.
            if std::mem::take(&mut first) {
                return Ok(());
            }
            fill_form(d, tz)
        },
        |d| async move { save_itinerary(client, &d, existing).await },
        |e| retry_allowed(has_new_members, e),
    )
    .await
}

/// Member events are created before the itinerary itself, so once there are
/// new members only client-side validation errors may be retried.
fn retry_allowed(has_new_members: bool, error: &AgendaError) -> bool {
    !has_new_members || matches!(error, AgendaError::Validation(_))
}

fn report(saved: &ItinerarySave, verb: &str) {
    println!();
    println!(
        "{}",
        format!(
            "  {}: {} ({} events)",
            verb,
            saved.itinerary.title,
            saved.itinerary.event_ids.len()
        )
        .green()
    );
    for event in &saved.created {
        println!("    {} {}", "+".green(), event.title);
    }
    for skipped in &saved.skipped {
        println!(
            "    {} {}: {}",
            "!".yellow(),
            skipped.title,
            skipped.error.yellow()
        );
    }
}

impl ItineraryArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.visibility.is_none()
            && self.event_ids.is_empty()
    }
}

async fn find_itinerary(
    client: &Client,
    id: &EntityId,
) -> agenda_core::AgendaResult<Option<Itinerary>> {
    let itineraries = client.list_itineraries(&DateRange::default()).await?;
    Ok(itineraries.into_iter().find(|it| it.id.as_ref() == Some(id)))
}

fn apply_args(draft: &mut ItineraryDraft, args: &ItineraryArgs, tz: Tz) -> Result<()> {
    if let Some(title) = &args.title {
        draft.title = title.clone();
    }
    if let Some(start) = &args.start {
        draft.start = Some(parse_when(start, tz)?);
    }
    if let Some(end) = &args.end {
        draft.end = Some(match draft.start {
            Some(start) => parse_end(end, start, tz)?,
            None => parse_when(end, tz)?,
        });
    }
    if let Some(location) = &args.location {
        draft.location = location.clone();
    }
    if let Some(description) = &args.description {
        draft.description = description.clone();
    }
    if let Some(category) = &args.category {
        draft.category = Category::parse(category);
    }
    if let Some(visibility) = &args.visibility {
        draft.visibility = Some(visibility.parse().map_err(|e: String| anyhow::anyhow!(e))?);
    }
    for id in &args.event_ids {
        let id = parse_id(id);
        if !draft.event_ids.contains(&id) {
            draft.event_ids.push(id);
        }
    }
    Ok(())
}

fn fill_form(draft: &mut ItineraryDraft, tz: Tz) -> Result<()> {
    draft.title = prompt::prompt_required("  Title", &draft.title)?;

    let start = prompt::prompt_start(draft.start, tz)?;
    draft.start = Some(start);
    draft.end = prompt::prompt_end(start, draft.end, tz)?;

    draft.location = prompt::prompt_text("  Location (skip)", &draft.location)?;
    draft.description = prompt::prompt_text("  Description (skip)", &draft.description)?;
    draft.category = prompt::select_category(&Category::ITINERARY, draft.category.as_ref())?;
    draft.visibility = Some(prompt::select_visibility(
        draft.visibility.unwrap_or_default(),
    )?);

    Ok(())
}

/// Collect new member events until the user declines.
fn prompt_members(draft: &mut ItineraryDraft, tz: Tz) -> Result<()> {
    while prompt::confirm("  Add an event to this itinerary?")? {
        let mut member = EventDraft {
            start: draft.start,
            ..Default::default()
        };
        events::fill_form(&mut member, tz)?;

        if let Err(e) = member.validate() {
            eprintln!("  {}", format!("Not added: {}", e).red());
            continue;
        }
        draft.new_events.push(member);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::{ValidationError, ValidationErrors};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn server_error() -> AgendaError {
        AgendaError::Http {
            status: 500,
            message: "itinerary insert failed".into(),
        }
    }

    fn missing_title() -> AgendaError {
        AgendaError::Validation(ValidationErrors(vec![ValidationError::MissingTitle]))
    }

    #[test]
    fn undated_itineraries_list_last() {
        let at = |d: u32| Some(Utc.with_ymd_and_hms(2024, 7, d, 0, 0, 0).unwrap());
        let mut itineraries = vec![
            Itinerary { title: "Someday".into(), ..Default::default() },
            Itinerary { title: "Porto".into(), start_time: at(9), ..Default::default() },
            Itinerary { title: "Lisbon".into(), start_time: at(1), ..Default::default() },
        ];
        sort_by_start(&mut itineraries);

        let titles: Vec<_> = itineraries.iter().map(|it| it.title.as_str()).collect();
        assert_eq!(titles, ["Lisbon", "Porto", "Someday"]);
    }

    #[test]
    fn only_validation_errors_retry_once_members_exist() {
        assert!(retry_allowed(false, &server_error()));
        assert!(retry_allowed(false, &missing_title()));
        assert!(retry_allowed(true, &missing_title()));
        assert!(!retry_allowed(true, &server_error()));
    }

    #[tokio::test]
    async fn server_failure_after_members_is_not_resubmitted() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        let mut draft = ItineraryDraft {
            new_events: vec![EventDraft::default()],
            ..Default::default()
        };
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = run_form(
            &mut dialog,
            &mut draft,
            true,
            |_| Ok(()),
            |_| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(server_error()) }
            },
            |e| retry_allowed(true, e),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validation_failure_returns_to_the_form() {
        let mut dialog = Dialog::new();
        dialog.open_create().unwrap();
        let mut draft = ItineraryDraft {
            new_events: vec![EventDraft::default()],
            ..Default::default()
        };
        let attempts = AtomicUsize::new(0);

        let result = run_form(
            &mut dialog,
            &mut draft,
            true,
            |_| Ok(()),
            |_| {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move { if n == 0 { Err(missing_title()) } else { Ok(n) } }
            },
            |e| retry_allowed(true, e),
        )
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn args_fill_the_draft_and_attach_ids_once() {
        let args = ItineraryArgs {
            title: Some("Lisbon".into()),
            start: Some("2024-07-01".into()),
            end: Some("2024-07-05".into()),
            location: Some("Portugal".into()),
            category: Some("travel".into()),
            event_ids: vec!["7".into(), "8".into(), "7".into()],
            ..Default::default()
        };
        let mut draft = ItineraryDraft {
            event_ids: vec![EntityId::from("8")],
            ..Default::default()
        };
        apply_args(&mut draft, &args, Tz::UTC).unwrap();

        assert_eq!(draft.title, "Lisbon");
        assert_eq!(draft.start, Some(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()));
        assert_eq!(draft.end, Some(Utc.with_ymd_and_hms(2024, 7, 5, 0, 0, 0).unwrap()));
        assert_eq!(draft.location, "Portugal");
        assert_eq!(draft.category, Some(Category::Travel));
        assert_eq!(draft.event_ids, vec![EntityId::from("8"), EntityId::from("7")]);
    }

    #[test]
    fn attaching_an_event_is_not_an_empty_edit() {
        assert!(ItineraryArgs::default().is_empty());
        let args = ItineraryArgs {
            event_ids: vec!["3".into()],
            ..Default::default()
        };
        assert!(!args.is_empty());
    }
}
