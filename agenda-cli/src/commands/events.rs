use anyhow::{Context, Result};
use agenda_core::{
    Category, DateRange, Dialog, EntityId, Event, EventDraft, ViewOptions, build_view, link_events,
};
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use tracing::info;

use super::{edit_draft, parse_id, parse_range, run_delete, run_form};
use crate::app::App;
use crate::prompt::{self, apply_duration, parse_end, parse_when};
use crate::render::render_view;
use crate::utils::tui::with_spinner;
use crate::{EventArgs, RangeArgs};

pub async fn list(
    app: &App,
    range: &RangeArgs,
    filter: Option<String>,
    sort: Option<String>,
    json: bool,
) -> Result<()> {
    let range = parse_range(range)?;
    if range.is_unbounded() {
        info!("No date range given, the server picks its default window");
    }
    let sort = match sort {
        Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => app.config.default_sort,
    };
    let client = app.client()?;

    let (events, itineraries) = with_spinner("Loading agenda...", async {
        let events = client.list_events(&range).await?;
        let itineraries = client.list_itineraries(&range).await?;
        Ok::<_, agenda_core::AgendaError>((events, itineraries))
    })
    .await?;

    let index = link_events(&itineraries);
    let options = ViewOptions {
        filter: filter.map(|f| f.trim().to_string()).unwrap_or_default(),
        sort,
    };
    let view = build_view(&events, &itineraries, &index, &options, &app.palette);

    if json {
        let out = serde_json::to_string_pretty(&view).context("Failed to serialize agenda")?;
        println!("{}", out);
    } else {
        println!("{}", render_view(&view, &app.palette, app.tz));
    }
    Ok(())
}

pub async fn new(app: &App, args: EventArgs) -> Result<()> {
    let interactive = args.title.is_none() || args.start.is_none();

    let mut draft = EventDraft::default();
    apply_args(&mut draft, &args, app.tz)?;

    let client = app.client()?;
    let mut dialog = Dialog::new();
    dialog.open_create()?;

    let tz = app.tz;
    let event = run_form(
        &mut dialog,
        &mut draft,
        interactive,
        |d| fill_form(d, tz),
        |d| {
            let client = &client;
            async move { client.create_event(&d).await }
        },
        |_| true,
    )
    .await?;

    if interactive {
        println!();
    }
    println!("{}", format!("  Created: {}", event.title).green());
    Ok(())
}

pub async fn edit(app: &App, id: &str, args: EventArgs) -> Result<()> {
    let id = parse_id(id);
    let interactive = args.is_empty();
    let client = app.client()?;

    let existing = with_spinner("Loading event...", find_event(&client, &id)).await?;
    let mut draft = edit_draft(existing.as_ref(), interactive, "event", &id, |e| {
        EventDraft::from(e)
    })?;
    apply_args(&mut draft, &args, app.tz)?;

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let tz = app.tz;
    let event = run_form(
        &mut dialog,
        &mut draft,
        interactive,
        |d| fill_form(d, tz),
        |d| {
            let (client, id) = (&client, &id);
            async move { client.update_event(id, &d).await }
        },
        |_| true,
    )
    .await?;

    println!("{}", format!("  Updated: {}", event.title).green());
    Ok(())
}

pub async fn delete(app: &App, id: &str, force: bool) -> Result<()> {
    let id = parse_id(id);
    let client = app.client()?;

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let deleted = run_delete(&mut dialog, &format!("event #{}", id), force, |id| {
        let client = &client;
        async move { client.delete_event(&id).await }
    })
    .await?;

    if deleted {
        println!("{}", format!("  Deleted event #{}", id).green());
    }
    Ok(())
}

pub async fn share(app: &App, id: &str, friend: &str) -> Result<()> {
    let (event_id, friend_id) = (parse_id(id), parse_id(friend));
    let client = app.client()?;

    with_spinner("Sharing...", client.share_event(&event_id, &friend_id)).await?;

    println!(
        "{}",
        format!("  Shared event #{} with friend #{}", event_id, friend_id).green()
    );
    Ok(())
}

pub async fn friend(app: &App, friend_id: &str, range: &RangeArgs) -> Result<()> {
    let friend_id = parse_id(friend_id);
    let range = parse_range(range)?;
    let client = app.client()?;

    let events = with_spinner("Loading events...", client.friend_events(&friend_id, &range)).await?;

    let options = ViewOptions {
        sort: app.config.default_sort,
        ..Default::default()
    };
    let view = build_view(&events, &[], &Default::default(), &options, &app.palette);

    println!("{}", render_view(&view, &app.palette, app.tz));
    Ok(())
}

impl EventArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.duration.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.visibility.is_none()
    }
}

async fn find_event(
    client: &agenda_core::Client,
    id: &EntityId,
) -> agenda_core::AgendaResult<Option<Event>> {
    let events = client.list_events(&DateRange::default()).await?;
    Ok(events.into_iter().find(|e| e.id.as_ref() == Some(id)))
}

/// Copy command-line fields onto the draft.
fn apply_args(draft: &mut EventDraft, args: &EventArgs, tz: Tz) -> Result<()> {
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
    if let Some(duration) = &args.duration {
        let start = draft
            .start
            .ok_or_else(|| anyhow::anyhow!("--duration needs a start time"))?;
        draft.end = Some(apply_duration(start, duration)?);
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
    Ok(())
}

/// Interactive event form; current draft values are the defaults.
pub fn fill_form(draft: &mut EventDraft, tz: Tz) -> Result<()> {
    draft.title = prompt::prompt_required("  Title", &draft.title)?;

    let start = prompt::prompt_start(draft.start, tz)?;
    draft.start = Some(start);
    draft.end = prompt::prompt_end(start, draft.end, tz)?;

    draft.description = prompt::prompt_text("  Description (skip)", &draft.description)?;
    draft.category = prompt::select_category(&Category::EVENT, draft.category.as_ref())?;
    draft.visibility = Some(prompt::select_visibility(
        draft.visibility.unwrap_or_default(),
    )?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::Visibility;
    use chrono::{TimeZone, Utc};

    #[test]
    fn args_fill_the_draft() {
        let args = EventArgs {
            title: Some("Standup".into()),
            start: Some("2024-03-01 09:00".into()),
            duration: Some("15m".into()),
            category: Some("meeting".into()),
            visibility: Some("public".into()),
            ..Default::default()
        };
        let mut draft = EventDraft::default();
        apply_args(&mut draft, &args, Tz::UTC).unwrap();

        assert_eq!(draft.title, "Standup");
        assert_eq!(draft.start, Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
        assert_eq!(draft.end, Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap()));
        assert_eq!(draft.category, Some(Category::Meeting));
        assert_eq!(draft.visibility, Some(Visibility::Public));
    }

    #[test]
    fn duration_without_start_is_an_error() {
        let args = EventArgs {
            duration: Some("1h".into()),
            ..Default::default()
        };
        assert!(apply_args(&mut EventDraft::default(), &args, Tz::UTC).is_err());
    }

    #[test]
    fn edit_with_no_flags_is_interactive() {
        assert!(EventArgs::default().is_empty());
        let args = EventArgs {
            title: Some("x".into()),
            ..Default::default()
        };
        assert!(!args.is_empty());
    }
}
