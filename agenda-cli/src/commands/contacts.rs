use anyhow::Result;
use agenda_core::{Client, Contact, ContactDraft, Dialog, EntityId};
use owo_colors::OwoColorize;

use super::{edit_draft, parse_id, run_delete, run_form};
use crate::ContactArgs;
use crate::app::App;
use crate::prompt;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub async fn list(app: &App) -> Result<()> {
    let client = app.client()?;
    let mut contacts = with_spinner("Loading contacts...", client.list_contacts()).await?;

    if contacts.is_empty() {
        println!("{}", "No contacts yet".dimmed());
        return Ok(());
    }

    contacts.sort_by_key(|c| c.name.to_lowercase());
    for contact in &contacts {
        println!("{}", contact.render());
    }
    Ok(())
}

pub async fn add(app: &App, args: ContactArgs) -> Result<()> {
    let interactive = args.name.is_none() || args.email.is_none();

    let mut draft = ContactDraft::default();
    apply_args(&mut draft, &args);

    let client = app.client()?;
    let mut dialog = Dialog::new();
    dialog.open_create()?;

    let contact = run_form(
        &mut dialog,
        &mut draft,
        interactive,
        fill_form,
        |d| {
            let client = &client;
            async move { client.create_contact(&d).await }
        },
        |_| true,
    )
    .await?;

    println!("{}", format!("  Added {}", contact.name).green());
    Ok(())
}

pub async fn edit(app: &App, id: &str, args: ContactArgs) -> Result<()> {
    let id = parse_id(id);
    let interactive = args.is_empty();
    let client = app.client()?;

    let existing = with_spinner("Loading contact...", find_contact(&client, &id)).await?;
    let mut draft = edit_draft(existing.as_ref(), interactive, "contact", &id, |c| {
        ContactDraft::from(c)
    })?;
    apply_args(&mut draft, &args);

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let contact = run_form(
        &mut dialog,
        &mut draft,
        interactive,
        fill_form,
        |d| {
            let (client, id) = (&client, &id);
            async move { client.update_contact(id, &d).await }
        },
        |_| true,
    )
    .await?;

    println!("{}", format!("  Updated {}", contact.name).green());
    Ok(())
}

pub async fn remove(app: &App, id: &str, force: bool) -> Result<()> {
    let id = parse_id(id);
    let client = app.client()?;

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let deleted = run_delete(&mut dialog, &format!("contact #{}", id), force, |id| {
        let client = &client;
        async move { client.delete_contact(&id).await }
    })
    .await?;

    if deleted {
        println!("{}", format!("  Removed contact #{}", id).green());
    }
    Ok(())
}

impl ContactArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.notes.is_none()
    }
}

async fn find_contact(client: &Client, id: &EntityId) -> agenda_core::AgendaResult<Option<Contact>> {
    let contacts = client.list_contacts().await?;
    Ok(contacts.into_iter().find(|c| c.id.as_ref() == Some(id)))
}

fn apply_args(draft: &mut ContactDraft, args: &ContactArgs) {
    if let Some(name) = &args.name {
        draft.name = name.trim().to_string();
    }
    if let Some(email) = &args.email {
        draft.email = email.trim().to_string();
    }
    if let Some(phone) = &args.phone {
        draft.phone = non_blank(phone);
    }
    if let Some(notes) = &args.notes {
        draft.notes = non_blank(notes);
    }
}

fn fill_form(draft: &mut ContactDraft) -> Result<()> {
    draft.name = prompt::prompt_required("  Name", &draft.name)?;
    draft.email = prompt::prompt_required("  Email", &draft.email)?;

    let phone = prompt::prompt_text("  Phone (skip)", draft.phone.as_deref().unwrap_or(""))?;
    draft.phone = non_blank(&phone);

    let notes = prompt::prompt_text("  Notes (skip)", draft.notes.as_deref().unwrap_or(""))?;
    draft.notes = non_blank(&notes);

    Ok(())
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
