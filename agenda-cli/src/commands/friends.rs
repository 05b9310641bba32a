use anyhow::Result;
use agenda_core::{Dialog, FriendRequest, FriendRequestDraft, FriendResponse, FriendUpdate};
use owo_colors::OwoColorize;

use super::{parse_id, run_delete};
use crate::app::App;
use crate::render::Render;
use crate::utils::tui::with_spinner;

pub async fn list(app: &App) -> Result<()> {
    let client = app.client()?;
    let mut friends = with_spinner("Loading friends...", client.list_friends()).await?;

    if friends.is_empty() {
        println!("{}", "No friends yet".dimmed());
        return Ok(());
    }

    friends.sort_by_key(|f| f.name.to_lowercase());
    for friend in &friends {
        println!("{}", friend.render());
    }
    Ok(())
}

pub async fn pending(app: &App) -> Result<()> {
    let client = app.client()?;
    let requests = with_spinner("Loading requests...", client.pending_requests()).await?;
    print_requests(&requests, "No pending requests");
    Ok(())
}

pub async fn sent(app: &App) -> Result<()> {
    let client = app.client()?;
    let requests = with_spinner("Loading requests...", client.sent_requests()).await?;

    let (accepted, open): (Vec<_>, Vec<_>) = requests
        .into_iter()
        .partition(|r| r.accepted_friend().is_some());

    print_requests(&open, "No open requests");
    if !accepted.is_empty() {
        println!();
        println!("{}", "Accepted".bold());
        for friend in accepted.iter().filter_map(FriendRequest::accepted_friend) {
            println!("{}", friend.render());
        }
    }
    Ok(())
}

fn print_requests(requests: &[FriendRequest], empty: &str) {
    if requests.is_empty() {
        println!("{}", empty.dimmed());
        return;
    }
    for request in requests {
        println!("{}", request.render());
    }
}

pub async fn request(app: &App, email: String, message: Option<String>) -> Result<()> {
    let draft = FriendRequestDraft {
        recipient_email: email,
        description: message.unwrap_or_default(),
    };

    let client = app.client()?;
    with_spinner("Sending request...", client.send_friend_request(&draft)).await?;

    println!(
        "{}",
        format!("  Friend request sent to {}", draft.recipient_email.trim()).green()
    );
    Ok(())
}

pub async fn respond(app: &App, request_id: &str, accept: bool) -> Result<()> {
    let request_id = parse_id(request_id);
    let response = if accept {
        FriendResponse::Accept
    } else {
        FriendResponse::Reject
    };

    let client = app.client()?;
    with_spinner(
        "Answering...",
        client.respond_friend_request(&request_id, response),
    )
    .await?;

    let verb = match response {
        FriendResponse::Accept => "Accepted",
        FriendResponse::Reject => "Rejected",
    };
    println!("{}", format!("  {} request #{}", verb, request_id).green());
    Ok(())
}

pub async fn remove(app: &App, id: &str, force: bool) -> Result<()> {
    let id = parse_id(id);
    let client = app.client()?;

    let mut dialog = Dialog::new();
    dialog.open_edit(id.clone())?;

    let removed = run_delete(&mut dialog, &format!("friend #{}", id), force, |id| {
        let client = &client;
        async move { client.remove_friend(&id).await }
    })
    .await?;

    if removed {
        println!("{}", format!("  Removed friend #{}", id).green());
    }
    Ok(())
}

pub async fn update(
    app: &App,
    id: &str,
    description: Option<String>,
    phone: Option<String>,
) -> Result<()> {
    if description.is_none() && phone.is_none() {
        anyhow::bail!("Nothing to update: pass --description or --phone");
    }

    let id = parse_id(id);
    let update = FriendUpdate {
        description,
        phone: phone.map(|p| p.trim().to_string()),
    };

    let client = app.client()?;
    let friend = with_spinner("Saving...", client.update_friend(&id, &update)).await?;

    match friend {
        Some(friend) => println!("{}", friend.render()),
        None => println!("{}", format!("  Updated friend #{}", id).green()),
    }
    Ok(())
}
