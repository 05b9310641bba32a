use anyhow::Result;
use owo_colors::OwoColorize;
use tracing::warn;

use crate::app::App;
use crate::prompt::{self, prompt_password};
use crate::utils::tui::with_spinner;

pub async fn register(app: &mut App, name: Option<String>, email: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => prompt::prompt_required("  Name", "")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt::prompt_required("  Email", "")?,
    };
    let password = prompt_password("Password")?;
    let confirmation = prompt_password("Repeat password")?;
    if password != confirmation {
        anyhow::bail!("Passwords do not match");
    }

    let client = app.client()?;
    let token = with_spinner(
        "Creating account...",
        client.register(&name, &email, &password),
    )
    .await?;

    match token {
        Some(token) => {
            let display = token.name.clone().or(Some(name));
            app.session.start(token.token, email.trim(), display)?;
            println!("{}", format!("  Registered and logged in as {}", email.trim()).green());
        }
        None => {
            println!("{}", "  Registered. Run `agenda login` to continue.".green());
        }
    }
    Ok(())
}

pub async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt::prompt_required("  Email", app.session.email.as_deref().unwrap_or(""))?,
    };
    let password = prompt_password("Password")?;

    let client = app.client()?;
    let token = with_spinner("Logging in...", client.login(&email, &password)).await?;

    app.session.start(token.token, email.trim(), token.name)?;

    let who = app.session.name.as_deref().unwrap_or(email.trim());
    println!("{}", format!("  Logged in as {}", who).green());
    Ok(())
}

/// Tell the server, then forget the token even if the server call failed.
pub async fn logout(app: &mut App) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("{}", "  Not logged in".dimmed());
        return Ok(());
    }

    let client = app.client()?;
    if let Err(e) = with_spinner("Logging out...", client.logout()).await {
        warn!(error = %e, "Server logout failed, clearing the local session anyway");
    }

    app.session.clear()?;
    println!("{}", "  Logged out".green());
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    let session = &app.session;
    if !session.is_authenticated() {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    }

    let email = session.email.as_deref().unwrap_or("unknown");
    match &session.name {
        Some(name) => println!("{} {}", name.bold(), format!("<{}>", email).dimmed()),
        None => println!("{}", email.bold()),
    }
    if let Some(at) = session.logged_in_at {
        println!(
            "{}",
            format!("Logged in {}", prompt::format_local(at, app.tz)).dimmed()
        );
    }
    println!("{}", format!("Server: {}", app.config.base_url).dimmed());
    Ok(())
}
