use anyhow::Result;
use agenda_core::AgendaConfig;
use owo_colors::OwoColorize;

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let config = &app.config;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", AgendaConfig::config_path()?.display());
    println!("  Session:    {}", app.session.path().display());

    println!();
    println!("{}", "Settings".bold());
    println!("  Server:     {}", config.base_url);
    println!("  Dialect:    {}", config.dialect);
    println!("  Timeout:    {}s", config.timeout_secs);
    println!("  Sort:       {}", config.default_sort);
    match &config.timezone {
        Some(_) => println!("  Timezone:   {}", app.tz),
        None => println!("  Timezone:   {} {}", app.tz, "(system)".dimmed()),
    }

    if !config.palette.is_empty() {
        let mut keys: Vec<_> = config.palette.iter().collect();
        keys.sort();
        println!();
        println!("{}", "Palette".bold());
        for (key, color) in keys {
            println!("  {:<11} {} {}", key, crate::render::bullet(color), color);
        }
    }

    println!();
    let status = if app.session.is_authenticated() {
        format!(
            "Logged in as {}",
            app.session.email.as_deref().unwrap_or("unknown")
        )
        .green()
        .to_string()
    } else {
        "Not logged in".dimmed().to_string()
    };
    println!("{}", status);

    Ok(())
}
