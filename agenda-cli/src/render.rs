//! Terminal rendering for agenda types using owo_colors.

use agenda_core::{
    AgendaView, Contact, Event, Friend, FriendRequest, FriendRequestStatus, Itinerary, Palette,
    Visibility,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Contact {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.name.bold(), format!("<{}>", self.email).dimmed());
        if let Some(phone) = &self.phone {
            line.push_str(&format!("  {}", phone));
        }
        if let Some(notes) = &self.notes {
            line.push_str(&format!("  {}", notes.dimmed()));
        }
        with_id(&self.id, line)
    }
}

impl Render for Friend {
    fn render(&self) -> String {
        let mut line = format!("{} {}", self.name.bold(), format!("<{}>", self.email).dimmed());
        if let Some(description) = &self.description {
            line.push_str(&format!("  {}", description.dimmed()));
        }
        if let Some(phone) = &self.phone {
            line.push_str(&format!("  {}", phone));
        }
        with_id(&self.id, line)
    }
}

impl Render for FriendRequest {
    fn render(&self) -> String {
        let who = self
            .sender_name
            .as_deref()
            .or(self.sender_email.as_deref())
            .or(self.recipient_name.as_deref())
            .or(self.recipient_email.as_deref())
            .unwrap_or("unknown");

        let status = match self.status {
            FriendRequestStatus::Pending => self.status.to_string().yellow().to_string(),
            FriendRequestStatus::Accepted => self.status.to_string().green().to_string(),
            FriendRequestStatus::Rejected => self.status.to_string().red().to_string(),
        };

        let mut line = format!("{} [{}]", who.bold(), status);
        if let Some(description) = &self.description {
            line.push_str(&format!("  \"{}\"", description));
        }
        with_id(&self.id, line)
    }
}

impl Render for Visibility {
    fn render(&self) -> String {
        match self {
            Visibility::Private => "private".dimmed().to_string(),
            Visibility::FriendsOnly => "friends".cyan().to_string(),
            Visibility::Public => "public".green().to_string(),
        }
    }
}

fn with_id(id: &Option<agenda_core::EntityId>, line: String) -> String {
    match id {
        Some(id) => format!("{} {}", format!("#{:<4}", id.to_string()).dimmed(), line),
        None => format!("{:6}{}", "", line),
    }
}

/// Coloured dot for a `#rrggbb` colour. Falls back to an uncoloured dot.
pub fn bullet(color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => "●".truecolor(r, g, b).to_string(),
        None => "●".to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Start and end in the user's zone, e.g. "Fri Mar 1 09:00-10:00".
pub fn format_span(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>, tz: Tz) -> String {
    let Some(start) = start else {
        return "no date".to_string();
    };
    let start = start.with_timezone(&tz);
    let mut out = start.format("%a %b %-d %H:%M").to_string();

    if let Some(end) = end {
        let end = end.with_timezone(&tz);
        if end.date_naive() == start.date_naive() {
            out.push_str(&end.format("-%H:%M").to_string());
        } else {
            out.push_str(&end.format(" - %a %b %-d %H:%M").to_string());
        }
    }
    out
}

pub fn render_event(event: &Event, color: &str, tz: Tz) -> String {
    let mut line = format!(
        "{} {} {}",
        bullet(color),
        format!("{:<22}", format_span(event.start_time, event.end_time, tz)).dimmed(),
        event.title
    );
    if let Some(category) = &event.category {
        line.push_str(&format!(" {}", format!("[{}]", category).dimmed()));
    }
    if event.visibility != Visibility::Private {
        line.push_str(&format!(" {}", event.visibility.render()));
    }
    with_id(&event.id, line)
}

pub fn render_itinerary(itinerary: &Itinerary, tz: Tz) -> String {
    let mut line = format!(
        "{} {}",
        itinerary.title.bold(),
        format_span(itinerary.start_time, itinerary.end_time, tz).dimmed()
    );
    if !itinerary.location.is_empty() {
        line.push_str(&format!("  @ {}", itinerary.location));
    }
    if let Some(category) = &itinerary.category {
        line.push_str(&format!(" {}", format!("[{}]", category).dimmed()));
    }
    line.push_str(&format!(
        " {}",
        format!("({} events)", itinerary.event_ids.len()).dimmed()
    ));
    with_id(&itinerary.id, line)
}

/// Itinerary groups first, then standalone events.
pub fn render_view(view: &AgendaView, palette: &Palette, tz: Tz) -> String {
    if view.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let mut lines = Vec::new();

    for group in &view.grouped {
        lines.push(render_itinerary(&group.itinerary, tz));
        for event in &group.events {
            lines.push(format!("   {}", render_event(event, palette.color_for(event, true), tz)));
        }
        lines.push(String::new());
    }

    if !view.standalone.is_empty() {
        if !view.grouped.is_empty() {
            lines.push("Other events".bold().to_string());
        }
        for event in &view.standalone {
            lines.push(render_event(event, palette.color_for(event, false), tz));
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(parse_hex("#1e88e5"), Some((0x1e, 0x88, 0xe5)));
        assert_eq!(parse_hex("1e88e5"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn span_in_local_zone() {
        let tz: Tz = "Europe/Lisbon".parse().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap();

        assert_eq!(format_span(Some(start), Some(end), tz), "Mon Jul 1 09:00-10:30");
        assert_eq!(format_span(None, None, tz), "no date");
    }
}
