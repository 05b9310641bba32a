//! Interactive prompts and date/time input parsing.
//!
//! Times are typed in the user's zone and converted to UTC before they reach
//! a draft.

use anyhow::{Context, Result};
use agenda_core::{Category, Visibility};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use dialoguer::{Confirm, Input, Select};
use owo_colors::OwoColorize;

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Format shown in prompts; [`parse_when`] reads it back.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(DISPLAY_FORMAT).to_string()
}

/// Prompt until `parse` accepts the input. An empty answer keeps `current`.
pub fn prompt_with_retry<T, F>(prompt: &str, current: Option<String>, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(current) = &current {
            input = input.default(current.clone());
        }
        let answer = input.interact_text()?;

        match parse(answer.trim()) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Free text with a default; an empty answer is allowed.
pub fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .default(current.to_string())
        .show_default(!current.is_empty())
        .allow_empty(true)
        .interact_text()?;
    Ok(answer.trim().to_string())
}

/// Required free text; re-asks while empty.
pub fn prompt_required(prompt: &str, current: &str) -> Result<String> {
    prompt_with_retry(
        prompt,
        (!current.is_empty()).then(|| current.to_string()),
        |s| {
            if s.is_empty() {
                anyhow::bail!("A value is required")
            }
            Ok(s.to_string())
        },
    )
}

pub fn prompt_password(label: &str) -> Result<String> {
    let prompt = format!("  {}: ", label);
    rpassword::prompt_password(&prompt).context("Failed to read password")
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

/// Pick one of `options` or none. A current category outside `options`
/// stays selectable.
pub fn select_category(options: &[Category], current: Option<&Category>) -> Result<Option<Category>> {
    let (choices, default) = category_choices(options, current);

    let mut items: Vec<&str> = vec!["(none)"];
    items.extend(choices.iter().map(Category::as_str));

    let selection = Select::new()
        .with_prompt("  Category")
        .items(&items)
        .default(default)
        .interact()?;

    Ok(selection.checked_sub(1).map(|i| choices[i].clone()))
}

/// Category choices and the index of `current` in the menu, where 0 is "(none)".
fn category_choices(options: &[Category], current: Option<&Category>) -> (Vec<Category>, usize) {
    let mut choices = options.to_vec();
    let Some(current) = current else {
        return (choices, 0);
    };

    let position = match choices.iter().position(|c| c == current) {
        Some(i) => i,
        None => {
            choices.push(current.clone());
            choices.len() - 1
        }
    };
    (choices, position + 1)
}

pub fn select_visibility(current: Visibility) -> Result<Visibility> {
    let items: Vec<&str> = Visibility::ALL.iter().map(Visibility::as_str).collect();
    let default = Visibility::ALL
        .iter()
        .position(|v| *v == current)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("  Visibility")
        .items(&items)
        .default(default)
        .interact()?;

    Ok(Visibility::ALL[selection])
}

/// Prompt for a start time, keeping `current` on an empty answer.
pub fn prompt_start(current: Option<DateTime<Utc>>, tz: Tz) -> Result<DateTime<Utc>> {
    prompt_with_retry("  When?", current.map(|s| format_local(s, tz)), |s| {
        parse_when(s, tz)
    })
}

/// Prompt for an optional end, as a duration after `start` or a time.
pub fn prompt_end(
    start: DateTime<Utc>,
    current: Option<DateTime<Utc>>,
    tz: Tz,
) -> Result<Option<DateTime<Utc>>> {
    let current = current.map(|e| format_local(e, tz)).unwrap_or_default();
    loop {
        let answer = prompt_text("  Until? (duration or time, skip)", &current)?;
        if answer.is_empty() {
            return Ok(None);
        }
        match parse_end(&answer, start, tz) {
            Ok(end) => return Ok(Some(end)),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Parse a start time typed by the user.
///
/// Accepts RFC 3339, `YYYY-MM-DD[ HH:MM]` in `tz`, or natural language
/// ("tomorrow 3pm", "fri noon"). Input without a time means midnight.
pub fn parse_when(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = match parse_naive(input) {
        Some(naive) => naive,
        None => {
            let expanded = expand_abbreviations(input);
            let dt = fuzzydate::parse(&expanded)
                .map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{}\"", input))?;

            if has_time_component(input) {
                dt
            } else {
                dt.date().and_time(chrono::NaiveTime::MIN)
            }
        }
    };

    to_utc(naive, tz)
}

/// Parse an end: a duration after `start` ("45m", "2h") or another date/time.
pub fn parse_end(input: &str, start: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(end) = try_apply_duration(start, input) {
        return Ok(end);
    }

    let cleaned = input
        .strip_prefix("until ")
        .or_else(|| input.strip_prefix("to "))
        .unwrap_or(input);

    parse_when(cleaned, tz)
}

pub fn apply_duration(start: DateTime<Utc>, input: &str) -> Result<DateTime<Utc>> {
    try_apply_duration(start, input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))
}

fn try_apply_duration(start: DateTime<Utc>, input: &str) -> Result<DateTime<Utc>> {
    let std_dur = humantime::parse_duration(input.trim()).map_err(|e| anyhow::anyhow!("{}", e))?;
    let dur = Duration::from_std(std_dur).context("Duration too large")?;
    Ok(start + dur)
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(input, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// Local wall-clock time to UTC. Ambiguous times take the earlier instant.
fn to_utc(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow::anyhow!("{} does not exist in {}", naive, tz))
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    let lower = input.to_lowercase();
    lower
        .split_whitespace()
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the input names a time of day (am/pm, HH:MM, noon, midnight, "at 3").
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();

    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    let bytes = lower.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        // "6pm", "6 pm", "11am"
        if (b == b'a' || b == b'p') && bytes.get(i + 1) == Some(&b'm') {
            if i > 0 && bytes[i - 1].is_ascii_digit() {
                return true;
            }
            if i > 1 && bytes[i - 1] == b' ' && bytes[i - 2].is_ascii_digit() {
                return true;
            }
        }
        // "15:00"
        if b == b':'
            && i > 0
            && bytes[i - 1].is_ascii_digit()
            && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
        {
            return true;
        }
    }

    let after_at = lower
        .find(" at ")
        .map(|pos| &lower[pos + 4..])
        .or_else(|| lower.strip_prefix("at "));
    after_at.is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}
