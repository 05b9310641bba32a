//! Field normalizer: raw backend JSON into canonical [`Event`] and [`Itinerary`].
//!
//! The normalizer never fails. Missing optional fields get defaults (empty
//! description, no category, `PRIVATE` visibility); a missing id or start is
//! passed through as `None` and must be rejected by whoever persists the record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::dialect::{MEMBER_FIELD_PRECEDENCE, TIME_FIELD_PRECEDENCE, TimeFields};
use crate::event::{Category, EntityId, Event, Visibility};
use crate::itinerary::Itinerary;

/// Naive formats tried after RFC 3339, read as UTC.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Strip a `{"data": ...}` envelope if present.
pub fn unwrap_envelope(value: &Value) -> &Value {
    match value.get("data") {
        Some(inner) if inner.is_array() || inner.is_object() => inner,
        _ => value,
    }
}

pub fn normalize_event(raw: &Value) -> Event {
    Event {
        id: raw.get("id").and_then(EntityId::from_value),
        title: text(raw, "title"),
        description: text(raw, "description"),
        start_time: instant(raw, |f| f.start),
        end_time: instant(raw, |f| f.end),
        category: category(raw),
        visibility: visibility(raw),
    }
}

pub fn normalize_itinerary(raw: &Value) -> Itinerary {
    Itinerary {
        id: raw.get("id").and_then(EntityId::from_value),
        title: text(raw, "title"),
        description: text(raw, "description"),
        location: text(raw, "location"),
        start_time: instant(raw, |f| f.start),
        end_time: instant(raw, |f| f.end),
        category: category(raw),
        visibility: visibility(raw),
        event_ids: member_ids(raw),
    }
}

/// Normalize a list response (bare array or `{"data": [...]}`).
pub fn normalize_events(raw: &Value) -> Vec<Event> {
    items(raw).iter().map(normalize_event).collect()
}

pub fn normalize_itineraries(raw: &Value) -> Vec<Itinerary> {
    items(raw).iter().map(normalize_itinerary).collect()
}

/// Parse an instant in any format the backends produce.
///
/// Accepts RFC 3339, naive date-times (read as UTC) and plain dates (midnight UTC).
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn items(raw: &Value) -> &[Value] {
    match unwrap_envelope(raw) {
        Value::Array(items) => items,
        _ => &[],
    }
}

fn text(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// A field value that counts as present: not null, not a blank string.
fn present<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        value => Some(value),
    }
}

fn instant(raw: &Value, pick: fn(&TimeFields) -> &'static str) -> Option<DateTime<Utc>> {
    let (key, value) = TIME_FIELD_PRECEDENCE
        .iter()
        .map(pick)
        .find_map(|key| present(raw, key).map(|value| (key, value)))?;

    let parsed = match value {
        Value::String(s) => parse_instant(s),
        // Epoch milliseconds, as produced by JavaScript dates
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    if parsed.is_none() {
        debug!(field = key, value = %value, "Ignoring unparseable instant");
    }
    parsed
}

fn category(raw: &Value) -> Option<Category> {
    raw.get("category").and_then(Value::as_str).and_then(Category::parse)
}

fn visibility(raw: &Value) -> Visibility {
    match raw.get("visibility").and_then(Value::as_str) {
        Some(s) => s.parse().unwrap_or_else(|_| {
            debug!(visibility = s, "Unknown visibility, falling back to PRIVATE");
            Visibility::default()
        }),
        None => Visibility::default(),
    }
}

fn member_ids(raw: &Value) -> Vec<EntityId> {
    let Some(members) = MEMBER_FIELD_PRECEDENCE
        .iter()
        .find_map(|key| raw.get(key).and_then(Value::as_array))
    else {
        return Vec::new();
    };

    members
        .iter()
        .filter_map(|member| match member {
            Value::Object(_) => member.get("id").and_then(EntityId::from_value),
            other => EntityId::from_value(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn reads_all_three_naming_conventions() {
        let expected = Some(utc(2024, 3, 1, 9, 0));

        let camel = json!({"id": 1, "title": "A", "startTime": "2024-03-01T09:00:00Z"});
        let snake = json!({"id": 1, "title": "A", "start_time": "2024-03-01T09:00:00Z"});
        let bare = json!({"id": 1, "title": "A", "start": "2024-03-01T09:00:00Z"});

        assert_eq!(normalize_event(&camel).start_time, expected);
        assert_eq!(normalize_event(&snake).start_time, expected);
        assert_eq!(normalize_event(&bare).start_time, expected);
    }

    #[test]
    fn camel_case_takes_precedence() {
        let raw = json!({
            "title": "A",
            "start": "2020-01-01",
            "start_time": "2021-01-01",
            "startTime": "2024-03-01T09:00:00Z",
            "end_time": "2024-03-01T10:00:00Z",
        });
        let event = normalize_event(&raw);

        assert_eq!(event.start_time, Some(utc(2024, 3, 1, 9, 0)));
        // end resolves independently of start
        assert_eq!(event.end_time, Some(utc(2024, 3, 1, 10, 0)));
    }

    #[test]
    fn null_or_blank_falls_through_to_next_convention() {
        let raw = json!({"startTime": null, "start_time": "", "start": "2024-01-02"});
        assert_eq!(normalize_event(&raw).start_time, Some(utc(2024, 1, 2, 0, 0)));
    }

    #[test]
    fn missing_optionals_get_defaults() {
        let event = normalize_event(&json!({"id": 5, "title": "Gym", "start": "2024-01-01"}));

        assert_eq!(event.description, "");
        assert_eq!(event.category, None);
        assert_eq!(event.visibility, Visibility::Private);
        assert_eq!(event.end_time, None);
    }

    #[test]
    fn missing_id_and_start_pass_through_as_none() {
        let event = normalize_event(&json!({"title": "Draft"}));
        assert_eq!(event.id, None);
        assert_eq!(event.start_time, None);
    }

    #[test]
    fn unparseable_start_is_treated_as_missing() {
        let event = normalize_event(&json!({"title": "A", "startTime": "next tuesday"}));
        assert_eq!(event.start_time, None);
    }

    #[test]
    fn unknown_visibility_falls_back_to_private() {
        let event = normalize_event(&json!({"title": "A", "visibility": "SECRET"}));
        assert_eq!(event.visibility, Visibility::Private);

        let event = normalize_event(&json!({"title": "A", "visibility": "FRIENDS_ONLY"}));
        assert_eq!(event.visibility, Visibility::FriendsOnly);
    }

    #[test]
    fn normalizing_canonical_output_is_a_no_op() {
        let raw = json!({
            "id": "42",
            "title": "Standup",
            "description": "daily",
            "start_time": "2024-03-01 09:00:00",
            "end_time": "2024-03-01 09:15:00",
            "category": "work",
            "visibility": "PUBLIC",
        });
        let once = normalize_event(&raw);
        let twice = normalize_event(&serde_json::to_value(&once).unwrap());

        assert_eq!(once, twice);
    }

    #[test]
    fn itinerary_canonical_output_is_a_no_op() {
        let raw = json!({
            "id": 1,
            "title": "Lisbon",
            "location": "Portugal",
            "start": "2024-05-01",
            "events": [{"id": 10}, {"id": "11"}],
        });
        let once = normalize_itinerary(&raw);
        let twice = normalize_itinerary(&serde_json::to_value(&once).unwrap());

        assert_eq!(once, twice);
    }

    #[test]
    fn parses_backend_instant_formats() {
        assert_eq!(parse_instant("2024-03-01T10:00:00+01:00"), Some(utc(2024, 3, 1, 9, 0)));
        assert_eq!(parse_instant("2024-03-01T09:00:00.000000Z"), Some(utc(2024, 3, 1, 9, 0)));
        assert_eq!(parse_instant("2024-03-01T09:00"), Some(utc(2024, 3, 1, 9, 0)));
        assert_eq!(parse_instant("2024-03-01 09:00:00"), Some(utc(2024, 3, 1, 9, 0)));
        assert_eq!(parse_instant("2024-03-01"), Some(utc(2024, 3, 1, 0, 0)));
        assert_eq!(parse_instant("01/03/2024"), None);
    }

    #[test]
    fn epoch_millis_are_accepted() {
        let event = normalize_event(&json!({"title": "A", "start": 1709283600000_i64}));
        assert_eq!(event.start_time, Some(utc(2024, 3, 1, 9, 0)));
    }

    #[test]
    fn unwraps_data_envelopes() {
        let wrapped = json!({"data": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]});
        let bare = json!([{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]);

        assert_eq!(normalize_events(&wrapped), normalize_events(&bare));
        assert_eq!(normalize_events(&json!({"message": "oops"})), Vec::new());
    }

    #[test]
    fn itinerary_members_from_any_shape() {
        let ids = normalize_itinerary(&json!({"id": 1, "eventIds": [10, "11"]})).event_ids;
        assert_eq!(ids, vec![EntityId::Number(10), EntityId::Number(11)]);

        let ids = normalize_itinerary(&json!({"id": 1, "event_ids": ["a"]})).event_ids;
        assert_eq!(ids, vec![EntityId::Text("a".into())]);

        let ids = normalize_itinerary(&json!({"id": 1, "events": [{"id": 3, "title": "x"}, {"title": "no id"}]})).event_ids;
        assert_eq!(ids, vec![EntityId::Number(3)]);

        assert!(normalize_itinerary(&json!({"id": 1})).event_ids.is_empty());
    }
}
