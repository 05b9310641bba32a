//! Canonical event types.
//!
//! Backends disagree on field names; [`crate::normalize`] converts their raw
//! JSON into these types and the rest of the crate works exclusively with them.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;

/// Backend-assigned identifier.
///
/// Backends send ids as JSON numbers or strings. Numeric strings are folded
/// into [`EntityId::Number`] so ids taken from different payloads compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(EntityId::Number(i)),
                None => Some(EntityId::Text(n.to_string())),
            },
            Value::String(s) if !s.trim().is_empty() => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for EntityId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EntityId::from(s))
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        EntityId::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid identifier: {value}")))
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Number(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        let id = id.trim();
        match id.parse::<i64>() {
            Ok(n) => EntityId::Number(n),
            Err(_) => EntityId::Text(id.to_string()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

/// Sharing scope of an event or itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    FriendsOnly,
    Public,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [
        Visibility::Private,
        Visibility::FriendsOnly,
        Visibility::Public,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::FriendsOnly => "FRIENDS_ONLY",
            Visibility::Public => "PUBLIC",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PRIVATE" => Ok(Visibility::Private),
            "FRIENDS_ONLY" | "FRIENDS" => Ok(Visibility::FriendsOnly),
            "PUBLIC" => Ok(Visibility::Public),
            _ => Err(format!(
                "Unknown visibility '{}'. Expected private, friends-only or public",
                s
            )),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category tag of an event or itinerary.
///
/// Unknown tags coming from the server are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Work,
    Personal,
    Meeting,
    Travel,
    Vacation,
    Business,
    Other(String),
}

impl Category {
    /// Categories offered by the event form.
    pub const EVENT: [Category; 3] = [Category::Work, Category::Personal, Category::Meeting];

    /// Categories offered by the itinerary form.
    pub const ITINERARY: [Category; 4] = [
        Category::Travel,
        Category::Vacation,
        Category::Business,
        Category::Personal,
    ];

    /// Parse a tag, treating blank input as "no category".
    pub fn parse(tag: &str) -> Option<Category> {
        let tag = tag.trim();
        if tag.is_empty() {
            None
        } else {
            Some(Category::from(tag))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Meeting => "meeting",
            Category::Travel => "travel",
            Category::Vacation => "vacation",
            Category::Business => "business",
            Category::Other(tag) => tag,
        }
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "work" => Category::Work,
            "personal" => Category::Personal,
            "meeting" => Category::Meeting,
            "travel" => Category::Travel,
            "vacation" => Category::Vacation,
            "business" => Category::Business,
            _ => Category::Other(tag.trim().to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Category::from(tag.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar event in canonical shape.
///
/// `id` and `start_time` are optional because the normalizer passes missing
/// values through; code that persists an event validates them first.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub visibility: Visibility,
}

impl Event {
    /// Case-insensitive substring match on the title. An empty needle matches.
    pub fn title_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.title.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_string_ids_fold_into_numbers() {
        assert_eq!(EntityId::from_value(&json!("10")), Some(EntityId::Number(10)));
        assert_eq!(EntityId::from_value(&json!(10)), Some(EntityId::Number(10)));
        assert_eq!(
            EntityId::from_value(&json!("evt-1")),
            Some(EntityId::Text("evt-1".into()))
        );
        assert_eq!(EntityId::from_value(&json!("  ")), None);
        assert_eq!(EntityId::from_value(&Value::Null), None);
    }

    #[test]
    fn ids_serialize_untagged() {
        assert_eq!(serde_json::to_value(EntityId::from(7)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(EntityId::from("abc")).unwrap(), json!("abc"));
    }

    #[test]
    fn visibility_parses_loosely() {
        assert_eq!("friends-only".parse::<Visibility>(), Ok(Visibility::FriendsOnly));
        assert_eq!("public".parse::<Visibility>(), Ok(Visibility::Public));
        assert!("everyone".parse::<Visibility>().is_err());
        assert_eq!(Visibility::default(), Visibility::Private);
    }

    #[test]
    fn unknown_categories_are_kept() {
        assert_eq!(Category::from("Work"), Category::Work);
        assert_eq!(Category::from("gym"), Category::Other("gym".into()));
        assert_eq!(Category::parse("   "), None);
    }

    #[test]
    fn title_filter_ignores_case() {
        let event = Event {
            title: "Lunch with Bob".into(),
            ..Default::default()
        };
        assert!(event.title_contains("lunch"));
        assert!(event.title_contains(""));
        assert!(!event.title_contains("gym"));
    }
}
