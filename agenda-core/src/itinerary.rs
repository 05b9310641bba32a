//! Itineraries: named containers grouping an ordered set of events.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::{Category, EntityId, Visibility};

/// An itinerary in canonical shape.
///
/// Member events are independent entities; the itinerary only carries their
/// identifiers, in the order the backend declares them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub visibility: Visibility,
    pub event_ids: Vec<EntityId>,
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
