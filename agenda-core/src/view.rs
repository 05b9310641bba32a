//! Event view-model builder.
//!
//! Turns normalized events plus the itinerary index into what a calendar or
//! list UI displays: itinerary groups, standalone events and a flat calendar
//! feed with display metadata.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Category, EntityId, Event, Visibility};
use crate::itinerary::Itinerary;
use crate::link::ItineraryIndex;

const ITINERARY_KEY: &str = "itinerary";
const DEFAULT_KEY: &str = "default";
const FALLBACK_COLOR: &str = "#757575";

const DEFAULT_COLORS: [(&str, &str); 8] = [
    ("work", "#1e88e5"),
    ("personal", "#43a047"),
    ("meeting", "#fb8c00"),
    ("travel", "#8e24aa"),
    ("vacation", "#00acc1"),
    ("business", "#6d4c41"),
    (ITINERARY_KEY, "#3949ab"),
    (DEFAULT_KEY, FALLBACK_COLOR),
];

/// Display colours keyed by category name, plus `itinerary` and `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: HashMap<String, String>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: DEFAULT_COLORS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Palette {
    /// Built-in palette with entries replaced or added from configuration.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut palette = Palette::default();
        for (key, color) in overrides {
            palette.colors.insert(key.trim().to_lowercase(), color.clone());
        }
        palette
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.colors.get(key).map(String::as_str)
    }

    /// Itinerary members take the itinerary colour, then the category colour,
    /// then the default.
    pub fn color_for(&self, event: &Event, grouped: bool) -> &str {
        let by_category = || {
            event
                .category
                .as_ref()
                .and_then(|c| self.get(&c.as_str().to_lowercase()))
        };
        let by_group = || if grouped { self.get(ITINERARY_KEY) } else { None };

        by_group()
            .or_else(by_category)
            .or_else(|| self.get(DEFAULT_KEY))
            .unwrap_or(FALLBACK_COLOR)
    }
}

/// Ordering applied to every bucket of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Start instant ascending; events without a start go last.
    #[default]
    Start,
    /// Title, case-insensitive.
    Title,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" | "start_time" | "date" => Ok(SortKey::Start),
            "title" => Ok(SortKey::Title),
            _ => Err(format!("Unknown sort '{}'. Expected start or title", s)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Start => "start",
            SortKey::Title => "title",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOptions {
    /// Case-insensitive title substring; empty keeps everything.
    pub filter: String,
    pub sort: SortKey,
}

/// An itinerary with its visible member events, in view order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItineraryGroup {
    pub itinerary: Itinerary,
    pub events: Vec<Event>,
}

/// A calendar-ready entry with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: Option<EntityId>,
    pub title: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub color: String,
    pub category: Option<Category>,
    pub visibility: Visibility,
    pub description: String,
    pub itinerary_id: Option<EntityId>,
}

impl CalendarEntry {
    fn new(event: &Event, itinerary_id: Option<EntityId>, palette: &Palette) -> Self {
        CalendarEntry {
            id: event.id.clone(),
            title: event.title.clone(),
            start: event.start_time,
            end: event.end_time,
            color: palette.color_for(event, itinerary_id.is_some()).to_string(),
            category: event.category.clone(),
            visibility: event.visibility,
            description: event.description.clone(),
            itinerary_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgendaView {
    pub grouped: Vec<ItineraryGroup>,
    pub standalone: Vec<Event>,
    pub calendar: Vec<CalendarEntry>,
}

impl AgendaView {
    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }
}

/// Keep events whose title contains `needle`, ignoring case. Only an empty
/// needle keeps everything.
pub fn filter_events<'a>(events: &'a [Event], needle: &str) -> Vec<&'a Event> {
    events.iter().filter(|e| e.title_contains(needle)).collect()
}

/// Stable sort: events with equal keys keep their fetch order.
pub fn sort_events<E: Borrow<Event>>(events: &mut [E], key: SortKey) {
    match key {
        SortKey::Start => events.sort_by_key(|e| {
            let event: &Event = e.borrow();
            (event.start_time.is_none(), event.start_time)
        }),
        SortKey::Title => events.sort_by_cached_key(|e| {
            let event: &Event = e.borrow();
            event.title.to_lowercase()
        }),
    }
}

/// Filter, sort and partition events into the display buckets.
///
/// An event is grouped when its id is in `index` and the referenced itinerary
/// is present in `itineraries`. Groups appear in the order of their first
/// member in the sorted list, and members keep sorted-list order rather than
/// the itinerary's declared order.
pub fn build_view(
    events: &[Event],
    itineraries: &[Itinerary],
    index: &ItineraryIndex,
    options: &ViewOptions,
    palette: &Palette,
) -> AgendaView {
    let mut visible = filter_events(events, &options.filter);
    sort_events(&mut visible, options.sort);

    let by_id: HashMap<&EntityId, &Itinerary> = itineraries
        .iter()
        .filter_map(|it| it.id.as_ref().map(|id| (id, it)))
        .collect();

    let mut view = AgendaView::default();
    let mut slots: HashMap<&EntityId, usize> = HashMap::new();

    for event in visible {
        let owner = event
            .id
            .as_ref()
            .and_then(|id| index.get(id))
            .and_then(|it_id| by_id.get(it_id).map(|it| (it_id, *it)));

        match owner {
            Some((it_id, itinerary)) => {
                let slot = *slots.entry(it_id).or_insert_with(|| {
                    view.grouped.push(ItineraryGroup {
                        itinerary: itinerary.clone(),
                        events: Vec::new(),
                    });
                    view.grouped.len() - 1
                });
                view.grouped[slot].events.push(event.clone());
            }
            None => view.standalone.push(event.clone()),
        }

        let itinerary_id = owner.map(|(id, _)| id.clone());
        view.calendar.push(CalendarEntry::new(event, itinerary_id, palette));
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::link_events;
    use crate::normalize::normalize_events;
    use serde_json::json;

    fn ids<E: Borrow<Event>>(events: &[E]) -> Vec<EntityId> {
        events
            .iter()
            .filter_map(|e| {
                let event: &Event = e.borrow();
                event.id.clone()
            })
            .collect()
    }

    fn event(id: i64, title: &str, start: Option<&str>) -> Event {
        Event {
            id: Some(EntityId::from(id)),
            title: title.to_string(),
            start_time: start.and_then(crate::normalize::parse_instant),
            ..Default::default()
        }
    }

    fn itinerary(id: i64, members: &[i64]) -> Itinerary {
        Itinerary {
            id: Some(EntityId::from(id)),
            title: format!("Trip {id}"),
            event_ids: members.iter().copied().map(EntityId::from).collect(),
            ..Default::default()
        }
    }

    fn view(events: &[Event], itineraries: &[Itinerary], options: ViewOptions) -> AgendaView {
        let index = link_events(itineraries);
        build_view(events, itineraries, &index, &options, &Palette::default())
    }

    #[test]
    fn sorts_by_start_and_by_title() {
        let events = normalize_events(&json!([
            {"id": 1, "title": "B", "start": "2024-01-02"},
            {"id": 2, "title": "A", "start": "2024-01-01"},
        ]));

        let by_start = view(&events, &[], ViewOptions::default());
        assert_eq!(ids(&by_start.standalone), vec![EntityId::from(2), EntityId::from(1)]);

        let by_title = view(
            &events,
            &[],
            ViewOptions {
                sort: SortKey::Title,
                ..Default::default()
            },
        );
        assert_eq!(ids(&by_title.standalone), vec![EntityId::from(2), EntityId::from(1)]);
    }

    #[test]
    fn title_sort_ignores_case_regardless_of_start() {
        let mut events = vec![
            event(1, "banana", Some("2024-01-01")),
            event(2, "Apple", Some("2024-06-01")),
            event(3, "cherry", Some("2023-01-01")),
        ];
        sort_events(&mut events, SortKey::Title);
        assert_eq!(
            ids(&events),
            vec![EntityId::from(2), EntityId::from(1), EntityId::from(3)]
        );
    }

    #[test]
    fn sorting_is_stable_for_equal_keys() {
        let mut events = vec![
            event(1, "same", Some("2024-01-01")),
            event(2, "Same", Some("2024-01-01")),
            event(3, "SAME", Some("2024-01-01")),
        ];

        sort_events(&mut events, SortKey::Start);
        assert_eq!(ids(&events), vec![EntityId::from(1), EntityId::from(2), EntityId::from(3)]);

        sort_events(&mut events, SortKey::Title);
        assert_eq!(ids(&events), vec![EntityId::from(1), EntityId::from(2), EntityId::from(3)]);
    }

    #[test]
    fn events_without_start_sort_last() {
        let mut events = vec![
            event(1, "no start", None),
            event(2, "late", Some("2024-02-01")),
            event(3, "early", Some("2024-01-01")),
        ];
        sort_events(&mut events, SortKey::Start);
        assert_eq!(ids(&events), vec![EntityId::from(3), EntityId::from(2), EntityId::from(1)]);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let events = vec![
            event(1, "Lunch with Bob", Some("2024-01-01")),
            event(2, "Gym", Some("2024-01-01")),
        ];
        assert_eq!(ids(&filter_events(&events, "lunch")), vec![EntityId::from(1)]);
        assert_eq!(filter_events(&events, "").len(), 2);
    }

    #[test]
    fn whitespace_filter_is_matched_literally() {
        let events = vec![
            event(1, "Lunch with Bob", Some("2024-01-01")),
            event(2, "Gym", Some("2024-01-01")),
        ];
        assert_eq!(ids(&filter_events(&events, " ")), vec![EntityId::from(1)]);
        assert!(filter_events(&events, "  ").is_empty());
    }

    #[test]
    fn filter_applies_before_partitioning() {
        let events = vec![
            event(10, "Flight out", Some("2024-05-01")),
            event(11, "Hotel", Some("2024-05-01")),
            event(20, "Flight back", Some("2024-05-09")),
        ];
        let v = view(
            &events,
            &[itinerary(1, &[10, 11])],
            ViewOptions {
                filter: "flight".into(),
                ..Default::default()
            },
        );

        assert_eq!(v.grouped.len(), 1);
        assert_eq!(ids(&v.grouped[0].events), vec![EntityId::from(10)]);
        assert_eq!(ids(&v.standalone), vec![EntityId::from(20)]);
        assert_eq!(v.calendar.len(), 2);
    }

    #[test]
    fn members_follow_sorted_order_not_declared_order() {
        let events = vec![
            event(10, "Day two", Some("2024-05-02")),
            event(11, "Day one", Some("2024-05-01")),
        ];
        let v = view(&events, &[itinerary(1, &[10, 11])], ViewOptions::default());

        assert_eq!(ids(&v.grouped[0].events), vec![EntityId::from(11), EntityId::from(10)]);
        assert!(v.standalone.is_empty());
    }

    #[test]
    fn groups_ordered_by_first_member() {
        let events = vec![
            event(10, "a", Some("2024-05-05")),
            event(20, "b", Some("2024-05-01")),
            event(11, "c", Some("2024-05-03")),
        ];
        let v = view(
            &events,
            &[itinerary(1, &[10, 11]), itinerary(2, &[20])],
            ViewOptions::default(),
        );

        let group_ids: Vec<_> = v.grouped.iter().filter_map(|g| g.itinerary.id.clone()).collect();
        assert_eq!(group_ids, vec![EntityId::from(2), EntityId::from(1)]);
        assert_eq!(ids(&v.grouped[1].events), vec![EntityId::from(11), EntityId::from(10)]);
    }

    #[test]
    fn events_of_missing_itineraries_are_standalone() {
        let events = vec![event(10, "orphan", Some("2024-05-01"))];
        let itineraries = [itinerary(1, &[10])];
        let index = link_events(&itineraries);

        // Index still references itinerary 1, but it is not in the fetched list.
        let v = build_view(&events, &[], &index, &ViewOptions::default(), &Palette::default());

        assert!(v.grouped.is_empty());
        assert_eq!(ids(&v.standalone), vec![EntityId::from(10)]);
        assert_eq!(v.calendar[0].itinerary_id, None);
    }

    #[test]
    fn calendar_entries_carry_display_metadata() {
        let mut work = event(1, "Standup", Some("2024-05-01T09:00:00Z"));
        work.category = Some(Category::Work);
        work.visibility = Visibility::Public;
        let mut member = event(10, "Museum", Some("2024-05-02"));
        member.category = Some(Category::Travel);
        let plain = event(2, "Call mum", Some("2024-05-03"));

        let v = view(&[work, member, plain], &[itinerary(7, &[10])], ViewOptions::default());

        assert_eq!(v.calendar[0].color, "#1e88e5");
        assert_eq!(v.calendar[0].visibility, Visibility::Public);
        assert_eq!(v.calendar[1].color, "#3949ab");
        assert_eq!(v.calendar[1].itinerary_id, Some(EntityId::from(7)));
        assert_eq!(v.calendar[2].color, "#757575");
    }

    #[test]
    fn palette_overrides_replace_defaults() {
        let overrides = HashMap::from([
            ("Work".to_string(), "#000000".to_string()),
            ("gym".to_string(), "#ff0000".to_string()),
        ]);
        let palette = Palette::with_overrides(&overrides);

        let mut e = event(1, "x", None);
        e.category = Some(Category::Work);
        assert_eq!(palette.color_for(&e, false), "#000000");

        e.category = Some(Category::Other("Gym".into()));
        assert_eq!(palette.color_for(&e, false), "#ff0000");
    }
}
