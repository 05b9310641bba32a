//! Request adapter: canonical drafts into wire payloads, and the multi-step
//! itinerary save.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::dialect::Dialect;
use crate::error::AgendaResult;
use crate::event::{Category, EntityId, Event, Visibility};
use crate::itinerary::Itinerary;
use crate::validation::validate_schedule;

/// Serialize an instant as ISO-8601 UTC with second precision and a `Z` suffix.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Pending edits of an event form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category: Option<Category>,
    pub visibility: Option<Visibility>,
}

impl EventDraft {
    pub fn validate(&self) -> AgendaResult<()> {
        validate_schedule(&self.title, self.start, self.end)?;
        Ok(())
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start_time,
            end: event.end_time,
            category: event.category.clone(),
            visibility: Some(event.visibility),
        }
    }
}

/// Pending edits of an itinerary form, including events to create as members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItineraryDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Option<Category>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub visibility: Option<Visibility>,
    /// Members that already exist on the server.
    pub event_ids: Vec<EntityId>,
    /// Members to create before the itinerary is saved.
    pub new_events: Vec<EventDraft>,
}

impl ItineraryDraft {
    pub fn validate(&self) -> AgendaResult<()> {
        validate_schedule(&self.title, self.start, self.end)?;
        Ok(())
    }
}

impl From<&Itinerary> for ItineraryDraft {
    fn from(itinerary: &Itinerary) -> Self {
        ItineraryDraft {
            title: itinerary.title.clone(),
            description: itinerary.description.clone(),
            location: itinerary.location.clone(),
            category: itinerary.category.clone(),
            start: itinerary.start_time,
            end: itinerary.end_time,
            visibility: Some(itinerary.visibility),
            event_ids: itinerary.event_ids.clone(),
            new_events: Vec::new(),
        }
    }
}

/// Wire body for creating or updating an event.
///
/// `endTime` and `visibility` are always written; `description` and
/// `category` only when non-empty.
pub fn event_payload(draft: &EventDraft, dialect: Dialect) -> AgendaResult<Value> {
    draft.validate()?;

    let mut body = schedule_fields(
        dialect,
        &draft.title,
        draft.start,
        draft.end,
        draft.visibility,
    );
    optional_fields(&mut body, &draft.description, draft.category.as_ref());

    Ok(Value::Object(body))
}

/// Wire body for creating or updating an itinerary with the given members.
pub fn itinerary_payload(
    draft: &ItineraryDraft,
    event_ids: &[EntityId],
    dialect: Dialect,
) -> AgendaResult<Value> {
    draft.validate()?;

    let mut body = schedule_fields(
        dialect,
        &draft.title,
        draft.start,
        draft.end,
        draft.visibility,
    );
    optional_fields(&mut body, &draft.description, draft.category.as_ref());
    if !draft.location.trim().is_empty() {
        body.insert("location".into(), json!(draft.location));
    }
    body.insert(dialect.event_ids_field().into(), json!(event_ids));

    Ok(Value::Object(body))
}

fn schedule_fields(
    dialect: Dialect,
    title: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    visibility: Option<Visibility>,
) -> Map<String, Value> {
    let fields = dialect.time_fields();
    let mut body = Map::new();

    body.insert("title".into(), json!(title.trim()));
    body.insert(fields.start.into(), json!(start.map(format_instant)));
    body.insert(fields.end.into(), json!(end.map(format_instant)));
    body.insert(
        "visibility".into(),
        json!(visibility.unwrap_or_default().as_str()),
    );
    body
}

fn optional_fields(body: &mut Map<String, Value>, description: &str, category: Option<&Category>) {
    if !description.trim().is_empty() {
        body.insert("description".into(), json!(description));
    }
    if let Some(category) = category.filter(|c| !c.as_str().is_empty()) {
        body.insert("category".into(), json!(category.as_str()));
    }
}

/// Persistence seam used by [`save_itinerary`].
#[async_trait]
pub trait EventBackend {
    async fn create_event(&self, draft: &EventDraft) -> AgendaResult<Event>;

    async fn create_itinerary(
        &self,
        draft: &ItineraryDraft,
        event_ids: &[EntityId],
    ) -> AgendaResult<Itinerary>;

    async fn update_itinerary(
        &self,
        id: &EntityId,
        draft: &ItineraryDraft,
        event_ids: &[EntityId],
    ) -> AgendaResult<Itinerary>;
}

/// A new member event that could not be created.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMember {
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct ItinerarySave {
    pub itinerary: Itinerary,
    /// Member events created during this save.
    pub created: Vec<Event>,
    pub skipped: Vec<SkippedMember>,
}

/// Create the draft's new member events, then create or update the itinerary.
///
/// Members are created one at a time in draft order. A member that fails is
/// logged and skipped; the itinerary is still saved with the ids that were
/// collected, appended after the draft's existing members.
pub async fn save_itinerary<B>(
    backend: &B,
    draft: &ItineraryDraft,
    existing: Option<&EntityId>,
) -> AgendaResult<ItinerarySave>
where
    B: EventBackend + Sync + ?Sized,
{
    draft.validate()?;

    let mut event_ids = draft.event_ids.clone();
    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for member in &draft.new_events {
        let result = match member.validate() {
            Ok(()) => backend.create_event(member).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(event) => match event.id.clone() {
                Some(id) => {
                    event_ids.push(id);
                    created.push(event);
                }
                None => {
                    warn!(title = %member.title, "Created event has no id, not attaching it");
                    skipped.push(SkippedMember {
                        title: member.title.clone(),
                        error: "server returned no id".to_string(),
                    });
                }
            },
            Err(e) => {
                warn!(title = %member.title, error = %e, "Skipping itinerary member");
                skipped.push(SkippedMember {
                    title: member.title.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    let itinerary = match existing {
        Some(id) => backend.update_itinerary(id, draft, &event_ids).await?,
        None => backend.create_itinerary(draft, &event_ids).await?,
    };

    info!(
        itinerary = %itinerary.title,
        members = event_ids.len(),
        skipped = skipped.len(),
        "Saved itinerary"
    );

    Ok(ItinerarySave {
        itinerary,
        created,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgendaError;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn at(hour: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap())
    }

    fn standup() -> EventDraft {
        EventDraft {
            title: "Standup".into(),
            start: at(9),
            ..Default::default()
        }
    }

    #[test]
    fn standup_payload() {
        let body = event_payload(&standup(), Dialect::Spring).unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Standup",
                "startTime": "2024-03-01T09:00:00Z",
                "endTime": null,
                "visibility": "PRIVATE",
            })
        );
    }

    #[test]
    fn laravel_writes_snake_case_times() {
        let mut draft = standup();
        draft.end = at(10);
        draft.description = "daily".into();
        draft.category = Some(Category::Meeting);
        draft.visibility = Some(Visibility::FriendsOnly);

        let body = event_payload(&draft, Dialect::Laravel).unwrap();
        assert_eq!(
            body,
            json!({
                "title": "Standup",
                "description": "daily",
                "start_time": "2024-03-01T09:00:00Z",
                "end_time": "2024-03-01T10:00:00Z",
                "category": "meeting",
                "visibility": "FRIENDS_ONLY",
            })
        );
    }

    #[test]
    fn invalid_draft_is_never_serialized() {
        let draft = EventDraft {
            title: " ".into(),
            ..Default::default()
        };
        assert!(matches!(
            event_payload(&draft, Dialect::Spring),
            Err(AgendaError::Validation(_))
        ));
    }

    #[test]
    fn itinerary_payload_carries_members_and_location() {
        let draft = ItineraryDraft {
            title: "Lisbon".into(),
            location: "Portugal".into(),
            start: at(8),
            ..Default::default()
        };
        let ids = [EntityId::from(10), EntityId::from("x")];

        let spring = itinerary_payload(&draft, &ids, Dialect::Spring).unwrap();
        assert_eq!(spring["eventIds"], json!([10, "x"]));
        assert_eq!(spring["location"], json!("Portugal"));

        let laravel = itinerary_payload(&draft, &ids, Dialect::Laravel).unwrap();
        assert_eq!(laravel["event_ids"], json!([10, "x"]));
        assert_eq!(laravel["start_time"], json!("2024-03-01T08:00:00Z"));
    }

    /// Backend double that fails member creation for titles it is told to.
    #[derive(Default)]
    struct FakeBackend {
        failing: Vec<&'static str>,
        next_id: Mutex<i64>,
        saved: Mutex<Vec<(Option<EntityId>, Vec<EntityId>)>>,
    }

    #[async_trait]
    impl EventBackend for FakeBackend {
        async fn create_event(&self, draft: &EventDraft) -> AgendaResult<Event> {
            if self.failing.contains(&draft.title.as_str()) {
                return Err(AgendaError::Http {
                    status: 500,
                    message: "boom".into(),
                });
            }
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            Ok(Event {
                id: Some(EntityId::from(100 + *next)),
                title: draft.title.clone(),
                start_time: draft.start,
                ..Default::default()
            })
        }

        async fn create_itinerary(
            &self,
            draft: &ItineraryDraft,
            event_ids: &[EntityId],
        ) -> AgendaResult<Itinerary> {
            self.saved.lock().unwrap().push((None, event_ids.to_vec()));
            Ok(Itinerary {
                id: Some(EntityId::from(1)),
                title: draft.title.clone(),
                event_ids: event_ids.to_vec(),
                ..Default::default()
            })
        }

        async fn update_itinerary(
            &self,
            id: &EntityId,
            draft: &ItineraryDraft,
            event_ids: &[EntityId],
        ) -> AgendaResult<Itinerary> {
            self.saved
                .lock()
                .unwrap()
                .push((Some(id.clone()), event_ids.to_vec()));
            Ok(Itinerary {
                id: Some(id.clone()),
                title: draft.title.clone(),
                event_ids: event_ids.to_vec(),
                ..Default::default()
            })
        }
    }

    fn trip(members: &[&str]) -> ItineraryDraft {
        ItineraryDraft {
            title: "Trip".into(),
            start: at(8),
            new_events: members
                .iter()
                .map(|title| EventDraft {
                    title: title.to_string(),
                    start: at(9),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failed_member_is_skipped_not_fatal() {
        let backend = FakeBackend {
            failing: vec!["Museum"],
            ..Default::default()
        };

        let save = save_itinerary(&backend, &trip(&["Flight", "Museum"]), None)
            .await
            .unwrap();

        let saved = backend.saved.lock().unwrap();
        assert_eq!(saved.as_slice(), &[(None, vec![EntityId::from(101)])]);
        assert_eq!(save.created.len(), 1);
        assert_eq!(save.skipped.len(), 1);
        assert_eq!(save.skipped[0].title, "Museum");
    }

    #[tokio::test]
    async fn invalid_member_is_skipped_without_a_request() {
        let backend = FakeBackend::default();
        let mut draft = trip(&["Flight"]);
        draft.new_events.push(EventDraft {
            title: "No start".into(),
            ..Default::default()
        });

        let save = save_itinerary(&backend, &draft, None).await.unwrap();

        assert_eq!(save.itinerary.event_ids, vec![EntityId::from(101)]);
        assert_eq!(save.skipped[0].title, "No start");
    }

    #[tokio::test]
    async fn update_appends_after_existing_members() {
        let backend = FakeBackend::default();
        let mut draft = trip(&["Dinner"]);
        draft.event_ids = vec![EntityId::from(7)];

        let save = save_itinerary(&backend, &draft, Some(&EntityId::from(3)))
            .await
            .unwrap();

        assert_eq!(save.itinerary.id, Some(EntityId::from(3)));
        assert_eq!(
            save.itinerary.event_ids,
            vec![EntityId::from(7), EntityId::from(101)]
        );
    }

    #[tokio::test]
    async fn invalid_itinerary_creates_nothing() {
        let backend = FakeBackend::default();
        let mut draft = trip(&["Flight"]);
        draft.title.clear();

        assert!(save_itinerary(&backend, &draft, None).await.is_err());
        assert_eq!(*backend.next_id.lock().unwrap(), 0);
        assert!(backend.saved.lock().unwrap().is_empty());
    }
}
