//! Itinerary-event linker.

use std::collections::HashMap;

use crate::event::EntityId;
use crate::itinerary::Itinerary;

/// Maps each member event id to the id of the itinerary that owns it.
pub type ItineraryIndex = HashMap<EntityId, EntityId>;

/// Build the event → itinerary lookup.
///
/// Itineraries are visited in list order and members in declared order. An
/// event referenced by two itineraries maps to the last one; the conflict is
/// not reported. Itineraries without an id are skipped.
pub fn link_events(itineraries: &[Itinerary]) -> ItineraryIndex {
    let mut index = ItineraryIndex::new();

    for itinerary in itineraries {
        let Some(itinerary_id) = &itinerary.id else {
            continue;
        };
        for event_id in &itinerary.event_ids {
            index.insert(event_id.clone(), itinerary_id.clone());
        }
    }

    index
}
