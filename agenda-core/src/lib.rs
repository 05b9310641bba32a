//! Core library for the agenda client.
//!
//! - [`normalize`] turns raw backend JSON into canonical [`Event`] and [`Itinerary`]
//! - [`link`] and [`view`] build the grouped agenda and calendar feed
//! - [`request`] turns drafts into wire payloads and saves itineraries
//! - [`remote`] talks to the REST backend

pub mod config;
pub mod contact;
pub mod date_range;
pub mod dialect;
pub mod dialog;
pub mod error;
pub mod event;
pub mod friend;
pub mod itinerary;
pub mod link;
pub mod normalize;
pub mod remote;
pub mod request;
pub mod session;
pub mod validation;
pub mod view;

pub use config::AgendaConfig;
pub use contact::{Contact, ContactDraft};
pub use date_range::DateRange;
pub use dialect::Dialect;
pub use dialog::{Dialog, DialogError, DialogMode, DialogState};
pub use error::{AgendaError, AgendaResult};
pub use event::{Category, EntityId, Event, Visibility};
pub use friend::{
    Friend, FriendRequest, FriendRequestDraft, FriendRequestStatus, FriendResponse, FriendUpdate,
};
pub use itinerary::Itinerary;
pub use link::{ItineraryIndex, link_events};
pub use remote::Client;
pub use request::{
    EventBackend, EventDraft, ItineraryDraft, ItinerarySave, SkippedMember, save_itinerary,
};
pub use session::Session;
pub use validation::{ValidationError, ValidationErrors};
pub use view::{AgendaView, CalendarEntry, ItineraryGroup, Palette, SortKey, ViewOptions, build_view};
