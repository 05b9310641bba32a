//! REST paths, relative to the configured base URL.

use crate::dialect::Dialect;
use crate::event::EntityId;

pub fn register(dialect: Dialect) -> String {
    format!("{}/register", dialect.auth_prefix())
}

pub fn login(dialect: Dialect) -> String {
    format!("{}/login", dialect.auth_prefix())
}

pub fn logout(dialect: Dialect) -> String {
    format!("{}/logout", dialect.auth_prefix())
}

pub const EVENTS: &str = "/events";
pub const ITINERARIES: &str = "/itineraries";
pub const CONTACTS: &str = "/contacts";
pub const FRIENDS: &str = "/friends";
pub const FRIENDS_PENDING: &str = "/friends/pending";
pub const FRIENDS_SENT: &str = "/friends/sent";
pub const FRIEND_REQUEST: &str = "/friends/request";
pub const SHARE_EVENT: &str = "/event-requests/send";

pub fn event(id: &EntityId) -> String {
    format!("{EVENTS}/{id}")
}

pub fn itinerary(id: &EntityId) -> String {
    format!("{ITINERARIES}/{id}")
}

pub fn contact(id: &EntityId) -> String {
    format!("{CONTACTS}/{id}")
}

pub fn friend(id: &EntityId) -> String {
    format!("{FRIENDS}/{id}")
}

pub fn friend_respond(request_id: &EntityId) -> String {
    format!("{FRIENDS}/respond/{request_id}")
}

pub fn friend_events(friend_id: &EntityId) -> String {
    format!("{EVENTS}/friend/{friend_id}")
}
