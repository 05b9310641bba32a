//! Friends and friend requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contact::blank_as_none;
use crate::event::EntityId;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendRequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default, alias = "sender_name")]
    pub sender_name: Option<String>,
    #[serde(default, alias = "sender_email")]
    pub sender_email: Option<String>,
    #[serde(default, alias = "recipient_name")]
    pub recipient_name: Option<String>,
    #[serde(default, alias = "recipient_email")]
    pub recipient_email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: FriendRequestStatus,
}

impl FriendRequest {
    /// The friend produced by this request once the recipient accepted it,
    /// seen from the sender's side.
    pub fn accepted_friend(&self) -> Option<Friend> {
        if self.status != FriendRequestStatus::Accepted {
            return None;
        }
        Some(Friend {
            id: None,
            name: self.recipient_name.clone().unwrap_or_default(),
            email: self.recipient_email.clone().unwrap_or_default(),
            description: self.description.clone(),
            phone: None,
        })
    }
}

/// Body of a new friend request.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestDraft {
    pub recipient_email: String,
    pub description: String,
}

/// Answer to a pending friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendResponse {
    Accept,
    Reject,
}

impl FriendResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendResponse::Accept => "accept",
            FriendResponse::Reject => "reject",
        }
    }
}

/// Editable fields of an existing friend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FriendUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_requests_from_either_backend() {
        let camel: FriendRequest = serde_json::from_value(json!({
            "id": 4,
            "senderName": "Bob",
            "senderEmail": "bob@example.com",
            "status": "PENDING"
        }))
        .unwrap();
        let snake: FriendRequest = serde_json::from_value(json!({
            "id": "4",
            "sender_name": "Bob",
            "sender_email": "bob@example.com"
        }))
        .unwrap();

        assert_eq!(camel, snake);
    }

    #[test]
    fn only_accepted_requests_yield_a_friend() {
        let mut request = FriendRequest {
            recipient_name: Some("Carla".into()),
            recipient_email: Some("carla@example.com".into()),
            status: FriendRequestStatus::Pending,
            ..Default::default()
        };
        assert!(request.accepted_friend().is_none());

        request.status = FriendRequestStatus::Accepted;
        let friend = request.accepted_friend().unwrap();
        assert_eq!(friend.email, "carla@example.com");
    }
}
