//! Address-book contacts.

use serde::{Deserialize, Deserializer, Serialize};

use crate::event::EntityId;

/// A contact as returned by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "note", deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
}

/// Fields of the contact form, sent on create and update.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&Contact> for ContactDraft {
    fn from(contact: &Contact) -> Self {
        ContactDraft {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            notes: contact.notes.clone(),
        }
    }
}

/// Deserialize an optional string, mapping `null` and blank strings to `None`.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
