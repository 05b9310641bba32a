//! HTTP client for the agenda backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::AgendaConfig;
use crate::contact::{Contact, ContactDraft};
use crate::date_range::DateRange;
use crate::dialect::Dialect;
use crate::error::{AgendaError, AgendaResult};
use crate::event::{EntityId, Event};
use crate::friend::{Friend, FriendRequest, FriendRequestDraft, FriendResponse, FriendUpdate};
use crate::itinerary::Itinerary;
use crate::normalize::{
    normalize_event, normalize_events, normalize_itineraries, normalize_itinerary, unwrap_envelope,
};
use crate::request::{EventBackend, EventDraft, ItineraryDraft, event_payload, itinerary_payload};
use crate::session::Session;
use crate::validation::{
    validate_contact, validate_credentials, validate_friend_request, validate_phone,
    validate_registration,
};

use super::error_body::error_for_status;
use super::routes;

/// Keys a login response may carry the token under.
const TOKEN_FIELDS: [&str; 3] = ["token", "accessToken", "access_token"];

#[derive(Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    pub token: String,
    /// Display name, when the backend includes the user.
    pub name: Option<String>,
}

/// REST client. Sends `Authorization: Bearer` whenever a token is held.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    dialect: Dialect,
    token: Option<String>,
}

impl Client {
    pub fn new(config: &AgendaConfig, session: &Session) -> AgendaResult<Self> {
        Self::build(
            &config.base_url,
            config.dialect,
            session.bearer().map(str::to_string),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn build(
        base_url: &str,
        dialect: Dialect,
        token: Option<String>,
        timeout: Duration,
    ) -> AgendaResult<Self> {
        url::Url::parse(base_url)
            .map_err(|e| AgendaError::Config(format!("Invalid base_url '{base_url}': {e}")))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            dialect,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AgendaResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Sending request");

        let mut req = self.http.request(method, &url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "Received response");

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
        };

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), &value));
        }

        Ok(value)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> AgendaResult<Value> {
        self.send(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> AgendaResult<Value> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> AgendaResult<Value> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> AgendaResult<()> {
        self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    // Auth

    /// POST /auth/register (or /register). Returns a token if the backend
    /// logs the new user in straight away.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AgendaResult<Option<AuthToken>> {
        validate_registration(name, email, password)?;

        let body = serde_json::to_value(Registration {
            name: name.trim(),
            email: email.trim(),
            password,
        })?;
        let resp = self.post(&routes::register(self.dialect), &body).await?;

        Ok(auth_token(&resp))
    }

    /// POST /auth/login (or /login)
    pub async fn login(&self, email: &str, password: &str) -> AgendaResult<AuthToken> {
        validate_credentials(email, password)?;

        let body = serde_json::to_value(Credentials {
            email: email.trim(),
            password,
        })?;
        let resp = self.post(&routes::login(self.dialect), &body).await?;

        auth_token(&resp).ok_or(AgendaError::MissingField("token"))
    }

    /// POST /auth/logout (or /logout)
    pub async fn logout(&self) -> AgendaResult<()> {
        self.send(Method::POST, &routes::logout(self.dialect), &[], None)
            .await?;
        Ok(())
    }

    // Events

    /// GET /events?start&end
    pub async fn list_events(&self, range: &DateRange) -> AgendaResult<Vec<Event>> {
        let resp = self.get(routes::EVENTS, &range.query()).await?;
        Ok(normalize_events(&resp))
    }

    /// POST /events
    pub async fn create_event(&self, draft: &EventDraft) -> AgendaResult<Event> {
        let body = event_payload(draft, self.dialect)?;
        let resp = self.post(routes::EVENTS, &body).await?;
        Ok(normalize_event(unwrap_envelope(&resp)))
    }

    /// PUT /events/:id
    pub async fn update_event(&self, id: &EntityId, draft: &EventDraft) -> AgendaResult<Event> {
        let body = event_payload(draft, self.dialect)?;
        let resp = self.put(&routes::event(id), &body).await?;

        let mut event = normalize_event(unwrap_envelope(&resp));
        event.id.get_or_insert_with(|| id.clone());
        Ok(event)
    }

    /// DELETE /events/:id
    pub async fn delete_event(&self, id: &EntityId) -> AgendaResult<()> {
        self.delete(&routes::event(id)).await
    }

    /// GET /events/friend/:id?start&end
    pub async fn friend_events(
        &self,
        friend_id: &EntityId,
        range: &DateRange,
    ) -> AgendaResult<Vec<Event>> {
        let resp = self.get(&routes::friend_events(friend_id), &range.query()).await?;
        Ok(normalize_events(&resp))
    }

    /// POST /event-requests/send?eventId&recipientId
    pub async fn share_event(&self, event_id: &EntityId, recipient_id: &EntityId) -> AgendaResult<()> {
        let query = [
            ("eventId", event_id.to_string()),
            ("recipientId", recipient_id.to_string()),
        ];
        self.send(Method::POST, routes::SHARE_EVENT, &query, None).await?;
        Ok(())
    }

    // Itineraries

    /// GET /itineraries?start&end
    pub async fn list_itineraries(&self, range: &DateRange) -> AgendaResult<Vec<Itinerary>> {
        let resp = self.get(routes::ITINERARIES, &range.query()).await?;
        Ok(normalize_itineraries(&resp))
    }

    /// POST /itineraries
    pub async fn create_itinerary(
        &self,
        draft: &ItineraryDraft,
        event_ids: &[EntityId],
    ) -> AgendaResult<Itinerary> {
        let body = itinerary_payload(draft, event_ids, self.dialect)?;
        let resp = self.post(routes::ITINERARIES, &body).await?;
        Ok(normalize_itinerary(unwrap_envelope(&resp)))
    }

    /// PUT /itineraries/:id
    pub async fn update_itinerary(
        &self,
        id: &EntityId,
        draft: &ItineraryDraft,
        event_ids: &[EntityId],
    ) -> AgendaResult<Itinerary> {
        let body = itinerary_payload(draft, event_ids, self.dialect)?;
        let resp = self.put(&routes::itinerary(id), &body).await?;

        let mut itinerary = normalize_itinerary(unwrap_envelope(&resp));
        itinerary.id.get_or_insert_with(|| id.clone());
        Ok(itinerary)
    }

    /// DELETE /itineraries/:id
    pub async fn delete_itinerary(&self, id: &EntityId) -> AgendaResult<()> {
        self.delete(&routes::itinerary(id)).await
    }

    // Contacts

    /// GET /contacts
    pub async fn list_contacts(&self) -> AgendaResult<Vec<Contact>> {
        let resp = self.get(routes::CONTACTS, &[]).await?;
        parse_list(&resp)
    }

    /// POST /contacts
    pub async fn create_contact(&self, draft: &ContactDraft) -> AgendaResult<Contact> {
        validate_contact(draft)?;
        let resp = self.post(routes::CONTACTS, &serde_json::to_value(draft)?).await?;
        parse_saved(&resp, || contact_from_draft(None, draft))
    }

    /// PUT /contacts/:id
    pub async fn update_contact(&self, id: &EntityId, draft: &ContactDraft) -> AgendaResult<Contact> {
        validate_contact(draft)?;
        let resp = self
            .put(&routes::contact(id), &serde_json::to_value(draft)?)
            .await?;
        parse_saved(&resp, || contact_from_draft(Some(id.clone()), draft))
    }

    /// DELETE /contacts/:id
    pub async fn delete_contact(&self, id: &EntityId) -> AgendaResult<()> {
        self.delete(&routes::contact(id)).await
    }

    // Friends

    /// GET /friends
    pub async fn list_friends(&self) -> AgendaResult<Vec<Friend>> {
        let resp = self.get(routes::FRIENDS, &[]).await?;
        parse_list(&resp)
    }

    /// GET /friends/pending: requests waiting for our answer
    pub async fn pending_requests(&self) -> AgendaResult<Vec<FriendRequest>> {
        let resp = self.get(routes::FRIENDS_PENDING, &[]).await?;
        parse_list(&resp)
    }

    /// GET /friends/sent
    pub async fn sent_requests(&self) -> AgendaResult<Vec<FriendRequest>> {
        let resp = self.get(routes::FRIENDS_SENT, &[]).await?;
        parse_list(&resp)
    }

    /// POST /friends/request
    pub async fn send_friend_request(&self, draft: &FriendRequestDraft) -> AgendaResult<()> {
        validate_friend_request(draft)?;
        let draft = FriendRequestDraft {
            recipient_email: draft.recipient_email.trim().to_string(),
            description: draft.description.clone(),
        };
        self.post(routes::FRIEND_REQUEST, &serde_json::to_value(&draft)?)
            .await?;
        Ok(())
    }

    /// POST /friends/respond/:id?response=accept|reject
    pub async fn respond_friend_request(
        &self,
        request_id: &EntityId,
        response: FriendResponse,
    ) -> AgendaResult<()> {
        let query = [("response", response.as_str().to_string())];
        self.send(
            Method::POST,
            &routes::friend_respond(request_id),
            &query,
            None,
        )
        .await?;
        Ok(())
    }

    /// DELETE /friends/:id
    pub async fn remove_friend(&self, id: &EntityId) -> AgendaResult<()> {
        self.delete(&routes::friend(id)).await
    }

    /// PUT /friends/:id
    pub async fn update_friend(&self, id: &EntityId, update: &FriendUpdate) -> AgendaResult<Option<Friend>> {
        if let Some(phone) = &update.phone {
            validate_phone(phone)?;
        }
        let resp = self
            .put(&routes::friend(id), &serde_json::to_value(update)?)
            .await?;

        match unwrap_envelope(&resp) {
            value @ Value::Object(_) => Ok(Some(serde_json::from_value(value.clone())?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl EventBackend for Client {
    async fn create_event(&self, draft: &EventDraft) -> AgendaResult<Event> {
        Client::create_event(self, draft).await
    }

    async fn create_itinerary(
        &self,
        draft: &ItineraryDraft,
        event_ids: &[EntityId],
    ) -> AgendaResult<Itinerary> {
        Client::create_itinerary(self, draft, event_ids).await
    }

    async fn update_itinerary(
        &self,
        id: &EntityId,
        draft: &ItineraryDraft,
        event_ids: &[EntityId],
    ) -> AgendaResult<Itinerary> {
        Client::update_itinerary(self, id, draft, event_ids).await
    }
}

/// Token and user name from a login or register response, looking inside a
/// `data` envelope too.
pub fn auth_token(resp: &Value) -> Option<AuthToken> {
    let scopes = [resp, unwrap_envelope(resp)];

    let token = scopes.iter().find_map(|scope| {
        TOKEN_FIELDS
            .iter()
            .find_map(|key| scope.get(key).and_then(Value::as_str))
            .filter(|t| !t.is_empty())
    })?;

    let name = scopes.iter().find_map(|scope| {
        scope
            .get("user")
            .and_then(|user| user.get("name"))
            .or_else(|| scope.get("name"))
            .and_then(Value::as_str)
    });

    Some(AuthToken {
        token: token.to_string(),
        name: name.map(str::to_string),
    })
}

fn parse_list<T: DeserializeOwned>(resp: &Value) -> AgendaResult<Vec<T>> {
    match unwrap_envelope(resp) {
        Value::Array(items) => items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).map_err(AgendaError::from))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(AgendaError::Serialization("expected a list".into())),
    }
}

/// Parse the saved record, or fall back when the backend answers without a body.
fn parse_saved<T: DeserializeOwned>(resp: &Value, fallback: impl FnOnce() -> T) -> AgendaResult<T> {
    match unwrap_envelope(resp) {
        value @ Value::Object(_) => Ok(serde_json::from_value(value.clone())?),
        _ => Ok(fallback()),
    }
}

fn contact_from_draft(id: Option<EntityId>, draft: &ContactDraft) -> Contact {
    Contact {
        id,
        name: draft.name.clone(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        notes: draft.notes.clone(),
    }
}
