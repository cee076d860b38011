//! Contact endpoints under `/api/contacts`.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::Client;
use crate::decode::{decode, Json, NoContent};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::{edit_method, path_with_query};
use crate::types::{Contact, ListParams, Listing};

const ROOT: &str = "/api/contacts";

#[derive(Deserialize)]
struct ContactResponse {
    contact: Contact,
}

#[derive(Deserialize)]
struct ContactListResponse {
    #[serde(default)]
    contacts: Listing<Contact>,
}

/// Payload for creating or editing a contact.
///
/// Custom field values go in `fields` keyed by field alias (`firstname`,
/// `email`, ...). They are sent as top-level keys next to the optional
/// settings below, which win over a field of the same name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactParams {
    /// Target of an edit; never sent in the body.
    pub id: Option<u64>,
    pub fields: Map<String, Value>,
    pub ip_address: Option<String>,
    /// `Y-m-d H:i:s` in UTC.
    pub last_active: Option<String>,
    /// Id of the owning user.
    pub owner: Option<u64>,
    /// Let empty values in `fields` clear existing values.
    pub overwrite_with_blank: Option<bool>,
}

impl ContactParams {
    pub fn with_field(mut self, alias: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(alias.into(), value.into());
        self
    }

    /// The JSON object sent to the server.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = self.fields.clone();
        if let Some(ip) = &self.ip_address {
            payload.insert("ipAddress".to_string(), Value::from(ip.as_str()));
        }
        if let Some(last_active) = &self.last_active {
            payload.insert("lastActive".to_string(), Value::from(last_active.as_str()));
        }
        if let Some(owner) = self.owner {
            payload.insert("owner".to_string(), Value::from(owner));
        }
        if let Some(overwrite) = self.overwrite_with_blank {
            payload.insert("overwriteWithBlank".to_string(), Value::from(overwrite));
        }
        payload
    }
}

impl Client {
    pub fn build_get_contact(&self, id: u64) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Get, &format!("{ROOT}/{id}"))
    }

    pub fn parse_get_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        decode::<Json, ContactResponse>(&response).map(|r| r.contact)
    }

    /// Fetch one contact by id.
    pub fn get_contact(&self, id: u64) -> Result<Contact, ApiError> {
        self.send::<Json, ContactResponse>(self.build_get_contact(id)).map(|r| r.contact)
    }

    pub fn build_list_contacts(&self, params: &ListParams) -> HttpRequest {
        let path = path_with_query(ROOT, &params.to_query());
        self.request_builder().build_empty(HttpMethod::Get, &path)
    }

    /// Contacts in unspecified order.
    pub fn parse_list_contacts(&self, response: HttpResponse) -> Result<Vec<Contact>, ApiError> {
        decode::<Json, ContactListResponse>(&response).map(|r| r.contacts.into_vec())
    }

    /// List contacts matching `params`. The result order is unspecified.
    pub fn list_contacts(&self, params: &ListParams) -> Result<Vec<Contact>, ApiError> {
        self.send::<Json, ContactListResponse>(self.build_list_contacts(params))
            .map(|r| r.contacts.into_vec())
    }

    pub fn build_create_contact(&self, params: &ContactParams) -> Result<HttpRequest, ApiError> {
        self.request_builder()
            .build(HttpMethod::Post, &format!("{ROOT}/new"), Some(&params.payload()))
    }

    pub fn parse_create_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        self.parse_get_contact(response)
    }

    /// Create a contact. When the server matches an existing contact (by a
    /// unique identifier field) it returns that contact instead.
    pub fn create_contact(&self, params: &ContactParams) -> Result<Contact, ApiError> {
        self.send::<Json, ContactResponse>(self.build_create_contact(params)?).map(|r| r.contact)
    }

    pub fn build_create_contacts(&self, params: &[ContactParams]) -> Result<HttpRequest, ApiError> {
        let payload: Vec<Map<String, Value>> = params.iter().map(ContactParams::payload).collect();
        self.request_builder()
            .build(HttpMethod::Post, &format!("{ROOT}/new"), Some(&payload))
    }

    pub fn parse_create_contacts(&self, response: HttpResponse) -> Result<Vec<Contact>, ApiError> {
        self.parse_list_contacts(response)
    }

    /// Create several contacts in one request. Per-item failures are reported
    /// however the server reports them; nothing is reconciled here.
    pub fn create_contacts(&self, params: &[ContactParams]) -> Result<Vec<Contact>, ApiError> {
        self.send::<Json, ContactListResponse>(self.build_create_contacts(params)?)
            .map(|r| r.contacts.into_vec())
    }

    /// `PATCH` edits an existing contact; with `create_if_not_exists` the
    /// request is a `PUT` that creates or replaces it.
    pub fn build_edit_contact(
        &self,
        params: &ContactParams,
        create_if_not_exists: bool,
    ) -> Result<HttpRequest, ApiError> {
        let id = params.id.ok_or(ApiError::InvalidId("contact"))?;
        self.request_builder().build(
            edit_method(create_if_not_exists),
            &format!("{ROOT}/{id}/edit"),
            Some(&params.payload()),
        )
    }

    pub fn parse_edit_contact(&self, response: HttpResponse) -> Result<Contact, ApiError> {
        self.parse_get_contact(response)
    }

    pub fn edit_contact(
        &self,
        params: &ContactParams,
        create_if_not_exists: bool,
    ) -> Result<Contact, ApiError> {
        self.send::<Json, ContactResponse>(self.build_edit_contact(params, create_if_not_exists)?)
            .map(|r| r.contact)
    }

    pub fn build_delete_contact(&self, id: u64) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Delete, &format!("{ROOT}/{id}/delete"))
    }

    pub fn parse_delete_contact(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode::<NoContent, ()>(&response)
    }

    pub fn delete_contact(&self, id: u64) -> Result<(), ApiError> {
        self.send::<NoContent, ()>(self.build_delete_contact(id))
    }
}
