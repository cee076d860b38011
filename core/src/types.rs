//! Entity records and shared request shapes for the Mautic API.
//!
//! # Design
//! Records mirror the server's JSON and enforce nothing: validation is the
//! server's job. Every record defaults absent keys, and keys the server may
//! send as `null` are `Option`, so a sparse payload such as
//! `{"id":42,"points":10}` still decodes.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// A contact (lead) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    pub date_added: Option<DateTime<Utc>>,
    pub created_by: Option<u64>,
    pub created_by_user: Option<String>,
    pub date_modified: Option<DateTime<Utc>>,
    pub modified_by: Option<u64>,
    pub modified_by_user: Option<String>,
    pub owner: Option<ContactOwner>,
    pub points: i64,
    pub last_active: Option<DateTime<Utc>>,
    pub date_identified: Option<DateTime<Utc>>,
    pub color: Option<String>,
    /// Keyed by IP address.
    pub ip_addresses: HashMap<String, IpAddress>,
    /// Custom field values as sent by the server (grouped, free-form).
    pub fields: Value,
    #[serde(rename = "utmtags")]
    pub utm_tags: Vec<UtmTag>,
    pub tags: Vec<Tag>,
    pub do_not_contact: Vec<DoNotContact>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactOwner {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpAddress {
    pub ip_address: String,
    pub ip_details: IpDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpDetails {
    pub city: String,
    pub region: String,
    pub country: String,
    pub latitude: String,
    pub longitude: String,
    pub isp: String,
    pub organization: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UtmTag {
    pub id: u64,
    pub query: UtmQuery,
    pub referer: Option<String>,
    pub remote_host: Option<String>,
    pub user_agent: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_source: Option<String>,
    pub utm_term: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtmQuery {
    pub page: Option<String>,
    pub cid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DoNotContact {
    pub id: u64,
    pub reason: i64,
    pub comments: Option<String>,
    pub channel: String,
    pub channel_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Which entity a custom field belongs to; also the URL segment under
/// `/fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldObject {
    Contact,
    Company,
}

impl FieldObject {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldObject::Contact => "contact",
            FieldObject::Company => "company",
        }
    }
}

/// A custom field definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Field {
    pub is_published: bool,
    pub date_added: Option<DateTime<Utc>>,
    pub created_by: Option<u64>,
    pub created_by_user: Option<String>,
    pub date_modified: Option<DateTime<Utc>>,
    pub modified_by: Option<u64>,
    pub modified_by_user: Option<String>,
    pub id: u64,
    pub label: String,
    pub alias: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub group: Option<String>,
    pub order: i64,
    pub object: String,
    pub default_value: Value,
    pub is_required: bool,
    pub is_publicly_updatable: bool,
    /// The server sends this as `0`/`1`.
    pub is_unique_identifier: i64,
    pub properties: Option<FieldProperties>,
}

/// Choices of a select/boolean style field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldProperties {
    pub list: Vec<FieldChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldChoice {
    pub label: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

/// A webhook subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Webhook {
    pub is_published: bool,
    pub date_added: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub created_by: Option<u64>,
    pub created_by_user: Option<String>,
    pub modified_by: Option<u64>,
    pub modified_by_user: Option<String>,
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub webhook_url: String,
    pub secret: Option<String>,
    pub events_orderby_dir: Option<String>,
    pub category: Option<Category>,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    pub created_by_user: Option<String>,
    pub modified_by_user: Option<String>,
    pub id: u64,
    pub title: String,
    pub alias: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub bundle: String,
}

/// An event a webhook can subscribe to, e.g. `mautic.lead_post_save_new`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTrigger {
    pub name: String,
    pub label: String,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Filters accepted by list endpoints. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Search string or command, e.g. `email:jane@example.com`.
    pub search: Option<String>,
    /// Record number to start at.
    pub start: Option<u64>,
    /// Maximum number of records.
    pub limit: Option<u64>,
    pub order_by: Option<String>,
    /// `asc` or `desc`.
    pub order_by_dir: Option<String>,
    pub published_only: Option<bool>,
    pub minimal: Option<bool>,
}

impl ListParams {
    /// Query pairs in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(start) = self.start {
            pairs.push(("start", start.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("orderBy", order_by.clone()));
        }
        if let Some(dir) = &self.order_by_dir {
            pairs.push(("orderByDir", dir.clone()));
        }
        if let Some(published_only) = self.published_only {
            pairs.push(("publishedOnly", published_only.to_string()));
        }
        if let Some(minimal) = self.minimal {
            pairs.push(("minimal", minimal.to_string()));
        }
        pairs
    }
}

/// Entities of a list response. The server keys them by id, but sends a bare
/// array when the collection is empty (and for some resources always).
///
/// Decoded by looking at the JSON shape, so an entity that fails to decode
/// reports its own error instead of a generic shape mismatch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Listing<T> {
    Keyed(HashMap<String, T>),
    Sequence(Vec<T>),
}

impl<'de, T> Deserialize<'de> for Listing<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ListingVisitor(PhantomData))
    }
}

struct ListingVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for ListingVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = Listing<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of entities keyed by id or an array of entities")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entities = HashMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((id, entity)) = map.next_entry::<String, T>()? {
            entities.insert(id, entity);
        }
        Ok(Listing::Keyed(entities))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut entities = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(entity) = seq.next_element::<T>()? {
            entities.push(entity);
        }
        Ok(Listing::Sequence(entities))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Listing::default())
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Listing::Sequence(Vec::new())
    }
}

impl<T> Listing<T> {
    /// Flatten into a `Vec`. For keyed listings the order is unspecified;
    /// sort explicitly when it matters.
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Keyed(map) => map.into_values().collect(),
            Listing::Sequence(items) => items,
        }
    }
}
