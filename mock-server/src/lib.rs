//! In-memory stand-in for the parts of the Mautic REST API the client uses.
//!
//! Entities are stored as JSON objects keyed by id. Responses use Mautic's
//! wrapper shapes (`{"contact": ...}`, `{"total": n, "hooks": {...}}`) and its
//! error body (`{"errors": [{"message", "code", "type"}]}`). Every route is
//! behind HTTP Basic auth.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_USER: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "secret";

type Object = Map<String, Value>;

/// Keys of a contact payload that are settings rather than field values.
const CONTACT_SETTINGS: [&str; 4] = ["ipAddress", "lastActive", "owner", "overwriteWithBlank"];

#[derive(Default)]
pub struct Store {
    next_id: u64,
    contacts: BTreeMap<u64, Object>,
    fields: BTreeMap<(String, u64), Object>,
    hooks: BTreeMap<u64, Object>,
}

impl Store {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Keep generated ids ahead of an id chosen by the caller (PUT).
    fn reserve(&mut self, id: u64) {
        self.next_id = self.next_id.max(id);
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    credentials: Arc<String>,
}

pub fn app() -> Router {
    app_with_credentials(DEFAULT_USER, DEFAULT_PASSWORD)
}

/// Router accepting only `user`/`password` as Basic credentials.
pub fn app_with_credentials(user: &str, password: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        credentials: Arc::new(format!("{user}:{password}")),
    };
    Router::new()
        .route("/api/contacts", get(list_contacts))
        .route("/api/contacts/new", post(create_contacts))
        .route("/api/contacts/{id}", get(get_contact))
        .route("/api/contacts/{id}/edit", patch(edit_contact).put(replace_contact))
        .route("/api/contacts/{id}/delete", delete(delete_contact))
        .route("/fields/{object}", get(list_fields))
        .route("/fields/{object}/new", post(create_field))
        .route("/fields/{object}/{id}", get(get_field))
        .route("/fields/{object}/{id}/edit", patch(edit_field).put(replace_field))
        .route("/fields/{object}/{id}/delete", delete(delete_field))
        .route("/hooks", get(list_hooks))
        .route("/hooks/new", post(create_hook))
        .route("/hooks/triggers", get(list_triggers))
        .route("/hooks/{id}", get(get_hook))
        .route("/hooks/{id}/edit", patch(edit_hook).put(replace_hook))
        .route("/hooks/{id}/delete", delete(delete_hook))
        .layer(middleware::from_fn_with_state(state.clone(), require_basic_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_credentials(
    listener: TcpListener,
    user: &str,
    password: &str,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_credentials(user, password)).await
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

/// An error in Mautic's response format.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Item was not found.")
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = json!({
            "errors": [{"message": self.message, "code": self.status.as_u16(), "type": null}]
        });
        (self.status, Json(body)).into_response()
    }
}

type Reply = Result<(StatusCode, Json<Value>), ApiFailure>;

async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .is_some_and(|decoded| decoded == state.credentials.as_bytes());
    if !authorized {
        tracing::warn!(uri = %request.uri(), "rejected credentials");
        return ApiFailure::new(StatusCode::UNAUTHORIZED, "API authorization denied.")
            .into_response();
    }
    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub start: Option<usize>,
    pub limit: Option<usize>,
}

impl ListQuery {
    fn page<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        items
            .skip(self.start.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn as_object(payload: Value) -> Result<Object, ApiFailure> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiFailure::bad_request("Request body must be a JSON object.")),
    }
}

fn require_string(payload: &Object, key: &str) -> Result<(), ApiFailure> {
    match payload.get(key).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(()),
        _ => Err(ApiFailure::bad_request(format!("{key}: A value is required."))),
    }
}

fn merge(target: &mut Object, changes: Object) {
    for (k, v) in changes {
        target.insert(k, v);
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

fn contact_record(id: u64, mut payload: Object) -> Object {
    let ip = payload.get("ipAddress").and_then(Value::as_str).map(str::to_string);
    for key in CONTACT_SETTINGS {
        payload.remove(key);
    }
    let points = payload.get("points").and_then(Value::as_i64).unwrap_or(0);
    payload.insert("id".to_string(), json!(id));

    let mut ip_addresses = Object::new();
    if let Some(ip) = ip {
        ip_addresses.insert(ip.clone(), json!({"ipAddress": ip, "ipDetails": {}}));
    }

    let mut record = Object::new();
    record.insert("id".to_string(), json!(id));
    record.insert("points".to_string(), json!(points));
    record.insert("dateAdded".to_string(), json!(now()));
    record.insert("dateModified".to_string(), Value::Null);
    record.insert("lastActive".to_string(), Value::Null);
    record.insert("ipAddresses".to_string(), Value::Object(ip_addresses));
    record.insert("fields".to_string(), json!({"all": payload}));
    record.insert("tags".to_string(), json!([]));
    record.insert("utmtags".to_string(), json!([]));
    record.insert("doNotContact".to_string(), json!([]));
    record
}

fn contact_field<'a>(contact: &'a Object, alias: &str) -> Option<&'a Value> {
    contact.get("fields")?.get("all")?.get(alias)
}

/// Create one contact, or return the existing one with the same email.
fn upsert_contact(store: &mut Store, payload: Object) -> (StatusCode, Object) {
    if let Some(email) = payload.get("email").filter(|e| !e.is_null()) {
        if let Some(existing) = store
            .contacts
            .values()
            .find(|c| contact_field(c, "email") == Some(email))
        {
            return (StatusCode::OK, existing.clone());
        }
    }
    let id = store.allocate();
    let record = contact_record(id, payload);
    store.contacts.insert(id, record.clone());
    (StatusCode::CREATED, record)
}

fn contact_matches(contact: &Object, search: &str) -> bool {
    let Some(Value::Object(all)) = contact.get("fields").and_then(|f| f.get("all")) else {
        return false;
    };
    all.values()
        .filter_map(Value::as_str)
        .any(|v| v.contains(search))
}

async fn list_contacts(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Reply {
    let store = state.db.read().await;
    let matching: Vec<(&u64, &Object)> = store
        .contacts
        .iter()
        .filter(|(_, c)| query.search.as_deref().map_or(true, |s| contact_matches(c, s)))
        .collect();
    let total = matching.len();
    let page: Map<String, Value> = query
        .page(matching.into_iter())
        .into_iter()
        .map(|(id, c)| (id.to_string(), Value::Object(c.clone())))
        .collect();
    Ok((StatusCode::OK, Json(json!({"total": total, "contacts": page}))))
}

async fn create_contacts(State(state): State<AppState>, Json(payload): Json<Value>) -> Reply {
    let mut store = state.db.write().await;
    if let Value::Array(items) = payload {
        let mut contacts = Vec::with_capacity(items.len());
        let mut status_codes = Vec::with_capacity(items.len());
        for item in items {
            let (status, record) = upsert_contact(&mut store, as_object(item)?);
            contacts.push(Value::Object(record));
            status_codes.push(status.as_u16());
        }
        let body = json!({"contacts": contacts, "statusCodes": status_codes});
        return Ok((StatusCode::CREATED, Json(body)));
    }
    let (status, record) = upsert_contact(&mut store, as_object(payload)?);
    Ok((status, Json(json!({"contact": record}))))
}

async fn get_contact(State(state): State<AppState>, Path(id): Path<u64>) -> Reply {
    let store = state.db.read().await;
    let contact = store.contacts.get(&id).ok_or_else(ApiFailure::not_found)?;
    Ok((StatusCode::OK, Json(json!({"contact": contact}))))
}

async fn edit_contact(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<Value>,
) -> Reply {
    let mut changes = as_object(payload)?;
    for key in CONTACT_SETTINGS {
        changes.remove(key);
    }
    let mut store = state.db.write().await;
    let contact = store.contacts.get_mut(&id).ok_or_else(ApiFailure::not_found)?;
    if let Some(points) = changes.get("points").and_then(Value::as_i64) {
        contact.insert("points".to_string(), json!(points));
    }
    if let Some(Value::Object(all)) = contact.get_mut("fields").and_then(|f| f.get_mut("all")) {
        merge(all, changes);
    }
    contact.insert("dateModified".to_string(), json!(now()));
    Ok((StatusCode::OK, Json(json!({"contact": contact}))))
}

async fn replace_contact(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<Value>,
) -> Reply {
    let payload = as_object(payload)?;
    let mut store = state.db.write().await;
    store.reserve(id);
    let status = if store.contacts.contains_key(&id) {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let record = contact_record(id, payload);
    store.contacts.insert(id, record.clone());
    Ok((status, Json(json!({"contact": record}))))
}

async fn delete_contact(State(state): State<AppState>, Path(id): Path<u64>) -> Reply {
    let mut store = state.db.write().await;
    let contact = store.contacts.remove(&id).ok_or_else(ApiFailure::not_found)?;
    Ok((StatusCode::OK, Json(json!({"contact": contact}))))
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

fn field_object(object: &str) -> Result<String, ApiFailure> {
    match object {
        "contact" | "company" => Ok(object.to_string()),
        other => Err(ApiFailure::bad_request(format!("Unknown field object {other}."))),
    }
}

fn field_record(id: u64, object: &str, mut payload: Object) -> Result<Object, ApiFailure> {
    require_string(&payload, "label")?;
    // Stored as 0/1 like the real server.
    let unique = payload
        .get("isUniqueIdentifier")
        .is_some_and(|v| v.as_bool() == Some(true) || v.as_i64() == Some(1));
    payload.remove("description");
    payload.insert("isUniqueIdentifier".to_string(), json!(i64::from(unique)));
    payload.insert("id".to_string(), json!(id));
    payload.insert("object".to_string(), json!(object));
    payload.insert("isPublished".to_string(), json!(true));
    payload.insert("dateAdded".to_string(), json!(now()));
    payload.insert("dateModified".to_string(), Value::Null);
    Ok(payload)
}

async fn list_fields(
    State(state): State<AppState>,
    Path(object): Path<String>,
    Query(query): Query<ListQuery>,
) -> Reply {
    let object = field_object(&object)?;
    let store = state.db.read().await;
    let matching: Vec<&Object> = store
        .fields
        .iter()
        .filter(|((o, _), _)| *o == object)
        .map(|(_, f)| f)
        .filter(|f| {
            query.search.as_deref().map_or(true, |s| {
                ["label", "alias"]
                    .iter()
                    .any(|k| f.get(*k).and_then(Value::as_str).is_some_and(|v| v.contains(s)))
            })
        })
        .collect();
    let total = matching.len();
    let page = query.page(matching.into_iter());
    Ok((StatusCode::OK, Json(json!({"total": total, "fields": page}))))
}

async fn create_field(
    State(state): State<AppState>,
    Path(object): Path<String>,
    Json(payload): Json<Value>,
) -> Reply {
    let object = field_object(&object)?;
    let payload = as_object(payload)?;
    let mut store = state.db.write().await;
    let id = store.allocate();
    let record = field_record(id, &object, payload)?;
    store.fields.insert((object, id), record.clone());
    Ok((StatusCode::CREATED, Json(json!({"field": record}))))
}

async fn get_field(State(state): State<AppState>, Path((object, id)): Path<(String, u64)>) -> Reply {
    let object = field_object(&object)?;
    let store = state.db.read().await;
    let field = store.fields.get(&(object, id)).ok_or_else(ApiFailure::not_found)?;
    Ok((StatusCode::OK, Json(json!({"field": field}))))
}

async fn edit_field(
    State(state): State<AppState>,
    Path((object, id)): Path<(String, u64)>,
    Json(payload): Json<Value>,
) -> Reply {
    let object = field_object(&object)?;
    let mut changes = as_object(payload)?;
    for key in ["id", "object", "description"] {
        changes.remove(key);
    }
    let mut store = state.db.write().await;
    let field = store
        .fields
        .get_mut(&(object, id))
        .ok_or_else(ApiFailure::not_found)?;
    if let Some(unique) = changes.remove("isUniqueIdentifier") {
        let unique = unique.as_bool() == Some(true) || unique.as_i64() == Some(1);
        field.insert("isUniqueIdentifier".to_string(), json!(i64::from(unique)));
    }
    merge(field, changes);
    field.insert("dateModified".to_string(), json!(now()));
    Ok((StatusCode::OK, Json(json!({"field": field}))))
}

async fn replace_field(
    State(state): State<AppState>,
    Path((object, id)): Path<(String, u64)>,
    Json(payload): Json<Value>,
) -> Reply {
    let object = field_object(&object)?;
    let record = field_record(id, &object, as_object(payload)?)?;
    let mut store = state.db.write().await;
    store.reserve(id);
    let key = (object, id);
    let status = if store.fields.contains_key(&key) {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    store.fields.insert(key, record.clone());
    Ok((status, Json(json!({"field": record}))))
}

async fn delete_field(
    State(state): State<AppState>,
    Path((object, id)): Path<(String, u64)>,
) -> Reply {
    let object = field_object(&object)?;
    let mut store = state.db.write().await;
    let field = store
        .fields
        .remove(&(object, id))
        .ok_or_else(ApiFailure::not_found)?;
    Ok((StatusCode::OK, Json(json!({"field": field}))))
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

/// Events offered by `/hooks/triggers`.
pub const TRIGGERS: [(&str, &str, &str); 4] = [
    (
        "mautic.lead_post_save_new",
        "Contact Created Event",
        "Triggered when a new contact is created.",
    ),
    (
        "mautic.lead_post_save_update",
        "Contact Updated Event",
        "Triggered when a contact is updated.",
    ),
    (
        "mautic.lead_post_delete",
        "Contact Delete Event",
        "Triggered when a contact is deleted.",
    ),
    (
        "mautic.lead_points_change",
        "Contact Points Changed Event",
        "Triggered when a contact's points change.",
    ),
];

fn hook_record(id: u64, mut payload: Object) -> Result<Object, ApiFailure> {
    require_string(&payload, "name")?;
    require_string(&payload, "webhookUrl")?;
    if payload.get("secret").map_or(true, Value::is_null) {
        payload.insert("secret".to_string(), json!(format!("whsec-{id:08}")));
    }
    payload.insert("id".to_string(), json!(id));
    payload.insert("isPublished".to_string(), json!(true));
    payload.insert("dateAdded".to_string(), json!(now()));
    payload.insert("dateModified".to_string(), Value::Null);
    payload.insert("category".to_string(), Value::Null);
    Ok(payload)
}

async fn list_hooks(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Reply {
    let store = state.db.read().await;
    let total = store.hooks.len();
    let page: Map<String, Value> = query
        .page(store.hooks.iter())
        .into_iter()
        .map(|(id, h)| (id.to_string(), Value::Object(h.clone())))
        .collect();
    Ok((StatusCode::OK, Json(json!({"total": total, "hooks": page}))))
}

async fn list_triggers() -> Reply {
    let triggers: Map<String, Value> = TRIGGERS
        .iter()
        .map(|(name, label, description)| {
            (name.to_string(), json!({"label": label, "description": description}))
        })
        .collect();
    Ok((StatusCode::OK, Json(json!({"triggers": triggers}))))
}

async fn create_hook(State(state): State<AppState>, Json(payload): Json<Value>) -> Reply {
    let mut payload = as_object(payload)?;
    payload.remove("id");
    let mut store = state.db.write().await;
    let id = store.allocate();
    let record = hook_record(id, payload)?;
    store.hooks.insert(id, record.clone());
    Ok((StatusCode::CREATED, Json(json!({"hook": record}))))
}

async fn get_hook(State(state): State<AppState>, Path(id): Path<u64>) -> Reply {
    let store = state.db.read().await;
    let hook = store.hooks.get(&id).ok_or_else(ApiFailure::not_found)?;
    Ok((StatusCode::OK, Json(json!({"hook": hook}))))
}

async fn edit_hook(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<Value>,
) -> Reply {
    let mut changes = as_object(payload)?;
    changes.remove("id");
    // A null secret in an edit keeps the current one.
    if changes.get("secret").is_some_and(Value::is_null) {
        changes.remove("secret");
    }
    let mut store = state.db.write().await;
    let hook = store.hooks.get_mut(&id).ok_or_else(ApiFailure::not_found)?;
    merge(hook, changes);
    hook.insert("dateModified".to_string(), json!(now()));
    Ok((StatusCode::OK, Json(json!({"hook": hook}))))
}

async fn replace_hook(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<Value>,
) -> Reply {
    let mut payload = as_object(payload)?;
    payload.remove("id");
    let record = hook_record(id, payload)?;
    let mut store = state.db.write().await;
    store.reserve(id);
    let status = if store.hooks.contains_key(&id) {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    store.hooks.insert(id, record.clone());
    Ok((status, Json(json!({"hook": record}))))
}

async fn delete_hook(State(state): State<AppState>, Path(id): Path<u64>) -> Reply {
    let mut store = state.db.write().await;
    let hook = store.hooks.remove(&id).ok_or_else(ApiFailure::not_found)?;
    Ok((StatusCode::OK, Json(json!({"hook": hook}))))
}
