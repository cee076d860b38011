//! Webhook endpoints under `/hooks`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::decode::{decode, Json, NoContent};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::edit_method;
use crate::types::{Listing, Webhook, WebhookTrigger};

const ROOT: &str = "/hooks";

#[derive(Deserialize)]
struct WebhookResponse {
    hook: Webhook,
}

#[derive(Deserialize)]
struct WebhookListResponse {
    #[serde(default)]
    hooks: Listing<Webhook>,
}

#[derive(Deserialize)]
struct TriggerListResponse {
    #[serde(default)]
    triggers: HashMap<String, TriggerInfo>,
}

#[derive(Deserialize)]
struct TriggerInfo {
    #[serde(default)]
    label: String,
    #[serde(default)]
    description: String,
}

/// Payload for creating or editing a webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookParams {
    /// Target of an edit; sent only when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub description: String,
    pub webhook_url: String,
    /// Signing secret; the server generates one when `null`.
    pub secret: Option<String>,
    /// `ASC` or `DESC`.
    pub events_orderby_dir: String,
    /// Trigger names, see [`Client::list_webhook_triggers`].
    pub triggers: Vec<String>,
}

fn into_triggers(listing: TriggerListResponse) -> Vec<WebhookTrigger> {
    listing
        .triggers
        .into_iter()
        .map(|(name, info)| WebhookTrigger {
            name,
            label: info.label,
            description: info.description,
        })
        .collect()
}

impl Client {
    pub fn build_get_webhook(&self, id: u64) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Get, &format!("{ROOT}/{id}"))
    }

    pub fn parse_get_webhook(&self, response: HttpResponse) -> Result<Webhook, ApiError> {
        decode::<Json, WebhookResponse>(&response).map(|r| r.hook)
    }

    pub fn get_webhook(&self, id: u64) -> Result<Webhook, ApiError> {
        self.send::<Json, WebhookResponse>(self.build_get_webhook(id)).map(|r| r.hook)
    }

    pub fn build_list_webhooks(&self) -> HttpRequest {
        self.request_builder().build_empty(HttpMethod::Get, ROOT)
    }

    pub fn parse_list_webhooks(&self, response: HttpResponse) -> Result<Vec<Webhook>, ApiError> {
        decode::<Json, WebhookListResponse>(&response).map(|r| r.hooks.into_vec())
    }

    /// All webhooks, in unspecified order.
    pub fn list_webhooks(&self) -> Result<Vec<Webhook>, ApiError> {
        self.send::<Json, WebhookListResponse>(self.build_list_webhooks())
            .map(|r| r.hooks.into_vec())
    }

    pub fn build_create_webhook(&self, params: &WebhookParams) -> Result<HttpRequest, ApiError> {
        self.request_builder()
            .build(HttpMethod::Post, &format!("{ROOT}/new"), Some(params))
    }

    pub fn parse_create_webhook(&self, response: HttpResponse) -> Result<Webhook, ApiError> {
        self.parse_get_webhook(response)
    }

    pub fn create_webhook(&self, params: &WebhookParams) -> Result<Webhook, ApiError> {
        self.send::<Json, WebhookResponse>(self.build_create_webhook(params)?).map(|r| r.hook)
    }

    /// `PATCH` edits an existing webhook; with `create_if_not_exists` the
    /// request is a `PUT` that creates or replaces it.
    pub fn build_edit_webhook(
        &self,
        params: &WebhookParams,
        create_if_not_exists: bool,
    ) -> Result<HttpRequest, ApiError> {
        let id = params.id.ok_or(ApiError::InvalidId("webhook"))?;
        self.request_builder().build(
            edit_method(create_if_not_exists),
            &format!("{ROOT}/{id}/edit"),
            Some(params),
        )
    }

    pub fn parse_edit_webhook(&self, response: HttpResponse) -> Result<Webhook, ApiError> {
        self.parse_get_webhook(response)
    }

    pub fn edit_webhook(
        &self,
        params: &WebhookParams,
        create_if_not_exists: bool,
    ) -> Result<Webhook, ApiError> {
        self.send::<Json, WebhookResponse>(self.build_edit_webhook(params, create_if_not_exists)?)
            .map(|r| r.hook)
    }

    pub fn build_delete_webhook(&self, id: u64) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Delete, &format!("{ROOT}/{id}/delete"))
    }

    pub fn parse_delete_webhook(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode::<NoContent, ()>(&response)
    }

    pub fn delete_webhook(&self, id: u64) -> Result<(), ApiError> {
        self.send::<NoContent, ()>(self.build_delete_webhook(id))
    }

    pub fn build_list_webhook_triggers(&self) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Get, &format!("{ROOT}/triggers"))
    }

    pub fn parse_list_webhook_triggers(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<WebhookTrigger>, ApiError> {
        decode::<Json, TriggerListResponse>(&response).map(into_triggers)
    }

    /// Events a webhook can subscribe to, in unspecified order.
    pub fn list_webhook_triggers(&self) -> Result<Vec<WebhookTrigger>, ApiError> {
        self.send::<Json, TriggerListResponse>(self.build_list_webhook_triggers())
            .map(into_triggers)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::config::ClientConfig;

    fn client() -> Client {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8000")
            .user("admin")
            .password("secret")
            .build()
            .unwrap();
        Client::new(config)
    }

    fn response(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn parse_list_webhooks_returns_every_entry() {
        let body = r#"{"total":2,"hooks":{"1":{"id":1,"name":"a"},"2":{"id":2,"name":"b"}}}"#;
        let mut hooks = client().parse_list_webhooks(response(body)).unwrap();
        assert_eq!(hooks.len(), 2);
        hooks.sort_by_key(|h| h.id);
        assert_eq!(hooks[0].name, "a");
        assert_eq!(hooks[1].name, "b");
    }

    #[test]
    fn malformed_listing_entry_keeps_its_decode_error() {
        let body = r#"{"total":1,"hooks":{"1":{"isPublished":"yes"}}}"#;
        let err = client().parse_list_webhooks(response(body)).unwrap_err();
        match err {
            ApiError::DecodeError(message) => {
                assert!(message.contains("expected a boolean"), "got: {message}")
            }
            other => panic!("expected DecodeError, got {other:?}"),
        }
    }

    #[test]
    fn id_is_sent_only_when_set() {
        let params = WebhookParams {
            name: "crm sync".to_string(),
            webhook_url: "https://crm.example.com/hook".to_string(),
            ..WebhookParams::default()
        };
        let req = client().build_create_webhook(&params).unwrap();
        assert_eq!(req.url, "http://localhost:8000/hooks/new");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["secret"], Value::Null);

        let params = WebhookParams {
            id: Some(4),
            ..params
        };
        let req = client().build_edit_webhook(&params, false).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:8000/hooks/4/edit");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], 4);
    }

    #[test]
    fn edit_without_id_is_rejected() {
        let err = client()
            .build_edit_webhook(&WebhookParams::default(), true)
            .unwrap_err();
        assert_eq!(err, ApiError::InvalidId("webhook"));
    }

    #[test]
    fn delete_accepts_empty_body() {
        let req = client().build_delete_webhook(9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8000/hooks/9/delete");
        client().parse_delete_webhook(response("")).unwrap();
    }

    #[test]
    fn triggers_are_flattened_with_their_names() {
        let body = r#"{"triggers":{"mautic.lead_post_delete":{"label":"Contact Delete Event","description":"fired on delete"}}}"#;
        let triggers = client().parse_list_webhook_triggers(response(body)).unwrap();
        assert_eq!(
            triggers,
            vec![WebhookTrigger {
                name: "mautic.lead_post_delete".to_string(),
                label: "Contact Delete Event".to_string(),
                description: "fired on delete".to_string(),
            }]
        );
    }
}
