//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use mautic_client::{
    ApiError, Client, ClientConfig, Contact, ContactParams, Field, FieldObject, FieldParams,
    HttpMethod, HttpRequest, HttpResponse, ListParams, Webhook, WebhookParams, WebhookTrigger,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "https://mautic.example.com";

fn client() -> Client {
    let config = ClientConfig::builder()
        .base_url(BASE_URL)
        .user("admin")
        .password("secret")
        .build()
        .unwrap();
    Client::new(config)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn input_id(case: &Value) -> u64 {
    case["input_id"].as_u64().unwrap()
}

fn create_if_not_exists(case: &Value) -> bool {
    case["create_if_not_exists"].as_bool().unwrap_or(false)
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn expected<T: DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["expected_result"].clone()).unwrap()
}

/// Compare a built request with `expected_request`: method, full URL, and
/// the JSON body with its content-type header when one is expected.
fn assert_request(name: &str, req: &HttpRequest, case: &Value) {
    let expected_req = &case["expected_request"];
    assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

    match expected_req.get("body") {
        Some(expected_body) => {
            assert_eq!(
                req.headers,
                vec![("content-type".to_string(), "application/json".to_string())],
                "{name}: headers"
            );
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, expected_body, "{name}: body");
        }
        None => {
            assert!(req.headers.is_empty(), "{name}: headers should be empty");
            assert!(req.body.is_none(), "{name}: body should be None");
        }
    }
}

/// Check `result` against `expected_error` when the case has one, otherwise
/// return the value for comparison.
fn check_outcome<T: std::fmt::Debug>(name: &str, result: Result<T, ApiError>, case: &Value) -> Option<T> {
    let Some(expected_error) = case.get("expected_error") else {
        return Some(result.unwrap_or_else(|e| panic!("{name}: unexpected error {e:?}")));
    };
    let err = result.unwrap_err();
    match expected_error["kind"].as_str().unwrap() {
        "NotFound" => assert_eq!(err, ApiError::NotFound, "{name}"),
        "DecodeError" => assert!(matches!(err, ApiError::DecodeError(_)), "{name}: got {err:?}"),
        "Api" => assert_eq!(
            err,
            ApiError::Api {
                status: expected_error["status"].as_u64().unwrap() as u16,
                message: expected_error["message"].as_str().unwrap().to_string(),
            },
            "{name}"
        ),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
    None
}

fn list_params(input: &Value) -> ListParams {
    ListParams {
        search: input["search"].as_str().map(str::to_string),
        start: input["start"].as_u64(),
        limit: input["limit"].as_u64(),
        order_by: input["orderBy"].as_str().map(str::to_string),
        order_by_dir: input["orderByDir"].as_str().map(str::to_string),
        published_only: input["publishedOnly"].as_bool(),
        minimal: input["minimal"].as_bool(),
    }
}

fn contact_params(input: &Value) -> ContactParams {
    ContactParams {
        id: None,
        fields: input["fields"].as_object().cloned().unwrap_or_default(),
        ip_address: input["ipAddress"].as_str().map(str::to_string),
        last_active: input["lastActive"].as_str().map(str::to_string),
        owner: input["owner"].as_u64(),
        overwrite_with_blank: input["overwriteWithBlank"].as_bool(),
    }
}

fn field_object(case: &Value) -> FieldObject {
    serde_json::from_value(case["object"].clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

#[test]
fn contact_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/contacts.json")) {
        let name = case["name"].as_str().unwrap();
        let response = simulated_response(&case);

        match case["op"].as_str().unwrap() {
            "get" => {
                let req = c.build_get_contact(input_id(&case));
                assert_request(name, &req, &case);
                if let Some(contact) = check_outcome(name, c.parse_get_contact(response), &case) {
                    assert_eq!(contact, expected::<Contact>(&case), "{name}: parsed result");
                }
            }
            "list" => {
                let req = c.build_list_contacts(&list_params(&case["input"]));
                assert_request(name, &req, &case);
                let mut contacts = c.parse_list_contacts(response).unwrap();
                contacts.sort_by_key(|contact| contact.id);
                assert_eq!(contacts, expected::<Vec<Contact>>(&case), "{name}: parsed result");
            }
            "create" => {
                let req = c.build_create_contact(&contact_params(&case["input"])).unwrap();
                assert_request(name, &req, &case);
                let contact = c.parse_create_contact(response).unwrap();
                assert_eq!(contact, expected::<Contact>(&case), "{name}: parsed result");
            }
            "create_batch" => {
                let batch: Vec<ContactParams> =
                    case["input"].as_array().unwrap().iter().map(contact_params).collect();
                let req = c.build_create_contacts(&batch).unwrap();
                assert_request(name, &req, &case);
                let contacts = c.parse_create_contacts(response).unwrap();
                assert_eq!(contacts, expected::<Vec<Contact>>(&case), "{name}: parsed result");
            }
            "edit" => {
                let params = ContactParams {
                    id: Some(input_id(&case)),
                    ..contact_params(&case["input"])
                };
                let req = c.build_edit_contact(&params, create_if_not_exists(&case)).unwrap();
                assert_request(name, &req, &case);
                let contact = c.parse_edit_contact(response).unwrap();
                assert_eq!(contact, expected::<Contact>(&case), "{name}: parsed result");
            }
            "delete" => {
                let req = c.build_delete_contact(input_id(&case));
                assert_request(name, &req, &case);
                check_outcome(name, c.parse_delete_contact(response), &case);
            }
            other => panic!("{name}: unknown op: {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[test]
fn field_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/fields.json")) {
        let name = case["name"].as_str().unwrap();
        let object = field_object(&case);
        let response = simulated_response(&case);

        match case["op"].as_str().unwrap() {
            "get" => {
                let req = c.build_get_field(object, input_id(&case));
                assert_request(name, &req, &case);
                let field = c.parse_get_field(response).unwrap();
                assert_eq!(field, expected::<Field>(&case), "{name}: parsed result");
            }
            "list" => {
                let req = c.build_list_fields(object, &list_params(&case["input"]));
                assert_request(name, &req, &case);
                let mut fields = c.parse_list_fields(response).unwrap();
                fields.sort_by_key(|field| field.id);
                assert_eq!(fields, expected::<Vec<Field>>(&case), "{name}: parsed result");
            }
            "create" => {
                let params: FieldParams = serde_json::from_value(case["input"].clone()).unwrap();
                let req = c.build_create_field(object, &params).unwrap();
                assert_request(name, &req, &case);
                if let Some(field) = check_outcome(name, c.parse_create_field(response), &case) {
                    assert_eq!(field, expected::<Field>(&case), "{name}: parsed result");
                }
            }
            "edit" => {
                let params = FieldParams {
                    id: Some(input_id(&case)),
                    ..serde_json::from_value(case["input"].clone()).unwrap()
                };
                let req = c
                    .build_edit_field(object, &params, create_if_not_exists(&case))
                    .unwrap();
                assert_request(name, &req, &case);
                let field = c.parse_edit_field(response).unwrap();
                assert_eq!(field, expected::<Field>(&case), "{name}: parsed result");
            }
            "delete" => {
                let req = c.build_delete_field(object, input_id(&case));
                assert_request(name, &req, &case);
                check_outcome(name, c.parse_delete_field(response), &case);
            }
            other => panic!("{name}: unknown op: {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

#[test]
fn webhook_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/webhooks.json")) {
        let name = case["name"].as_str().unwrap();
        let response = simulated_response(&case);

        match case["op"].as_str().unwrap() {
            "get" => {
                let req = c.build_get_webhook(input_id(&case));
                assert_request(name, &req, &case);
                let hook = c.parse_get_webhook(response).unwrap();
                assert_eq!(hook, expected::<Webhook>(&case), "{name}: parsed result");
            }
            "list" => {
                let req = c.build_list_webhooks();
                assert_request(name, &req, &case);
                if let Some(mut hooks) = check_outcome(name, c.parse_list_webhooks(response), &case) {
                    hooks.sort_by_key(|hook| hook.id);
                    assert_eq!(hooks, expected::<Vec<Webhook>>(&case), "{name}: parsed result");
                }
            }
            "create" => {
                let params: WebhookParams = serde_json::from_value(case["input"].clone()).unwrap();
                let req = c.build_create_webhook(&params).unwrap();
                assert_request(name, &req, &case);
                let hook = c.parse_create_webhook(response).unwrap();
                assert_eq!(hook, expected::<Webhook>(&case), "{name}: parsed result");
            }
            "edit" => {
                let params = WebhookParams {
                    id: Some(input_id(&case)),
                    ..serde_json::from_value(case["input"].clone()).unwrap()
                };
                let req = c.build_edit_webhook(&params, create_if_not_exists(&case)).unwrap();
                assert_request(name, &req, &case);
                let hook = c.parse_edit_webhook(response).unwrap();
                assert_eq!(hook, expected::<Webhook>(&case), "{name}: parsed result");
            }
            "delete" => {
                let req = c.build_delete_webhook(input_id(&case));
                assert_request(name, &req, &case);
                check_outcome(name, c.parse_delete_webhook(response), &case);
            }
            "triggers" => {
                let req = c.build_list_webhook_triggers();
                assert_request(name, &req, &case);
                let triggers = c.parse_list_webhook_triggers(response).unwrap();
                assert_eq!(triggers, expected::<Vec<WebhookTrigger>>(&case), "{name}: parsed result");
            }
            other => panic!("{name}: unknown op: {other}"),
        }
    }
}
