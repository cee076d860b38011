//! Custom field endpoints under `/fields/{object}`.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::decode::{decode, Json, NoContent};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::{edit_method, path_with_query};
use crate::types::{Field, FieldObject, FieldProperties, ListParams, Listing};

#[derive(Deserialize)]
struct FieldResponse {
    field: Field,
}

#[derive(Deserialize)]
struct FieldListResponse {
    #[serde(default)]
    fields: Listing<Field>,
}

/// Payload for creating or editing a field. Every key is always sent, unset
/// values as their zero value or `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldParams {
    /// Target of an edit; never sent in the body.
    #[serde(skip)]
    pub id: Option<u64>,
    pub label: String,
    pub alias: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: String,
    pub group: String,
    pub order: i64,
    pub object: String,
    pub default_value: String,
    pub is_required: bool,
    pub is_publicly_updatable: bool,
    pub is_unique_identifier: bool,
    pub properties: Option<FieldProperties>,
}

fn root(object: FieldObject) -> String {
    format!("/fields/{}", object.as_str())
}

impl Client {
    pub fn build_get_field(&self, object: FieldObject, id: u64) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Get, &format!("{}/{id}", root(object)))
    }

    pub fn parse_get_field(&self, response: HttpResponse) -> Result<Field, ApiError> {
        decode::<Json, FieldResponse>(&response).map(|r| r.field)
    }

    pub fn get_field(&self, object: FieldObject, id: u64) -> Result<Field, ApiError> {
        self.send::<Json, FieldResponse>(self.build_get_field(object, id)).map(|r| r.field)
    }

    pub fn build_list_fields(&self, object: FieldObject, params: &ListParams) -> HttpRequest {
        let path = path_with_query(&root(object), &params.to_query());
        self.request_builder().build_empty(HttpMethod::Get, &path)
    }

    pub fn parse_list_fields(&self, response: HttpResponse) -> Result<Vec<Field>, ApiError> {
        decode::<Json, FieldListResponse>(&response).map(|r| r.fields.into_vec())
    }

    /// List the contact or company fields matching `params`.
    pub fn list_fields(
        &self,
        object: FieldObject,
        params: &ListParams,
    ) -> Result<Vec<Field>, ApiError> {
        self.send::<Json, FieldListResponse>(self.build_list_fields(object, params))
            .map(|r| r.fields.into_vec())
    }

    pub fn build_create_field(
        &self,
        object: FieldObject,
        params: &FieldParams,
    ) -> Result<HttpRequest, ApiError> {
        self.request_builder()
            .build(HttpMethod::Post, &format!("{}/new", root(object)), Some(params))
    }

    pub fn parse_create_field(&self, response: HttpResponse) -> Result<Field, ApiError> {
        self.parse_get_field(response)
    }

    pub fn create_field(&self, object: FieldObject, params: &FieldParams) -> Result<Field, ApiError> {
        self.send::<Json, FieldResponse>(self.build_create_field(object, params)?).map(|r| r.field)
    }

    /// `PATCH` edits an existing field; with `create_if_not_exists` the
    /// request is a `PUT` that creates or replaces it.
    pub fn build_edit_field(
        &self,
        object: FieldObject,
        params: &FieldParams,
        create_if_not_exists: bool,
    ) -> Result<HttpRequest, ApiError> {
        let id = params.id.ok_or(ApiError::InvalidId("field"))?;
        self.request_builder().build(
            edit_method(create_if_not_exists),
            &format!("{}/{id}/edit", root(object)),
            Some(params),
        )
    }

    pub fn parse_edit_field(&self, response: HttpResponse) -> Result<Field, ApiError> {
        self.parse_get_field(response)
    }

    pub fn edit_field(
        &self,
        object: FieldObject,
        params: &FieldParams,
        create_if_not_exists: bool,
    ) -> Result<Field, ApiError> {
        let request = self.build_edit_field(object, params, create_if_not_exists)?;
        self.send::<Json, FieldResponse>(request).map(|r| r.field)
    }

    pub fn build_delete_field(&self, object: FieldObject, id: u64) -> HttpRequest {
        self.request_builder()
            .build_empty(HttpMethod::Delete, &format!("{}/{id}/delete", root(object)))
    }

    pub fn parse_delete_field(&self, response: HttpResponse) -> Result<(), ApiError> {
        decode::<NoContent, ()>(&response)
    }

    pub fn delete_field(&self, object: FieldObject, id: u64) -> Result<(), ApiError> {
        self.send::<NoContent, ()>(self.build_delete_field(object, id))
    }
}
