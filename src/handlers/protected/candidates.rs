use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::utils::{new_document, object_or_empty, store_failure, strip_server_fields};
use crate::api::format::{document_to_api_value, documents_to_api_value};
use crate::error::{ApiError, ApiResult};
use crate::filter::{DocumentQuery, SortDirection};
use crate::store::WriteAck;
use crate::types::{CANDIDATES, CREATED_AT, DEFAULT_CANDIDATE_STATUS};
use crate::validation::{is_present, validate_candidate, ValidationError};
use crate::AppState;

/// Equality filters for GET /candidates. `status` is required.
#[derive(Debug, Default, Deserialize)]
pub struct CandidateFilters {
    pub status: Option<String>,
    pub posting: Option<String>,
    pub office: Option<String>,
}

impl CandidateFilters {
    pub fn to_query(&self) -> Result<DocumentQuery, ValidationError> {
        let status = non_empty(&self.status).ok_or(ValidationError::Empty("Status"))?;
        Ok(DocumentQuery::new()
            .where_eq("status", status)
            .where_eq_opt("posting", non_empty(&self.posting))
            .where_eq_opt("office", non_empty(&self.office))
            .order_by(CREATED_AT, SortDirection::Asc))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// POST /candidates - Add a candidate; `status` defaults to "Inbox"
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let mut data = object_or_empty(body);
    if !is_present(data.get("status")) {
        data.insert("status".into(), Value::String(DEFAULT_CANDIDATE_STATUS.into()));
    }
    let data = Value::Object(data);
    validate_candidate(&data)?;

    let id = state
        .store
        .add(CANDIDATES, new_document(object_or_empty(data)))
        .await
        .map_err(store_failure("An error has occured when adding a candidate."))?;

    tracing::debug!("Added candidate {}", id);
    Ok(Json(json!({ "id": id })))
}

/// GET /candidates?status=&posting=&office= - Matching candidates, oldest first
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<CandidateFilters>,
) -> ApiResult<Json<Value>> {
    let query = filters.to_query()?;
    let docs = state
        .store
        .query(CANDIDATES, &query)
        .await
        .map_err(store_failure("An error has occured listing candidates."))?;
    Ok(Json(documents_to_api_value(docs)))
}

/// GET /candidates/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let doc = state
        .store
        .get(CANDIDATES, &id)
        .await
        .map_err(store_failure("An error has occured reading the candidate."))?
        .ok_or_else(|| ApiError::bad_request("No such candidate document."))?;
    Ok(Json(document_to_api_value(doc)))
}

/// PUT /candidates/:id
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<WriteAck>> {
    let Json(body) = body?;
    validate_candidate(&body)?;

    let mut data = object_or_empty(body);
    strip_server_fields(&mut data);
    let ack = state
        .store
        .update(CANDIDATES, &id, data)
        .await
        .map_err(store_failure("An error has occured updating the candidate."))?;
    Ok(Json(ack))
}

/// DELETE /candidates/:id - Notes under the candidate are left in place
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<WriteAck>> {
    let ack = state
        .store
        .delete(CANDIDATES, &id)
        .await
        .map_err(store_failure("An error has occured deleting the candidate."))?;
    tracing::debug!("Deleted candidate {}", id);
    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_filter_is_required() {
        let filters = CandidateFilters { office: Some("NY".into()), ..Default::default() };
        assert_eq!(filters.to_query().unwrap_err(), ValidationError::Empty("Status"));

        let blank = CandidateFilters { status: Some(String::new()), ..Default::default() };
        assert!(blank.to_query().is_err());
    }

    #[test]
    fn builds_and_query_skipping_blank_filters() {
        let filters = CandidateFilters {
            status: Some("Inbox".into()),
            posting: Some(String::new()),
            office: Some("NY".into()),
        };
        let query = filters.to_query().unwrap();
        let fields: Vec<_> = query.conditions.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "office"]);
        assert_eq!(query.conditions[1].data, json!("NY"));
        assert_eq!(query.order[0].field, CREATED_AT);
    }
}
