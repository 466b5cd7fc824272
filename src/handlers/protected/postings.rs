use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use super::utils::{new_document, object_or_empty, store_failure, strip_server_fields};
use crate::api::format::{document_to_api_value, documents_to_api_value};
use crate::error::{ApiError, ApiResult};
use crate::filter::{DocumentQuery, SortDirection};
use crate::store::WriteAck;
use crate::types::{CREATED_AT, POSTINGS};
use crate::validation::validate_posting;
use crate::AppState;

/// POST /postings - Add a new posting, returns `{ "id": ... }`
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    validate_posting(&body)?;

    let id = state
        .store
        .add(POSTINGS, new_document(object_or_empty(body)))
        .await
        .map_err(store_failure("An error has occured when adding a posting."))?;

    tracing::debug!("Added posting {}", id);
    Ok(Json(json!({ "id": id })))
}

/// GET /postings - All postings, oldest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let query = DocumentQuery::new().order_by(CREATED_AT, SortDirection::Asc);
    let docs = state
        .store
        .query(POSTINGS, &query)
        .await
        .map_err(store_failure("An error has occured listing postings."))?;
    Ok(Json(documents_to_api_value(docs)))
}

/// GET /postings/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let doc = state
        .store
        .get(POSTINGS, &id)
        .await
        .map_err(store_failure("An error has occured reading the posting."))?
        .ok_or_else(|| ApiError::bad_request("No such posting document."))?;
    Ok(Json(document_to_api_value(doc)))
}

/// PUT /postings/:id - Merge fields into a posting
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<WriteAck>> {
    let Json(body) = body?;
    validate_posting(&body)?;

    let mut data = object_or_empty(body);
    strip_server_fields(&mut data);
    let ack = state
        .store
        .update(POSTINGS, &id, data)
        .await
        .map_err(store_failure("An error has occured updating the posting."))?;
    Ok(Json(ack))
}

/// DELETE /postings/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<WriteAck>> {
    let ack = state
        .store
        .delete(POSTINGS, &id)
        .await
        .map_err(store_failure("An error has occured deleting the posting."))?;
    tracing::debug!("Deleted posting {}", id);
    Ok(Json(ack))
}
