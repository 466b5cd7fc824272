use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::utils::{new_document, object_or_empty, store_failure, strip_server_fields};
use crate::api::format::documents_to_api_value;
use crate::error::{ApiError, ApiResult};
use crate::filter::{DocumentQuery, SortDirection};
use crate::middleware::AuthUser;
use crate::store::{DocumentData, WriteAck};
use crate::types::{notes_collection, CANDIDATES, CREATED_AT};
use crate::validation::validate_note;
use crate::AppState;

/// Read-before-write: notes only exist under an existing candidate
async fn ensure_candidate(state: &AppState, candidate_id: &str) -> ApiResult<()> {
    let candidate = state
        .store
        .get(CANDIDATES, candidate_id)
        .await
        .map_err(store_failure("An error has occured reading the candidate."))?;
    if candidate.is_none() {
        return Err(ApiError::bad_request("Candidate does not exist"));
    }
    Ok(())
}

/// Body fields with `author` taken from the caller, then validated
fn authored_note(user: &AuthUser, body: Value) -> ApiResult<DocumentData> {
    let mut data = object_or_empty(body);
    data.insert("author".into(), Value::String(user.display_name().to_string()));
    let data = Value::Object(data);
    validate_note(&data)?;
    Ok(object_or_empty(data))
}

/// POST /candidates/:id/notes
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(candidate_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let data = authored_note(&user, body)?;
    ensure_candidate(&state, &candidate_id).await?;

    let id = state
        .store
        .add(&notes_collection(&candidate_id), new_document(data))
        .await
        .map_err(store_failure("An error has occured when adding a note."))?;

    tracing::debug!("Added note {} to candidate {}", id, candidate_id);
    Ok(Json(json!({ "id": id })))
}

/// GET /candidates/:id/notes - Oldest first
pub async fn list(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> ApiResult<Json<Value>> {
    ensure_candidate(&state, &candidate_id).await?;

    let query = DocumentQuery::new().order_by(CREATED_AT, SortDirection::Asc);
    let docs = state
        .store
        .query(&notes_collection(&candidate_id), &query)
        .await
        .map_err(store_failure("An error has occured listing notes."))?;
    Ok(Json(documents_to_api_value(docs)))
}

/// PUT /candidates/:id/notes/:noteId
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((candidate_id, note_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<WriteAck>> {
    let Json(body) = body?;
    let mut data = authored_note(&user, body)?;
    strip_server_fields(&mut data);
    ensure_candidate(&state, &candidate_id).await?;

    let ack = state
        .store
        .update(&notes_collection(&candidate_id), &note_id, data)
        .await
        .map_err(store_failure("An error has occured updating the note."))?;
    Ok(Json(ack))
}

/// DELETE /candidates/:id/notes/:noteId
pub async fn delete(
    State(state): State<AppState>,
    Path((candidate_id, note_id)): Path<(String, String)>,
) -> ApiResult<Json<WriteAck>> {
    ensure_candidate(&state, &candidate_id).await?;

    let ack = state
        .store
        .delete(&notes_collection(&candidate_id), &note_id)
        .await
        .map_err(store_failure("An error has occured deleting the note."))?;
    tracing::debug!("Deleted note {} from candidate {}", note_id, candidate_id);
    Ok(Json(ack))
}
