use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::error::ApiError;
use crate::store::{DocumentData, StoreError};
use crate::types::CREATED_AT;

/// RFC 3339 UTC with fixed millisecond precision, so string order is time order
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Request body as document fields; anything but an object becomes empty
/// and fails validation on its first required field.
pub fn object_or_empty(body: Value) -> DocumentData {
    match body {
        Value::Object(map) => map,
        _ => DocumentData::new(),
    }
}

/// Drops fields the server owns so clients can't set them
pub fn strip_server_fields(data: &mut DocumentData) {
    data.remove("id");
    data.remove(CREATED_AT);
}

/// Body for a new document: server fields replaced, `createdAt` stamped
pub fn new_document(mut data: DocumentData) -> DocumentData {
    strip_server_fields(&mut data);
    data.insert(CREATED_AT.into(), Value::String(timestamp_now()));
    data
}

/// Logs the store failure and wraps it as a 400 with the handler's context
pub fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |err| {
        tracing::error!("{} {}", action, err);
        ApiError::context(action, err)
    }
}
