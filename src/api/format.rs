use serde_json::Value;

use crate::store::Document;

/// Wire format for a stored document: its body with `id` merged in
pub fn document_to_api_value(doc: Document) -> Value {
    let Document { id, mut data } = doc;
    data.insert("id".into(), Value::String(id));
    Value::Object(data)
}

pub fn documents_to_api_value(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_api_value).collect())
}
