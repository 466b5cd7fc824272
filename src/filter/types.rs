use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

/// Equality condition on a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub field: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

/// Collection query: AND of equality conditions, then ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub conditions: Vec<FilterWhereInfo>,
    pub order: Vec<FilterOrderInfo>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, data: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo { field: field.into(), data: data.into() });
        self
    }

    /// Adds the condition only when a value was supplied
    pub fn where_eq_opt(self, field: impl Into<String>, data: Option<impl Into<Value>>) -> Self {
        match data {
            Some(data) => self.where_eq(field, data),
            None => self,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo { field: field.into(), sort });
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for c in &self.conditions {
            validate_field_name(&c.field)?;
        }
        for o in &self.order {
            validate_field_name(&o.field)?;
        }
        Ok(())
    }
}

/// Field names are embedded as bound parameters, but still restricted to
/// identifier characters so a query string can't address nested paths.
pub fn validate_field_name(name: &str) -> Result<(), FilterError> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidField(name.to_string()));
    }
    Ok(())
}

/// Collection paths alternate collection and document ids: `candidates/abc/notes`.
pub fn validate_collection_path(path: &str) -> Result<(), FilterError> {
    let segments: Vec<&str> = path.split('/').collect();
    let well_formed = segments.len() % 2 == 1
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    if !well_formed {
        return Err(FilterError::InvalidCollection(path.to_string()));
    }
    Ok(())
}

/// Positional SQL parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Json(Value),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
