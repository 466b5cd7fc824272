use super::error::FilterError;
use super::types::{validate_field_name, FilterWhereInfo, SqlParam};

pub struct FilterWhere;

impl FilterWhere {
    /// Renders `data -> $n = $m` per condition joined with AND, numbering
    /// parameters from `starting_param_index + 1`.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut params = Vec::with_capacity(conditions.len() * 2);
        let mut parts = Vec::with_capacity(conditions.len());
        let mut index = starting_param_index;

        for condition in conditions {
            validate_field_name(&condition.field)?;
            parts.push(format!("data -> ${} = ${}", index + 1, index + 2));
            params.push(SqlParam::Text(condition.field.clone()));
            params.push(SqlParam::Json(condition.data.clone()));
            index += 2;
        }

        Ok((parts.join(" AND "), params))
    }
}
