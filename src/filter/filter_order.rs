use super::error::FilterError;
use super::types::{validate_field_name, FilterOrderInfo, SqlParam};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(
        infos: &[FilterOrderInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        if infos.is_empty() {
            return Ok((String::new(), vec![]));
        }
        let mut params = Vec::with_capacity(infos.len());
        let mut parts = Vec::with_capacity(infos.len());
        for (offset, info) in infos.iter().enumerate() {
            validate_field_name(&info.field)?;
            parts.push(format!("data ->> ${} {}", starting_param_index + offset + 1, info.sort.to_sql()));
            params.push(SqlParam::Text(info.field.clone()));
        }
        Ok((format!("ORDER BY {}", parts.join(", ")), params))
    }
}
