use serde_json::Value;

use super::error::FilterError;
use super::types::Predicate;

/// Renders predicates into a parameterised PostgreSQL WHERE clause
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(predicates: &[Predicate], starting_param_index: usize) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(predicates)
    }

    fn build(&mut self, predicates: &[Predicate]) -> Result<(String, Vec<Value>), FilterError> {
        let mut sql_conditions = vec![];
        for predicate in predicates {
            sql_conditions.push(self.build_sql_condition(predicate)?);
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, std::mem::take(&mut self.param_values)))
    }

    fn build_sql_condition(&mut self, predicate: &Predicate) -> Result<String, FilterError> {
        match predicate {
            Predicate::Eq { column, value } => {
                let quoted_column = quote_column(column)?;
                if value.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(value.clone())))
                }
            }
            Predicate::IsNull { column } => Ok(format!("{} IS NULL", quote_column(column)?)),
            Predicate::ContainsCi { columns, needle } => {
                if columns.is_empty() {
                    return Ok("1=0".to_string());
                }
                let pattern = Value::String(format!("%{}%", escape_like(needle)));
                let mut parts = Vec::with_capacity(columns.len());
                for column in columns {
                    parts.push(format!("{} ILIKE {}", quote_column(column)?, self.param(pattern.clone())));
                }
                Ok(format!("({})", parts.join(" OR ")))
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

pub(crate) fn validate_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn quote_column(column: &str) -> Result<String, FilterError> {
    if !validate_identifier(column) {
        return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
    }
    Ok(format!("\"{}\"", column))
}

/// Escape LIKE wildcards so user input only ever matches literally
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
