use std::collections::HashMap;

use crate::fragment::QueryWithArgs;
use crate::schema::Table;
use crate::value::Arg;

/// A value for a column that is not part of the model.
#[derive(Debug, Clone)]
pub struct ColumnValue {
    pub column: String,
    pub value: QueryWithArgs,
}

/// Caller-supplied column values for INSERT and UPDATE.
///
/// Values for model columns replace the model's own value in place; values
/// for other columns are appended after the model columns.
#[derive(Debug, Clone, Default)]
pub struct CustomValueQuery {
    pub(crate) model_values: HashMap<String, QueryWithArgs>,
    pub(crate) extra_values: Vec<ColumnValue>,
}

impl CustomValueQuery {
    pub fn add_value(
        &mut self,
        table: Option<&Table>,
        column: impl Into<String>,
        value: impl Into<String>,
        args: Vec<Arg>,
    ) {
        let column = column.into();
        let value = QueryWithArgs::safe(value, args);
        if table.is_some_and(|t| t.has_field(&column)) {
            self.model_values.insert(column, value);
        } else {
            self.extra_values.push(ColumnValue { column, value });
        }
    }

    pub fn model_value(&self, column: &str) -> Option<&QueryWithArgs> {
        self.model_values.get(column)
    }

    pub fn extra_values(&self) -> &[ColumnValue] {
        &self.extra_values
    }
}
