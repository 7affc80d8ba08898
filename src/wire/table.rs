use std::sync::Arc;
use crate::types::Value;
use super::Field;

/// A decoded result: schema plus row-major values
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    fields: Arc<[Field]>,
    rows: Vec<Row>,
}

/// One decoded row; values are addressable by position or column name
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    fields: Arc<[Field]>,
    values: Vec<Value>,
}

impl Table {
    pub(crate) fn from_columns(fields: Vec<Field>, columns: Vec<Vec<Value>>, num_rows: usize) -> Self {
        let fields: Arc<[Field]> = fields.into();
        let mut columns: Vec<std::vec::IntoIter<Value>> = columns.into_iter().map(Vec::into_iter).collect();

        let mut rows = Vec::with_capacity(num_rows);
        for _ in 0..num_rows {
            let values = columns
                .iter_mut()
                .map(|col| col.next().unwrap_or(Value::Null))
                .collect();
            rows.push(Row {
                fields: fields.clone(),
                values,
            });
        }

        Table { fields, rows }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        Some(self.rows.iter().map(|row| &row.values[idx]).collect())
    }
}

impl Row {
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.fields.iter().position(|f| f.name == name)?;
        self.values.get(idx)
    }

    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
