use rusqlite::Connection;
use rusqlite::types::{Value as SqlValue, ValueRef};
use tracing::{debug, warn};
use crate::translator::{IntervalTranslator, TranslationMetadata};
use crate::types::{Interval, LogicalType, ResultTypeRegistry, Value};
use crate::wire::{encode_batch, Field};
use crate::Result;
use super::QueryResult;

/// Runs statements on the engine handle and materializes their results
/// under a session's result type registry
pub struct QueryExecutor;

struct ColumnInfo {
    name: String,
    decl_type: Option<String>,
}

impl QueryExecutor {
    /// Execute a row-returning statement.
    ///
    /// Each column's logical type comes from, in order: a translation hint,
    /// the declared column type, the values actually returned. A candidate
    /// that some returned value does not fit is skipped.
    pub fn execute(conn: &Connection, sql: &str, registry: &ResultTypeRegistry) -> Result<QueryResult> {
        let (translated, metadata) = IntervalTranslator::translate_with_metadata(sql);

        let mut stmt = conn.prepare_cached(&translated)?;
        let columns: Vec<ColumnInfo> = stmt
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_string(),
                decl_type: c.decl_type().map(str::to_string),
            })
            .collect();

        let mut raw_rows: Vec<Vec<SqlValue>> = Vec::new();
        {
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    values.push(SqlValue::from(row.get_ref(i)?));
                }
                raw_rows.push(values);
            }
        }

        let mut fields = Vec::with_capacity(columns.len());
        let mut logical_types = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let logical_type = Self::column_logical_type(column, &metadata, raw_rows.iter().map(|r| &r[idx]));
            fields.push(Field::new(column.name.clone(), logical_type, registry.resolve(logical_type)));
            logical_types.push(logical_type);
        }

        let rows: Vec<Vec<Value>> = raw_rows
            .iter()
            .map(|raw| {
                raw.iter()
                    .zip(&logical_types)
                    .map(|(value, logical_type)| Self::materialize(value, *logical_type, registry))
                    .collect()
            })
            .collect();

        let frame = encode_batch(&fields, &rows)?;
        debug!("Query returned {} rows in {} columns", rows.len(), fields.len());
        Ok(QueryResult::new(fields, rows.len(), frame))
    }

    /// Execute a statement that returns no rows, reporting the rows it changed
    pub fn execute_dml(conn: &Connection, sql: &str) -> Result<usize> {
        let translated = IntervalTranslator::translate_query(sql);
        let rows_affected = conn.execute(&translated, [])?;
        debug!("Statement affected {} rows", rows_affected);
        Ok(rows_affected)
    }

    fn column_logical_type<'a>(
        column: &ColumnInfo,
        metadata: &TranslationMetadata,
        values: impl Iterator<Item = &'a SqlValue> + Clone,
    ) -> LogicalType {
        // A hint is keyed by name only, so an outer column reusing the alias
        // must still hold what make_interval produced
        if let Some(hint) = metadata.get_hint(&column.name) {
            if values.clone().all(|v| Self::matches_hint(hint.logical_type, v)) {
                return hint.logical_type;
            }
            debug!("Ignoring {} hint for column {}", hint.logical_type, column.name);
        }

        if let Some(declared) = column.decl_type.as_deref().and_then(LogicalType::from_decltype) {
            if values.clone().all(|v| Self::conforms(declared, v)) {
                return declared;
            }
            warn!(
                "Column {} does not fit its {} type, inferring from values",
                column.name, declared
            );
        }

        Self::infer(values)
    }

    fn matches_hint(logical_type: LogicalType, value: &SqlValue) -> bool {
        match (logical_type, value) {
            (_, SqlValue::Null) => true,
            (LogicalType::Interval, SqlValue::Blob(b)) => Interval::from_bytes(b).is_some(),
            (LogicalType::Interval, _) => false,
            (other, value) => Self::conforms(other, value),
        }
    }

    fn conforms(logical_type: LogicalType, value: &SqlValue) -> bool {
        match (logical_type, value) {
            (_, SqlValue::Null) => true,
            (LogicalType::Integer, SqlValue::Integer(_)) => true,
            (LogicalType::Real, SqlValue::Integer(_) | SqlValue::Real(_)) => true,
            (LogicalType::Text, SqlValue::Text(_)) => true,
            (LogicalType::Blob, SqlValue::Blob(_)) => true,
            (LogicalType::Interval, SqlValue::Blob(b)) => Interval::from_bytes(b).is_some(),
            (LogicalType::Interval, SqlValue::Integer(_)) => true,
            (LogicalType::Interval, SqlValue::Text(t)) => Interval::parse(t).is_some(),
            _ => false,
        }
    }

    /// Infer from storage classes; mixed non-numeric columns degrade to text
    fn infer<'a>(values: impl Iterator<Item = &'a SqlValue>) -> LogicalType {
        let mut seen: Option<LogicalType> = None;
        for value in values {
            let current = match value {
                SqlValue::Null => continue,
                SqlValue::Integer(_) => LogicalType::Integer,
                SqlValue::Real(_) => LogicalType::Real,
                SqlValue::Text(_) => LogicalType::Text,
                SqlValue::Blob(_) => LogicalType::Blob,
            };
            seen = Some(match seen {
                None => current,
                Some(previous) if previous == current => previous,
                Some(LogicalType::Integer | LogicalType::Real)
                    if matches!(current, LogicalType::Integer | LogicalType::Real) => LogicalType::Real,
                Some(_) => LogicalType::Text,
            });
        }
        seen.unwrap_or(LogicalType::Null)
    }

    fn materialize(value: &SqlValue, logical_type: LogicalType, registry: &ResultTypeRegistry) -> Value {
        let cell = match (logical_type, Value::from_engine(ValueRef::from(value), logical_type)) {
            (LogicalType::Text, Value::Null) => Value::Null,
            (LogicalType::Text, text @ Value::Text(_)) => text,
            (LogicalType::Text, other) => Value::Text(other.to_string()),
            (_, other) => other,
        };
        registry.coerce(logical_type, cell)
    }
}
