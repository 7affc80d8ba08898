use std::collections::HashMap;
use crate::types::LogicalType;

/// Metadata about query translations to help with type inference
#[derive(Debug, Clone, Default)]
pub struct TranslationMetadata {
    /// Map of result column name -> type hint information
    pub column_mappings: HashMap<String, ColumnTypeHint>,
}

/// Type hint information for a column after translation
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTypeHint {
    /// The SQL text the column was produced from, before translation
    pub source_expression: Option<String>,
    /// The logical type the engine cannot report on its own
    pub logical_type: LogicalType,
}

impl TranslationMetadata {
    pub fn new() -> Self {
        Self {
            column_mappings: HashMap::new(),
        }
    }

    pub fn add_hint(&mut self, column_name: String, hint: ColumnTypeHint) {
        self.column_mappings.insert(column_name, hint);
    }

    /// Get type hint for a column (if any)
    pub fn get_hint(&self, column_name: &str) -> Option<&ColumnTypeHint> {
        self.column_mappings.get(column_name)
    }

    pub fn is_empty(&self) -> bool {
        self.column_mappings.is_empty()
    }
}

impl ColumnTypeHint {
    pub fn interval(source_expression: Option<String>) -> Self {
        Self {
            source_expression,
            logical_type: LogicalType::Interval,
        }
    }
}
