use regex::{Captures, Regex};
use once_cell::sync::Lazy;
use tracing::debug;
use crate::types::Interval;
use super::{ColumnTypeHint, TranslationMetadata};

/// Translates INTERVAL literals into calls to the engine's `make_interval` function
pub struct IntervalTranslator;

// Matches both the SQL-standard qualifier form (INTERVAL '3' MONTH) and the
// PostgreSQL string form (INTERVAL '1 day 02:00:00'), with an optional alias.
// Captures: (1) literal body, (2) optional unit, (3) optional alias
static INTERVAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bINTERVAL\s+'([^']*)'(?:\s+(YEARS?|MONTHS?|WEEKS?|DAYS?|HOURS?|MINUTES?|SECONDS?|MILLISECONDS?|MICROSECONDS?)\b)?(?:\s+AS\s+("[^"]+"|[A-Za-z_][A-Za-z0-9_]*))?"#
    ).expect("interval pattern is valid")
});

impl IntervalTranslator {
    /// Check if the query contains INTERVAL literals that need translation
    pub fn needs_translation(query: &str) -> bool {
        query.len() >= 8 && query.to_uppercase().contains("INTERVAL")
    }

    /// Translate query and return metadata about the translation
    pub fn translate_with_metadata(query: &str) -> (String, TranslationMetadata) {
        let mut metadata = TranslationMetadata::new();

        if !Self::needs_translation(query) {
            return (query.to_string(), metadata);
        }

        let result = INTERVAL_PATTERN.replace_all(query, |caps: &Captures| {
            let body = &caps[1];
            let unit = caps.get(2).map(|m| m.as_str());
            let alias = caps.get(3).map(|m| m.as_str());

            let Some(interval) = Self::parse_literal(body, unit) else {
                // Leave it for the engine to reject
                debug!("Leaving untranslatable interval literal: {}", &caps[0]);
                return caps[0].to_string();
            };

            let call = format!(
                "make_interval({}, {}, {})",
                interval.months, interval.days, interval.micros
            );

            // Without an alias SQLite names the column after the expression text
            let column_name = match alias {
                Some(alias) => alias.trim_matches('"').to_string(),
                None => call.clone(),
            };
            let source = caps[0].to_string();
            metadata.add_hint(column_name, ColumnTypeHint::interval(Some(source)));

            match alias {
                Some(alias) => format!("{call} AS {alias}"),
                None => call,
            }
        }).to_string();

        debug!("Interval translation: {} -> {}", query, result);
        (result, metadata)
    }

    /// Translate without keeping metadata
    pub fn translate_query(query: &str) -> String {
        Self::translate_with_metadata(query).0
    }

    fn parse_literal(body: &str, unit: Option<&str>) -> Option<Interval> {
        match unit {
            Some(unit) => {
                let value: f64 = body.trim().parse().ok()?;
                Interval::from_quantity(value, unit)
            }
            None => Interval::parse(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalType;

    #[test]
    fn test_qualifier_form_with_alias() {
        let (sql, metadata) =
            IntervalTranslator::translate_with_metadata("SELECT INTERVAL '3' MONTH AS interval");
        assert_eq!(sql, "SELECT make_interval(3, 0, 0) AS interval");

        let hint = metadata.get_hint("interval").unwrap();
        assert_eq!(hint.logical_type, LogicalType::Interval);
        assert_eq!(hint.source_expression.as_deref(), Some("INTERVAL '3' MONTH AS interval"));
    }

    #[test]
    fn test_string_form() {
        let (sql, metadata) =
            IntervalTranslator::translate_with_metadata("SELECT INTERVAL '1 day 02:00:00' AS d");
        assert_eq!(sql, "SELECT make_interval(0, 1, 7200000000) AS d");
        assert!(metadata.get_hint("d").is_some());
    }

    #[test]
    fn test_unaliased_column_is_keyed_by_expression() {
        let (sql, metadata) = IntervalTranslator::translate_with_metadata("SELECT interval '2' year");
        assert_eq!(sql, "SELECT make_interval(24, 0, 0)");
        assert!(metadata.get_hint("make_interval(24, 0, 0)").is_some());
    }

    #[test]
    fn test_quoted_alias() {
        let (sql, metadata) =
            IntervalTranslator::translate_with_metadata(r#"SELECT INTERVAL '5' SECOND AS "wait time""#);
        assert_eq!(sql, r#"SELECT make_interval(0, 0, 5000000) AS "wait time""#);
        assert!(metadata.get_hint("wait time").is_some());
    }

    #[test]
    fn test_multiple_literals() {
        let (sql, metadata) = IntervalTranslator::translate_with_metadata(
            "SELECT INTERVAL '1' DAY AS a, INTERVAL '3 months' AS b",
        );
        assert_eq!(sql, "SELECT make_interval(0, 1, 0) AS a, make_interval(3, 0, 0) AS b");
        assert_eq!(metadata.column_mappings.len(), 2);
    }

    #[test]
    fn test_untranslatable_literal_is_left_alone() {
        let query = "SELECT INTERVAL 'whenever' AS x";
        let (sql, metadata) = IntervalTranslator::translate_with_metadata(query);
        assert_eq!(sql, query);
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_query_without_intervals() {
        let (sql, metadata) = IntervalTranslator::translate_with_metadata("SELECT 1 AS one");
        assert_eq!(sql, "SELECT 1 AS one");
        assert!(metadata.is_empty());
    }
}
