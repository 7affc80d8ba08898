use embedsql::{Connection, Database, DatabaseConfig, QueryResult, Value};

/// Open an in-memory database with the given duration cast setting and connect to it
pub async fn setup_database(cast_duration_to_time64: Option<bool>) -> (Database, Connection) {
    let mut config = DatabaseConfig::in_memory();
    config.query.cast_duration_to_time64 = cast_duration_to_time64;

    let database = Database::new();
    database.open(config).await.unwrap();
    let connection = database.connect().await.unwrap();
    (database, connection)
}

/// Decode with the default consumer and return every row as display strings
#[allow(dead_code)]
pub fn rows_as_strings(result: &QueryResult) -> Vec<Vec<String>> {
    result
        .to_array()
        .unwrap()
        .iter()
        .map(|row| row.values().iter().map(Value::to_string).collect())
        .collect()
}
