mod common;
use common::{rows_as_strings, setup_database};
use pretty_assertions::assert_eq;

use embedsql::types::WireType;
use embedsql::{DecodeError, Decoder, DecoderCapabilities, Interval, Value};

#[tokio::test]
async fn test_interval_month_unset_config() {
    let (database, connection) = setup_database(None).await;

    let result = connection.query("SELECT INTERVAL '3' MONTH AS interval").await.unwrap();
    assert_eq!(result.field("interval").unwrap().wire_type, WireType::Time64Microsecond);

    let rows = result.to_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("interval").unwrap().to_string(), "0,3");

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_interval_month_explicit_true() {
    let (database, connection) = setup_database(Some(true)).await;

    let result = connection.query("SELECT INTERVAL '3' MONTH AS interval").await.unwrap();
    assert_eq!(rows_as_strings(&result), vec![vec!["0,3".to_string()]]);

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_interval_month_cast_disabled_fails_to_decode() {
    let (database, connection) = setup_database(Some(false)).await;

    // The query itself succeeds; the default consumer cannot read the column
    let result = connection.query("SELECT INTERVAL '3' MONTH AS interval").await.unwrap();
    assert_eq!(result.field("interval").unwrap().wire_type, WireType::Interval);

    let err = result.to_array().unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnsupportedType {
            column: "interval".to_string(),
            wire_type: WireType::Interval,
        }
    );

    // A consumer with native durations sees the raw value
    let table = result.to_table_with(&Decoder::new(DecoderCapabilities::all())).unwrap();
    assert_eq!(
        table.rows()[0].get("interval"),
        Some(&Value::Interval(Interval::from_months(3)))
    );

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sub_day_intervals_become_time_of_day() {
    let (database, connection) = setup_database(None).await;

    let result = connection
        .query("SELECT INTERVAL '90' MINUTE AS a, INTERVAL '25' HOUR AS b, INTERVAL '1 day 02:00:00' AS c")
        .await
        .unwrap();
    let rows = result.to_array().unwrap();

    let a = rows[0].get("a").unwrap().as_time64().unwrap();
    assert_eq!(a.to_string(), "5400000000,0");
    assert_eq!(a.to_naive_time().unwrap().to_string(), "01:30:00");

    // Whole days wrap away
    assert_eq!(rows[0].get("b").unwrap().to_string(), "3600000000,0");
    assert_eq!(rows[0].get("c").unwrap().to_string(), "7200000000,0");

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_declared_interval_column() {
    let (database, connection) = setup_database(None).await;

    connection.execute("CREATE TABLE shifts (name TEXT, length INTERVAL)").await.unwrap();
    connection
        .execute("INSERT INTO shifts VALUES ('early', INTERVAL '8' HOUR), ('long', INTERVAL '1 day 04:00:00'), ('none', NULL)")
        .await
        .unwrap();

    let result = connection.query("SELECT name, length FROM shifts ORDER BY rowid").await.unwrap();
    assert_eq!(
        rows_as_strings(&result),
        vec![
            vec!["early".to_string(), "28800000000,0".to_string()],
            vec!["long".to_string(), "14400000000,0".to_string()],
            vec!["none".to_string(), "NULL".to_string()],
        ]
    );

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_non_interval_columns_are_unaffected() {
    let (database, connection) = setup_database(Some(false)).await;

    let result = connection.query("SELECT 1 AS n, 'x' AS s, 2.5 AS r").await.unwrap();
    assert_eq!(
        rows_as_strings(&result),
        vec![vec!["1".to_string(), "x".to_string(), "2.5".to_string()]]
    );

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_repeated_query_is_deterministic() {
    let (database, connection) = setup_database(None).await;

    let first = connection.query("SELECT INTERVAL '3' MONTH AS interval").await.unwrap();
    let second = connection.query("SELECT INTERVAL '3' MONTH AS interval").await.unwrap();
    assert_eq!(first.frame(), second.frame());

    connection.close().await;
    database.shutdown().await.unwrap();
}
