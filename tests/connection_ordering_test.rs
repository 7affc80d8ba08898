mod common;
use common::{rows_as_strings, setup_database};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_statements_run_in_submission_order() {
    let (database, connection) = setup_database(None).await;
    connection.execute("CREATE TABLE log (step INTEGER)").await.unwrap();

    // Submitted concurrently on one connection, applied one at a time in order
    let (a, b, c) = futures::join!(
        connection.execute("INSERT INTO log VALUES (1)"),
        connection.execute("INSERT INTO log VALUES (2)"),
        connection.execute("INSERT INTO log VALUES (3)"),
    );
    assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (1, 1, 1));

    let result = connection.query("SELECT step FROM log ORDER BY rowid").await.unwrap();
    assert_eq!(
        rows_as_strings(&result),
        vec![vec!["1".to_string()], vec!["2".to_string()], vec!["3".to_string()]]
    );

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_query_sees_preceding_write() {
    let (database, connection) = setup_database(None).await;
    connection.execute("CREATE TABLE counter (n INTEGER)").await.unwrap();

    let (insert, select) = futures::join!(
        connection.execute("INSERT INTO counter VALUES (42)"),
        connection.query("SELECT n FROM counter"),
    );
    assert_eq!(insert.unwrap(), 1);
    assert_eq!(rows_as_strings(&select.unwrap()), vec![vec!["42".to_string()]]);

    connection.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_connections_share_the_session() {
    let (database, first) = setup_database(None).await;
    let second = database.connect().await.unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(database.session().await.unwrap().open_connections(), 2);

    first.execute("CREATE TABLE shared (v TEXT)").await.unwrap();
    first.execute("INSERT INTO shared VALUES ('hello')").await.unwrap();

    let (one, two) = futures::join!(
        first.query("SELECT v FROM shared"),
        second.query("SELECT v FROM shared"),
    );
    assert_eq!(rows_as_strings(&one.unwrap()), vec![vec!["hello".to_string()]]);
    assert_eq!(rows_as_strings(&two.unwrap()), vec![vec!["hello".to_string()]]);

    // Closing one connection leaves the other working
    first.close().await;
    assert!(second.query("SELECT count(*) FROM shared").await.is_ok());

    second.close().await;
    database.shutdown().await.unwrap();
}

const SLOW_COUNT: &str =
    "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 1000000) SELECT count(*) AS n FROM c";

#[tokio::test]
async fn test_close_waits_for_in_flight_query() {
    use embedsql::EmbedSqlError;

    let (database, connection) = setup_database(None).await;

    // Polled in order: the count takes the turn, the second query queues
    // behind it, then close marks the connection closed and queues last
    let (in_flight, queued, ()) = futures::join!(
        connection.query(SLOW_COUNT),
        connection.query("SELECT 1"),
        connection.close(),
    );

    assert_eq!(rows_as_strings(&in_flight.unwrap()), vec![vec!["1000000".to_string()]]);
    assert!(matches!(queued, Err(EmbedSqlError::ConnectionClosed)));
    assert!(connection.is_closed());

    // The session keeps serving other connections
    let session = database.session().await.unwrap();
    assert!(session.is_open());
    assert_eq!(session.open_connections(), 0);
    let other = database.connect().await.unwrap();
    assert_eq!(rows_as_strings(&other.query("SELECT 2").await.unwrap()), vec![vec!["2".to_string()]]);

    other.close().await;
    database.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dropped_query_future_is_discarded() {
    let (database, connection) = setup_database(None).await;

    // Give up on the count almost immediately; the engine still finishes it
    let abandoned = tokio::time::timeout(
        std::time::Duration::from_micros(1),
        connection.query(SLOW_COUNT),
    )
    .await;
    assert!(abandoned.is_err());

    // The reply is dropped and the connection stays usable
    let result = connection.query("SELECT 'after' AS s").await.unwrap();
    assert_eq!(rows_as_strings(&result), vec![vec!["after".to_string()]]);

    connection.close().await;
    let other = database.connect().await.unwrap();
    assert!(other.query(SLOW_COUNT).await.is_ok());

    other.close().await;
    database.shutdown().await.unwrap();
}
