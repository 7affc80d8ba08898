use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};
use uuid::Uuid;
use crate::config::DatabaseConfig;
use crate::query::{QueryExecutor, QueryResult};
use crate::types::ResultTypeRegistry;
use crate::{EmbedSqlError, Result};

/// Depth of the command queue in front of the engine thread
const COMMAND_QUEUE_DEPTH: usize = 100;

pub enum DbCommand {
    Attach {
        connection_id: Uuid,
        response: oneshot::Sender<Result<()>>,
    },
    Detach {
        connection_id: Uuid,
        response: Option<oneshot::Sender<Result<()>>>,
    },
    Query {
        connection_id: Uuid,
        query: String,
        response: oneshot::Sender<Result<QueryResult>>,
    },
    Execute {
        connection_id: Uuid,
        query: String,
        response: oneshot::Sender<Result<usize>>,
    },
    ShrinkMemory {
        response: oneshot::Sender<Result<()>>,
    },
    Shutdown {
        response: oneshot::Sender<()>,
    },
}

/// Handle to the single engine worker of a session.
///
/// The engine handle lives on a dedicated thread; callers suspend on a
/// oneshot reply while it works. Commands are served strictly in arrival order.
pub struct DbHandler {
    sender: mpsc::Sender<DbCommand>,
}

impl DbHandler {
    /// Spawn the engine thread and wait until it has opened the database
    pub async fn open(config: &DatabaseConfig, registry: Arc<ResultTypeRegistry>) -> Result<Self> {
        let (sender, receiver) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (init_tx, init_rx) = oneshot::channel();
        let db_path = config.path.clone();

        thread::Builder::new()
            .name("embedsql-engine".to_string())
            .spawn(move || {
                let conn = match open_engine(&db_path) {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to open database {}: {}", db_path, e);
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                if init_tx.send(Ok(())).is_err() {
                    // Caller gave up on open before we finished
                    return;
                }
                if let Some(done) = run_engine(conn, receiver, registry) {
                    let _ = done.send(());
                }
            })
            .map_err(|e| EmbedSqlError::EngineInitFailed(format!("cannot spawn engine thread: {e}")))?;

        match init_rx.await {
            Ok(Ok(())) => Ok(DbHandler { sender }),
            Ok(Err(e)) => Err(EmbedSqlError::EngineInitFailed(e.to_string())),
            Err(_) => Err(EmbedSqlError::EngineInitFailed("engine thread exited during startup".to_string())),
        }
    }

    pub async fn attach(&self, connection_id: Uuid) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(DbCommand::Attach { connection_id, response: tx }).await?;
        rx.await.map_err(|_| EmbedSqlError::SessionClosed)?
    }

    pub async fn detach(&self, connection_id: Uuid) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(DbCommand::Detach { connection_id, response: Some(tx) }).await?;
        rx.await.map_err(|_| EmbedSqlError::SessionClosed)?
    }

    /// Fire-and-forget detach for contexts that cannot await (drop)
    pub fn detach_nowait(&self, connection_id: Uuid) {
        let _ = self.sender.try_send(DbCommand::Detach { connection_id, response: None });
    }

    pub async fn query(&self, connection_id: Uuid, query: &str) -> Result<QueryResult> {
        let (tx, rx) = oneshot::channel();
        self.send(DbCommand::Query {
            connection_id,
            query: query.to_string(),
            response: tx,
        }).await?;
        rx.await.map_err(|_| EmbedSqlError::SessionClosed)?
    }

    pub async fn execute(&self, connection_id: Uuid, query: &str) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(DbCommand::Execute {
            connection_id,
            query: query.to_string(),
            response: tx,
        }).await?;
        rx.await.map_err(|_| EmbedSqlError::SessionClosed)?
    }

    /// Ask the engine to release cached pages it no longer needs
    pub async fn shrink_memory(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(DbCommand::ShrinkMemory { response: tx }).await?;
        rx.await.map_err(|_| EmbedSqlError::SessionClosed)?
    }

    /// Stop the engine and wait until it has released the database
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(DbCommand::Shutdown { response: tx }).await.is_ok() {
            let _ = rx.await;
        }
    }

    async fn send(&self, cmd: DbCommand) -> Result<()> {
        self.sender.send(cmd).await.map_err(|_| EmbedSqlError::SessionClosed)
    }
}

fn open_engine(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = if db_path == crate::config::IN_MEMORY_PATH {
        Connection::open_in_memory()?
    } else {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn
    };

    conn.execute_batch(
        "PRAGMA synchronous=NORMAL;
         PRAGMA temp_store=MEMORY;"
    )?;

    crate::functions::register_all_functions(&conn)?;
    Ok(conn)
}

/// Serve commands until shutdown; returns the shutdown acknowledgement, to be
/// sent once the engine handle is dropped
fn run_engine(
    conn: Connection,
    mut receiver: mpsc::Receiver<DbCommand>,
    registry: Arc<ResultTypeRegistry>,
) -> Option<oneshot::Sender<()>> {
    let mut attached: HashSet<Uuid> = HashSet::new();

    while let Some(cmd) = receiver.blocking_recv() {
        match cmd {
            DbCommand::Attach { connection_id, response } => {
                attached.insert(connection_id);
                debug!("Attached connection {} ({} open)", connection_id, attached.len());
                let _ = response.send(Ok(()));
            }
            DbCommand::Detach { connection_id, response } => {
                if attached.remove(&connection_id) {
                    debug!("Detached connection {} ({} open)", connection_id, attached.len());
                }
                if attached.is_empty() {
                    // No connection can reuse a cached cursor any more
                    conn.flush_prepared_statement_cache();
                }
                if let Some(response) = response {
                    let _ = response.send(Ok(()));
                }
            }
            DbCommand::Query { connection_id, query, response } => {
                debug!("Connection {} query: {}", connection_id, query);
                let result = QueryExecutor::execute(&conn, &query, &registry);
                let _ = response.send(result);
            }
            DbCommand::Execute { connection_id, query, response } => {
                debug!("Connection {} execute: {}", connection_id, query);
                let result = QueryExecutor::execute_dml(&conn, &query);
                let _ = response.send(result);
            }
            DbCommand::ShrinkMemory { response } => {
                let result = conn.execute_batch("PRAGMA shrink_memory;").map_err(EmbedSqlError::from);
                let _ = response.send(result);
            }
            DbCommand::Shutdown { response } => {
                info!("Database handler thread shutting down");
                drop(conn);
                return Some(response);
            }
        }
    }

    info!("Database handler thread shutting down");
    None
}
