use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;
use crate::query::QueryResult;
use crate::{EmbedSqlError, Result};
use super::Session;

/// A query channel bound to one session.
///
/// Statements submitted on the same connection run one at a time in
/// submission order: the query lock is a fair FIFO mutex held for the whole
/// round trip to the engine.
pub struct Connection {
    id: Uuid,
    session: Arc<Session>,
    query_lock: Mutex<()>,
    closed: AtomicBool,
}

impl Connection {
    pub(crate) fn new(id: Uuid, session: Arc<Session>) -> Self {
        Self {
            id,
            session,
            query_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Run a statement and return its rows as a columnar result
    pub async fn query(&self, sql: &str) -> Result<QueryResult> {
        let _turn = self.query_lock.lock().await;
        self.ensure_usable()?;
        self.session.handler().query(self.id, sql).await
    }

    /// Run a statement that returns no rows, reporting how many rows it changed
    pub async fn execute(&self, sql: &str) -> Result<usize> {
        let _turn = self.query_lock.lock().await;
        self.ensure_usable()?;
        self.session.handler().execute(self.id, sql).await
    }

    /// Release this connection's engine resources. Idempotent.
    ///
    /// A query already in flight is allowed to finish first; queries queued
    /// behind it fail with `ConnectionClosed`.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let _turn = self.query_lock.lock().await;
        if self.session.is_open() {
            // The engine may already be gone if the session closed meanwhile
            if let Err(e) = self.session.handler().detach(self.id).await {
                debug!("Detach of connection {} skipped: {}", self.id, e);
            }
        }
        self.session.connection_released();
        debug!("Closed connection {}", self.id);
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.is_closed() {
            return Err(EmbedSqlError::ConnectionClosed);
        }
        self.session.ensure_open()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.session.handler().detach_nowait(self.id);
            self.session.connection_released();
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("session", &self.session.id())
            .field("closed", &self.is_closed())
            .finish()
    }
}
