use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::DatabaseConfig;
use crate::types::ResultTypeRegistry;
use crate::{EmbedSqlError, Result};
use super::{Connection, DbHandler, SessionState};

/// One open database with a fixed configuration.
///
/// The configuration and the registry derived from it never change; a
/// different coercion policy means opening a new session.
pub struct Session {
    id: Uuid,
    config: DatabaseConfig,
    registry: Arc<ResultTypeRegistry>,
    handler: DbHandler,
    state: RwLock<SessionState>,
    open_connections: AtomicUsize,
}

impl Session {
    /// Validate the configuration, start the engine and derive the registry
    pub async fn open(config: DatabaseConfig) -> Result<Arc<Session>> {
        config.validate()?;

        let registry = Arc::new(ResultTypeRegistry::new(config.coercion_policy()));
        let handler = DbHandler::open(&config, registry.clone()).await?;

        let session = Session {
            id: Uuid::new_v4(),
            config,
            registry,
            handler,
            state: RwLock::new(SessionState::Uninitialized),
            open_connections: AtomicUsize::new(0),
        };
        session.transition(SessionState::Open);

        info!(
            "Opened session {} on {} (castDurationToTime64: {})",
            session.id,
            session.config.path,
            session.registry.policy().duration_to_time_of_day
        );
        Ok(Arc::new(session))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn registry(&self) -> &ResultTypeRegistry {
        &self.registry
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Number of connections attached and not yet closed
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }

    /// Open a new connection on this session
    pub async fn connect(self: &Arc<Self>) -> Result<Connection> {
        self.ensure_open()?;

        let connection_id = Uuid::new_v4();
        self.handler.attach(connection_id).await?;
        self.open_connections.fetch_add(1, Ordering::SeqCst);

        debug!("Session {} connected {}", self.id, connection_id);
        Ok(Connection::new(connection_id, self.clone()))
    }

    /// Close the session and stop its engine; closing twice is a no-op.
    ///
    /// Connections still holding this session fail with `SessionClosed`
    /// from here on.
    pub async fn close(&self) {
        if !self.transition(SessionState::Closed) {
            return;
        }
        self.handler.shutdown().await;
        info!("Closed session {}", self.id);
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(EmbedSqlError::SessionClosed)
        }
    }

    pub(crate) fn handler(&self) -> &DbHandler {
        &self.handler
    }

    pub(crate) fn connection_released(&self) {
        // Saturate at zero; a release can race with session close
        let _ = self.open_connections.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    /// Apply a state transition if it is legal, returning whether it happened
    fn transition(&self, next: SessionState) -> bool {
        let mut state = self.state.write();
        if state.can_transition_to(next) {
            *state = next;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}
