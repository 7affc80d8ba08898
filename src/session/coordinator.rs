use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use crate::config::DatabaseConfig;
use crate::{EmbedSqlError, Result};
use super::{Connection, Session};

/// Drives the open -> connect -> query -> close -> reopen cycle of one
/// database slot.
///
/// Reopening replaces the current session: the old one is closed before the
/// new one starts, so two registries are never live at the same time.
#[derive(Default)]
pub struct Database {
    current: Mutex<Option<Arc<Session>>>,
    files: Mutex<FileBuffers>,
}

/// Named byte buffers materialized as files for the engine to read
#[derive(Default)]
struct FileBuffers {
    dir: Option<TempDir>,
    files: BTreeMap<String, PathBuf>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session with `config`, replacing any current one.
    ///
    /// An invalid configuration leaves the current session in place. If the
    /// engine fails to start, the previous session is already closed and the
    /// database has no session afterwards.
    pub async fn open(&self, config: DatabaseConfig) -> Result<Arc<Session>> {
        config.validate()?;

        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            debug!("Replacing session {}", previous.id());
            previous.close().await;
        }

        let session = Session::open(config).await?;
        *current = Some(session.clone());
        Ok(session)
    }

    /// Connect to the current session
    pub async fn connect(&self) -> Result<Connection> {
        let session = self.session().await.ok_or(EmbedSqlError::SessionClosed)?;
        session.connect().await
    }

    /// The current session, if one is open
    pub async fn session(&self) -> Option<Arc<Session>> {
        self.current.lock().await.clone()
    }

    /// Close the current session and drop every registered file
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(session) = self.current.lock().await.take() {
            session.close().await;
        }
        self.drop_files().await
    }

    /// Store `bytes` as a file the engine can open by the returned path
    pub async fn register_file_buffer(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(EmbedSqlError::InvalidParameter(format!("invalid file name: {name:?}")));
        }

        let mut files = self.files.lock().await;
        let dir = match files.dir.take() {
            Some(dir) => dir,
            None => tempfile::Builder::new().prefix("embedsql-").tempdir()?,
        };
        let path = dir.path().join(name);
        files.dir = Some(dir);

        tokio::fs::write(&path, bytes).await?;
        debug!("Registered file buffer {} ({} bytes)", name, bytes.len());
        files.files.insert(name.to_string(), path.clone());
        Ok(path)
    }

    /// Names of the registered file buffers
    pub async fn registered_files(&self) -> Vec<String> {
        self.files.lock().await.files.keys().cloned().collect()
    }

    /// Persist registered buffers and let the engine release cached pages
    pub async fn flush_files(&self) -> Result<()> {
        {
            let files = self.files.lock().await;
            for path in files.files.values() {
                let file = tokio::fs::File::open(path).await?;
                file.sync_all().await?;
            }
        }

        if let Some(session) = self.session().await {
            if session.is_open() {
                session.handler().shrink_memory().await?;
            }
        }
        Ok(())
    }

    /// Delete every registered buffer
    pub async fn drop_files(&self) -> Result<()> {
        let mut files = self.files.lock().await;
        let count = files.files.len();
        for (name, path) in std::mem::take(&mut files.files) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    // The directory removal below still sweeps it up
                    warn!("Failed to remove file buffer {}: {}", name, e);
                }
            }
        }
        if let Some(dir) = files.dir.take() {
            dir.close()?;
        }
        if count > 0 {
            info!("Dropped {} file buffers", count);
        }
        Ok(())
    }
}
