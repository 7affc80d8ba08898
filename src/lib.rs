pub mod config;
pub mod functions;
pub mod query;
pub mod session;
pub mod translator;
pub mod types;
pub mod wire;

pub use config::DatabaseConfig;
pub use query::QueryResult;
pub use session::{Connection, Database, Session, SessionState};
pub use types::{Interval, ResultTypeRegistry, Time64, Value};
pub use wire::{DecodeError, Decoder, DecoderCapabilities};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedSqlError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Engine initialization failed: {0}")]
    EngineInitFailed(String),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EmbedSqlError>;

impl EmbedSqlError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            EmbedSqlError::ConfigInvalid(_) => "config_invalid",
            EmbedSqlError::EngineInitFailed(_) => "engine_init_failed",
            EmbedSqlError::SessionClosed => "session_closed",
            EmbedSqlError::ConnectionClosed => "connection_closed",
            EmbedSqlError::Decode(_) => "decode_error",
            EmbedSqlError::Sqlite(_) => "engine_error",
            EmbedSqlError::TypeConversion(_) => "type_conversion",
            EmbedSqlError::InvalidParameter(_) => "invalid_parameter",
            EmbedSqlError::Io(_) => "io_error",
        }
    }
}
