// Session lifecycle: engine worker, sessions, connections and the database slot
pub mod state;
pub mod db_handler;
pub mod core;
pub mod connection;
pub mod coordinator;

pub use state::SessionState;
pub use db_handler::{DbHandler, DbCommand};
pub use core::Session;
pub use connection::Connection;
pub use coordinator::Database;
