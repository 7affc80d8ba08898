// Module for engine-side SQL function implementations
pub mod interval_functions;

use rusqlite::{Connection, Result};

/// Register all custom functions on a fresh engine handle
pub fn register_all_functions(conn: &Connection) -> Result<()> {
    interval_functions::register_interval_functions(conn)?;
    Ok(())
}
