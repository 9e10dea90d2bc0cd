//! Database connection setup for the knowledge store.

use std::sync::Once;

use anyhow::Result;
use rusqlite::ffi::sqlite3_auto_extension;
use tokio_rusqlite::Connection;

use crate::knowledge::EMBEDDING_DIM;

static VEC_EXTENSION: Once = Once::new();

/// Registers sqlite-vec so every subsequent connection can create and
/// query vec0 virtual tables. Safe to call more than once.
fn register_vec_extension() {
    VEC_EXTENSION.call_once(|| unsafe {
        sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite_vec::sqlite3_vec_init as *const (),
        )));
    });
}

/// Open an async connection to the knowledge database stored under `path`
pub async fn async_db(path: &str) -> Result<Connection> {
    register_vec_extension();
    let db_file = format!("{}/concierge.sqlite3", path.trim_end_matches('/'));
    let conn = Connection::open(db_file).await?;
    Ok(conn)
}

/// Create the snippet tables if they don't already exist
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(&format!(
        r"
        CREATE TABLE IF NOT EXISTS website_content (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          content TEXT NOT NULL
        );
        CREATE VIRTUAL TABLE IF NOT EXISTS vec_website_content USING vec0(
          embedding float[{}]
        );
        ",
        EMBEDDING_DIM
    ))?;
    Ok(())
}
