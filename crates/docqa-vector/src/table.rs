//! LanceDB connection helpers.

use anyhow::Result;
use lancedb::{connect, Connection};
use std::path::Path;

/// Open (or create) the database directory at `db_path`.
pub async fn open_db(db_path: &Path) -> Result<Connection> {
    std::fs::create_dir_all(db_path)?;
    Ok(connect(db_path.to_string_lossy().as_ref()).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}
