pub mod migrations;
pub mod models;

use axum::http::StatusCode;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Type alias for the shared database connection.
/// rusqlite is synchronous, so the connection sits behind Arc<Mutex> and is used
/// from tokio::task::spawn_blocking.
pub type DbPool = Arc<Mutex<Connection>>;

/// Errors raised by the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            StoreError::Sqlite(_) | StoreError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for (StatusCode, String) {
    fn from(err: StoreError) -> Self {
        if err.status().is_server_error() {
            tracing::error!(error = %err, "Storage failure");
        }
        (err.status(), err.to_string())
    }
}

/// Run `f` against the locked connection on the blocking pool.
pub async fn with_conn<T, F>(db: &DbPool, f: F) -> Result<T, (StatusCode, String)>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = db.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut *conn)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task join: {}", e)))?
    .map_err(Into::into)
}

/// Initialize the SQLite database: create data directory if needed,
/// open (or create) the database file, enable WAL mode, and run migrations.
pub fn init_db(data_dir: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(data_dir)?;

    let db_path = Path::new(data_dir).join("eventboard.db");
    let mut conn = Connection::open(&db_path)?;

    // WAL for concurrent readers
    conn.pragma_update(None, "journal_mode", "WAL")?;
    prepare(&mut conn)?;

    tracing::info!("Database initialized at {}", db_path.display());

    Ok(Arc::new(Mutex::new(conn)))
}

/// Open a private in-memory database with the full schema applied.
pub fn open_in_memory() -> Result<Connection, Box<dyn std::error::Error>> {
    let mut conn = Connection::open_in_memory()?;
    prepare(&mut conn)?;
    Ok(conn)
}

fn prepare(conn: &mut Connection) -> Result<(), Box<dyn std::error::Error>> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    migrations::migrations().to_latest(conn)?;
    Ok(())
}
