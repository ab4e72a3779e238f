//! SQLite connection bootstrap.
//!
//! Opens the database, configures pragmas and applies migrations before the
//! connection is handed to anyone. The process-wide connection lives behind
//! a `parking_lot::Mutex` and is acquired per request; writes that must be
//! atomic run inside explicit transactions at the repository layer.

pub mod migrations;

use anyhow::{Context, Result};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared handle to the journal database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file and apply pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path.as_ref())
            .with_context(|| format!("failed to open database at {:?}", path.as_ref()))?;
        bootstrap_connection(&mut conn)?;

        info!(
            path = %path.as_ref().display(),
            schema_version = migrations::latest_version(),
            "database ready"
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        bootstrap_connection(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection for the duration of one request.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

fn bootstrap_connection(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .context("failed to configure connection pragmas")?;
    // journal_mode reports the resulting mode as a row
    conn.query_row("PRAGMA journal_mode = WAL;", [], |_| Ok(()))
        .context("failed to enable WAL")?;
    conn.busy_timeout(Duration::from_secs(5))
        .context("failed to set busy timeout")?;
    migrations::apply_migrations(conn).context("failed to apply migrations")?;
    Ok(())
}
