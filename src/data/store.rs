//! SQLite record store holding the hike journal.
//!
//! Schema:
//! - `hikes` table: id, name, location, date, parking_available, length,
//!   difficulty, description, weather, recommended_gear
//! - `observations` table: id, hike_id (references `hikes.id`), observation,
//!   time, comments
//!
//! The schema version lives in SQLite's `user_version` pragma. Any mismatch
//! with [`SCHEMA_VERSION`] drops both tables and recreates them empty.

use std::path::Path;

use rusqlite::{Connection, DatabaseName};
use tracing::{debug, info, warn};

use super::error::{StoreError, StoreResult};
use super::hikes::HikeRepository;
use super::observations::ObservationRepository;

pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS hikes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    date TEXT NOT NULL,
    parking_available TEXT NOT NULL,
    length REAL NOT NULL,
    difficulty TEXT NOT NULL,
    description TEXT,
    weather TEXT,
    recommended_gear TEXT
);

CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hike_id INTEGER NOT NULL REFERENCES hikes(id) ON DELETE CASCADE,
    observation TEXT NOT NULL,
    time TEXT NOT NULL,
    comments TEXT
);

CREATE INDEX IF NOT EXISTS idx_observations_hike_id ON observations(hike_id);
"#;

const DROP_TABLES: &str = r#"
DROP TABLE IF EXISTS observations;
DROP TABLE IF EXISTS hikes;
"#;

/// Open handle on the hike database.
///
/// The connection is released when the store is dropped, so holding a `Store`
/// for the lifetime of a command or screen scopes the connection to it.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        debug!(path = ?path, "Opening hike database");
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
        migrate(&conn)?;
        Ok(Store { conn })
    }

    /// Release the connection, reporting any error from closing it
    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    pub fn hikes(&self) -> HikeRepository<'_> {
        HikeRepository::new(&self.conn)
    }

    pub fn observations(&self) -> ObservationRepository<'_> {
        ObservationRepository::new(&self.conn)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn schema_version(conn: &Connection) -> StoreResult<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Bring the schema to [`SCHEMA_VERSION`], discarding data on a version change
fn migrate(conn: &Connection) -> StoreResult<()> {
    let found = schema_version(conn)?;
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    if found == 0 {
        info!(version = SCHEMA_VERSION, "Creating hike database schema");
        conn.execute_batch(&format!(
            "BEGIN;{CREATE_TABLES}PRAGMA user_version = {SCHEMA_VERSION};COMMIT;"
        ))?;
    } else {
        warn!(
            from = found,
            to = SCHEMA_VERSION,
            "Schema version changed, dropping all hikes and observations"
        );
        conn.execute_batch(&format!(
            "BEGIN;{DROP_TABLES}{CREATE_TABLES}PRAGMA user_version = {SCHEMA_VERSION};COMMIT;"
        ))?;
    }
    Ok(())
}
