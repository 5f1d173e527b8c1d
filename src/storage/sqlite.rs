//! SqliteStore: a StateStore on a single SQLite table.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::StoreError;

use super::traits::{MicroState, StateStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS srt_token_state (
    salt INTEGER PRIMARY KEY,
    uid  BLOB,
    hash TEXT
);
CREATE INDEX IF NOT EXISTS srt_token_state_uid ON srt_token_state (uid);
";

const PUT_STATE: &str =
    "INSERT OR REPLACE INTO srt_token_state (salt, uid, hash) VALUES (?1, ?2, ?3)";
const GET_STATE: &str = "SELECT uid, salt, hash FROM srt_token_state WHERE salt = ?1";
const GET_STATES: &str =
    "SELECT uid, salt, hash FROM srt_token_state WHERE uid = ?1 ORDER BY salt";
const REMOVE_STATE: &str = "DELETE FROM srt_token_state WHERE salt = ?1";
const REMOVE_STATES: &str = "DELETE FROM srt_token_state WHERE uid = ?1";

// Salts live in [1, i64::MAX], so they round-trip through SQLite's signed
// INTEGER unchanged.
fn to_sql_salt(salt: u64) -> i64 {
    salt as i64
}

fn row_to_state(row: &Row<'_>) -> rusqlite::Result<MicroState> {
    let salt: i64 = row.get(1)?;
    Ok(MicroState {
        uid: row.get(0)?,
        salt: salt as u64,
        hash: row.get(2)?,
    })
}

/// SQLite-backed revocation state.
///
/// The connection sits behind a mutex; every call is one short statement.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) a database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened sqlite state store");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        Ok(f(conn)?)
    }
}

impl StateStore for SqliteStore {
    fn put(&self, state: &MicroState) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                PUT_STATE,
                params![to_sql_salt(state.salt), state.uid, state.hash],
            )
        })?;
        Ok(())
    }

    fn get(&self, salt: u64) -> Result<Option<MicroState>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(GET_STATE, params![to_sql_salt(salt)], row_to_state)
                .optional()
        })
    }

    fn list(&self, uid: &[u8]) -> Result<Vec<MicroState>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(GET_STATES)?;
            let rows = stmt.query_map(params![uid], row_to_state)?;
            let states = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(states)
        })
    }

    fn remove(&self, salt: u64) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute(REMOVE_STATE, params![to_sql_salt(salt)]))?;
        Ok(())
    }

    fn remove_all(&self, uid: &[u8]) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute(REMOVE_STATES, params![uid]))?;
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        if let Some(conn) = self.conn.lock().take() {
            conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        }
        Ok(())
    }
}
