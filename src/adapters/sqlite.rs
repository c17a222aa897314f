use crate::domain::model::{RequestLogEntry, SetRow};
use crate::utils::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

const INSERT_REQUEST_SQL: &str =
    "INSERT INTO scryfall_history (url, headers, response_code, error) VALUES (?1, ?2, ?3, ?4)";

const INSERT_SET_SQL: &str = "INSERT INTO mtg_set (name, code, set_type, digital, released_at, card_count, search_uri, icon_uri) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Handle to the single SQLite connection shared by the audit log and the set writer.
///
/// Precondition: one writer per database file. Clones share the same connection and
/// calls are serialized through the mutex, but nothing coordinates with other processes
/// writing the same file.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Creates the audit and set tables when missing. Existing tables are left alone.
    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS scryfall_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                headers TEXT NOT NULL,
                response_code INTEGER,
                error TEXT,
                requested_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS mtg_set (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                code TEXT NOT NULL,
                set_type TEXT NOT NULL,
                digital INTEGER NOT NULL,
                released_at TEXT NOT NULL,
                card_count INTEGER NOT NULL,
                search_uri TEXT NOT NULL,
                icon_uri TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Appends one audit row. Runs in autocommit mode, so the row is durable on return.
    pub async fn record_request(&self, entry: &RequestLogEntry) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            INSERT_REQUEST_SQL,
            params![entry.url, entry.headers, entry.response_code, entry.error],
        )?;
        Ok(())
    }

    /// Inserts every row inside one transaction and commits once.
    pub async fn insert_set_rows(&self, rows: &[SetRow]) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        let inserted = insert_rows(&mut conn, rows)?;
        Ok(inserted)
    }

    pub async fn request_history(&self) -> Result<Vec<RequestLogEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT url, headers, response_code, error FROM scryfall_history ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(RequestLogEntry {
                url: row.get(0)?,
                headers: row.get(1)?,
                response_code: row.get(2)?,
                error: row.get(3)?,
            })
        })?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub async fn set_rows(&self) -> Result<Vec<SetRow>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT name, code, set_type, digital, released_at, card_count, search_uri, icon_uri
             FROM mtg_set ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SetRow {
                name: row.get(0)?,
                code: row.get(1)?,
                set_type: row.get(2)?,
                digital: row.get(3)?,
                released_at: row.get(4)?,
                card_count: row.get(5)?,
                search_uri: row.get(6)?,
                icon_uri: row.get(7)?,
            })
        })?;
        let sets = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sets)
    }

    /// Runs `f` with exclusive access to the connection.
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().await;
        f(&mut conn)
    }
}

fn insert_rows(conn: &mut Connection, rows: &[SetRow]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(INSERT_SET_SQL)?;
        for row in rows {
            stmt.execute(params![
                row.name,
                row.code,
                row.set_type,
                row.digital,
                row.released_at,
                row.card_count,
                row.search_uri,
                row.icon_uri,
            ])?;
        }
    }
    tx.commit()?;
    Ok(rows.len())
}
