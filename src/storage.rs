use crate::errors::{StoreError, StoreResult};
use crate::models::{Entry, EntryFields};
use rusqlite::{Connection, params};
use std::{path::Path, sync::Arc};
use tokio::sync::Mutex;
use tracing::info;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS schedule (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        reg_no   TEXT NOT NULL,
        name     TEXT NOT NULL,
        company  TEXT NOT NULL,
        duration TEXT NOT NULL,
        date     TEXT NOT NULL,
        room     TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_schedule_date_duration ON schedule (date, duration);
";

const INSERT_ENTRY: &str =
    "INSERT INTO schedule (reg_no, name, company, duration, date, room) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_ENTRIES: &str =
    "SELECT id, reg_no, name, company, duration, date, room FROM schedule ORDER BY date, duration";
const UPDATE_ENTRY: &str = "UPDATE schedule SET reg_no = ?1, name = ?2, company = ?3, duration = ?4, date = ?5, room = ?6 WHERE id = ?7";
const DELETE_ENTRY: &str = "DELETE FROM schedule WHERE id = ?1";

/// The `schedule` table behind a single shared connection.
#[derive(Clone)]
pub struct EntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl EntryStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        info!("opened schedule database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Inserts a row and returns the id SQLite assigned to it.
    pub async fn create(&self, fields: &EntryFields) -> StoreResult<i64> {
        fields.validate()?;
        let conn = self.conn.lock().await;
        conn.execute(
            INSERT_ENTRY,
            params![
                fields.reg_number,
                fields.name,
                fields.company_name,
                fields.duration,
                fields.date,
                fields.room_number
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All rows ordered by `(date, duration)`.
    pub async fn list(&self) -> StoreResult<Vec<Entry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(SELECT_ENTRIES)?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub async fn update(&self, id: i64, fields: &EntryFields) -> StoreResult<()> {
        fields.validate()?;
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            UPDATE_ENTRY,
            params![
                fields.reg_number,
                fields.name,
                fields.company_name,
                fields.duration,
                fields.date,
                fields.room_number,
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        if conn.execute(DELETE_ENTRY, params![id])? == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get("id")?,
        fields: EntryFields {
            reg_number: row.get("reg_no")?,
            name: row.get("name")?,
            company_name: row.get("company")?,
            duration: row.get("duration")?,
            date: row.get("date")?,
            room_number: row.get("room")?,
        },
    })
}
