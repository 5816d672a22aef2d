use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::entity::{is_blank, random_color, Note, DEFAULT_COLOR};
use crate::error::{BoardError, Result};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB: &str = "thoughts.db";

/// Stored timestamp layout. Lexical order equals chronological order, and
/// rows written with SQLite's `CURRENT_TIMESTAMP` share the same prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// `%.f` also accepts a missing fraction.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "SELECT id, board_id, content, color, timestamp FROM thoughts";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT).map(|naive| naive.and_utc())
}

/// Append-only SQLite log of notes, keyed by board.
pub struct NoteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl NoteStore {
    /// Open or create the database at `path` and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the schema if absent. Never touches existing rows.
    pub fn initialize(&self) -> Result<()> {
        // Column set and defaults match databases written by earlier
        // deployments, so those open unchanged.
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS thoughts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    board_id TEXT NOT NULL,
                    content TEXT NOT NULL,
                    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                    x_position INTEGER DEFAULT 0,
                    y_position INTEGER DEFAULT 0,
                    color TEXT DEFAULT '{}'
                )",
                DEFAULT_COLOR
            ),
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_thoughts_board_ts ON thoughts(board_id, timestamp, id)",
            [],
        )?;

        Ok(())
    }

    /// Persist a new note and return it as stored.
    ///
    /// The store assigns `id`, `timestamp` and `color`. Returns only after
    /// the row is committed. Content is only rejected when empty; a
    /// whitespace-only board id is rejected as well.
    pub fn append(&self, board_id: &str, content: &str) -> Result<Note> {
        if is_blank(board_id) || content.is_empty() {
            return Err(BoardError::missing_fields());
        }

        let timestamp = format_timestamp(&Utc::now());
        let color = random_color();

        self.conn.execute(
            "INSERT INTO thoughts (board_id, content, timestamp, x_position, y_position, color)
             VALUES (?1, ?2, ?3, 0, 0, ?4)",
            params![board_id, content, timestamp, color],
        )?;
        let id = self.conn.last_insert_rowid();

        self.get(id)?
            .ok_or_else(|| BoardError::Storage(format!("note {} vanished after insert", id)))
    }

    /// All notes of a board, oldest first, ties broken by id.
    ///
    /// Sorting goes through `julianday` so rows with and without a
    /// fractional second compare by instant, not by text.
    pub fn list_by_board(&self, board_id: &str) -> Result<Vec<Note>> {
        if board_id.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE board_id = ?1 ORDER BY julianday(timestamp), id",
            SELECT_COLUMNS
        ))?;

        let notes = stmt
            .query_map([board_id], note_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn count_by_board(&self, board_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM thoughts WHERE board_id = ?1",
            [board_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn get(&self, id: i64) -> Result<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                note_from_row,
            )
            .optional()?;
        Ok(note)
    }
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let raw: String = row.get(4)?;
    let timestamp = parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Note {
        id: row.get(0)?,
        board_id: row.get(1)?,
        content: row.get(2)?,
        color: row.get(3)?,
        timestamp,
    })
}

impl From<rusqlite::Error> for BoardError {
    fn from(e: rusqlite::Error) -> Self {
        BoardError::Storage(format!("SQLite error: {}", e))
    }
}
