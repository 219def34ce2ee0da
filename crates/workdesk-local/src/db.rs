//! Database Connection and Setup
//!
//! Opens the SQLite database and runs the migrations.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum LocalDbError {
    #[error("Failed to open database: {0}")]
    Open(rusqlite::Error),
    #[error("Migration failed ({step}): {source}")]
    Migration {
        step: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Shared handle to one SQLite connection
#[derive(Clone)]
pub struct LocalDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl LocalDb {
    /// Open (or create) the database at `path` and bring the schema up to date.
    /// `:memory:` gives a private in-memory database.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, LocalDbError> {
        let conn = Connection::open(path).map_err(LocalDbError::Open)?;
        run_migrations(&conn)?;
        Ok(Self::wrap(conn))
    }

    /// Open without touching the schema
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, LocalDbError> {
        let conn = Connection::open(path).map_err(LocalDbError::Open)?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(mut rows) = stmt.query([]) else {
        return false;
    };
    while let Ok(Some(row)) = rows.next() {
        if let Ok(name) = row.get::<_, String>(1) {
            if name == column {
                return true;
            }
        }
    }
    false
}

fn step(conn: &Connection, step: &'static str, sql: &str) -> Result<(), LocalDbError> {
    conn.execute_batch(sql)
        .map_err(|source| LocalDbError::Migration { step, source })
}

fn add_column(conn: &Connection, table: &str, column: &'static str, definition: &str) -> Result<(), LocalDbError> {
    if column_exists(conn, table, column) {
        return Ok(());
    }
    log::info!("adding {}.{}", table, column);
    step(conn, column, &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition))
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> Result<(), LocalDbError> {
    step(
        conn,
        "tasks",
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'medium',
            completed INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'Not Started',
            due_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )?;
    step(
        conn,
        "notes",
        "CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            last_edited TEXT NOT NULL
        )",
    )?;
    step(
        conn,
        "rpa_processes",
        "CREATE TABLE IF NOT EXISTS rpa_processes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL DEFAULT 'active',
            owner TEXT,
            department TEXT,
            created_at TEXT NOT NULL,
            last_modified TEXT NOT NULL
        )",
    )?;

    // Columns added after the first release
    add_column(conn, "tasks", "start_date", "TEXT")?;
    add_column(conn, "tasks", "display_order", "INTEGER NOT NULL DEFAULT 0")?;
    add_column(conn, "notes", "display_order", "INTEGER NOT NULL DEFAULT 0")?;
    add_column(conn, "rpa_processes", "entity_name", "TEXT")?;
    add_column(conn, "rpa_processes", "start_date", "TEXT")?;
    add_column(conn, "rpa_processes", "due_date", "TEXT")?;
    add_column(conn, "rpa_processes", "display_order", "INTEGER NOT NULL DEFAULT 0")?;

    step(
        conn,
        "indexes",
        "CREATE INDEX IF NOT EXISTS idx_tasks_user_order ON tasks(user_id, display_order);
         CREATE INDEX IF NOT EXISTS idx_notes_user_order ON notes(user_id, display_order);
         CREATE INDEX IF NOT EXISTS idx_rpa_processes_user_order ON rpa_processes(user_id, display_order);",
    )?;

    Ok(())
}
