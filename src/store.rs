// Task store over a single SQLite table

use crate::config::WriteFailurePolicy;
use crate::task::{Partitions, Task, today};
use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

const CURRENT_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        done BOOLEAN NOT NULL DEFAULT 0,
        value TEXT NOT NULL,
        date TEXT NOT NULL
    );
"#;

/// Persistent task list backed by one SQLite connection
///
/// The store keeps no state besides the connection and the write-failure
/// policy. Callers re-read both partitions with [`TaskStore::refresh_all`]
/// after every mutation.
pub struct TaskStore {
    db: Connection,
    policy: WriteFailurePolicy,
}

impl TaskStore {
    /// Open or create a store backed by the database file at `path`
    ///
    /// Missing parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P, policy: WriteFailurePolicy) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;
        debug!(path = %path.display(), "Opened database");

        Self::with_connection(db, policy)
    }

    /// Open a store on a fresh in-memory database
    pub fn open_in_memory(policy: WriteFailurePolicy) -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(db, policy)
    }

    /// Wrap an existing connection, bringing its schema up to date
    pub fn with_connection(db: Connection, policy: WriteFailurePolicy) -> Result<Self> {
        db.busy_timeout(BUSY_TIMEOUT)?;

        let mut store = Self { db, policy };
        store.migrate()?;
        Ok(store)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    pub fn policy(&self) -> WriteFailurePolicy {
        self.policy
    }

    /// Stored schema version (`PRAGMA user_version`)
    pub fn schema_version(&self) -> Result<u32> {
        let version = self.db.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Create the items table once and advance the version marker
    fn migrate(&mut self) -> Result<()> {
        let version = self.schema_version()?;

        if version > CURRENT_VERSION {
            return Err(eyre!(
                "Database schema version {} is newer than supported version {}",
                version,
                CURRENT_VERSION
            ));
        }

        if version == CURRENT_VERSION {
            debug!(version, "Database schema is current");
            return Ok(());
        }

        info!(from = version, to = CURRENT_VERSION, "Initializing database schema");

        let tx = self.db.transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", CURRENT_VERSION))?;
        tx.commit()?;

        Ok(())
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Add a pending task dated today
    ///
    /// Blank text is ignored and yields `Ok(None)`. A failed write is handled
    /// according to the store's [`WriteFailurePolicy`]: logged and reported as
    /// `Ok(None)`, or returned as an error.
    pub fn create(&mut self, value: &str) -> Result<Option<i64>> {
        if value.trim().is_empty() {
            debug!("Ignoring blank task");
            return Ok(None);
        }

        let date = today();
        debug!(%date, "create: inserting task");

        match self.insert(value, &date) {
            Ok(id) => {
                info!(id, %date, "Added task");
                Ok(Some(id))
            }
            Err(e) => match self.policy {
                WriteFailurePolicy::LogAndSwallow => {
                    error!(error = ?e, "Failed to add task, dropping it");
                    Ok(None)
                }
                WriteFailurePolicy::Propagate => Err(e),
            },
        }
    }

    fn insert(&self, value: &str, date: &str) -> Result<i64> {
        self.db
            .execute(
                "INSERT INTO items (done, value, date) VALUES (?1, ?2, ?3)",
                rusqlite::params![false, value, date],
            )
            .context("Failed to insert task")?;

        Ok(self.db.last_insert_rowid())
    }

    /// List tasks whose `done` flag equals `done`, oldest first
    pub fn list_by_status(&self, done: bool) -> Result<Vec<Task>> {
        query_status(&self.db, done)
    }

    /// Mark a task as done
    ///
    /// Returns whether a pending task was completed. Unknown or already
    /// completed ids are a no-op.
    pub fn mark_done(&mut self, id: i64) -> Result<bool> {
        let changed = self
            .db
            .execute("UPDATE items SET done = 1 WHERE id = ?1 AND done = 0", [id])
            .context("Failed to mark task as done")?;

        if changed == 0 {
            debug!(id, "mark_done: no pending task with this id");
        } else {
            info!(id, "Completed task");
        }

        Ok(changed > 0)
    }

    /// Delete a task regardless of its status
    ///
    /// Returns whether a row was removed. Unknown ids are a no-op.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let changed = self
            .db
            .execute("DELETE FROM items WHERE id = ?1", [id])
            .context("Failed to delete task")?;

        if changed == 0 {
            debug!(id, "delete: no task with this id");
        } else {
            info!(id, "Deleted task");
        }

        Ok(changed > 0)
    }

    /// Read both partitions from one snapshot
    pub fn refresh_all(&self) -> Result<Partitions> {
        let tx = self
            .db
            .unchecked_transaction()
            .context("Failed to begin read transaction")?;

        let pending = query_status(&tx, false)?;
        let completed = query_status(&tx, true)?;

        tx.commit()?;

        debug!(pending = pending.len(), completed = completed.len(), "Refreshed task lists");
        Ok(Partitions { pending, completed })
    }

    /// Get a task by id
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .db
            .query_row("SELECT id, done, value, date FROM items WHERE id = ?1", [id], task_from_row)
            .optional()?;
        Ok(task)
    }

    /// Total number of persisted tasks
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.db.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn query_status(db: &Connection, done: bool) -> Result<Vec<Task>> {
    let mut stmt = db
        .prepare("SELECT id, done, value, date FROM items WHERE done = ?1 ORDER BY id")
        .context("Failed to prepare task query")?;

    let rows = stmt.query_map([done], task_from_row)?;

    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?);
    }
    Ok(tasks)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        done: row.get(1)?,
        value: row.get(2)?,
        date: row.get(3)?,
    })
}
