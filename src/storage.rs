//! Task persistence.
//!
//! `TaskStore` is the contract the list screen talks to, injected at
//! construction so the screen never reaches for a global. `JsonStore` is the
//! shipped implementation: a single pretty-printed JSON file written
//! atomically via temp file + rename. Mutations are staged in memory and
//! flushed by `commit`, so a burst of edits costs one write.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::Task;

/// Errors from loading or committing the task database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database file exists but does not parse as a task database.
    #[error("failed to parse task database: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persistence contract consumed by the list screen.
///
/// `create`, `update` and `delete` stage changes in memory and cannot fail;
/// durability is decided by the `commit` that follows.
pub trait TaskStore {
    /// All persisted tasks in stored order. A missing database file is an
    /// empty store, not an error.
    fn fetch_all(&mut self) -> Result<Vec<Task>, StoreError>;

    /// Stage a new task with the next free id and return it.
    fn create(&mut self, title: &str) -> Task;

    /// Stage a title change. Unknown ids are ignored.
    fn update(&mut self, id: u64, new_title: &str);

    /// Stage removal of a task. Unknown ids are ignored.
    fn delete(&mut self, id: u64);

    /// Flush staged mutations to durable storage. No-op when nothing is
    /// pending.
    fn commit(&mut self) -> Result<(), StoreError>;
}

/// Serialized form of the database file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Records {
    tasks: Vec<Task>,
}

/// File-backed task store.
pub struct JsonStore {
    path: PathBuf,
    records: Records,
    dirty: bool,
}

impl JsonStore {
    /// Create a store over the given database file. Nothing is read from
    /// disk until `fetch_all`.
    pub fn open(path: impl AsRef<Path>) -> Self {
        JsonStore {
            path: path.as_ref().to_path_buf(),
            records: Records::default(),
            dirty: false,
        }
    }

    /// Generate the next available task id.
    fn next_id(&self) -> u64 {
        self.records.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }
}

impl TaskStore for JsonStore {
    fn fetch_all(&mut self) -> Result<Vec<Task>, StoreError> {
        if !self.path.exists() {
            self.records = Records::default();
            self.dirty = false;
            return Ok(Vec::new());
        }
        let mut buf = String::new();
        File::open(&self.path)?.read_to_string(&mut buf)?;
        self.records = serde_json::from_str(&buf)?;
        self.dirty = false;
        Ok(self.records.tasks.clone())
    }

    fn create(&mut self, title: &str) -> Task {
        let task = Task {
            id: self.next_id(),
            title: title.to_string(),
        };
        self.records.tasks.push(task.clone());
        self.dirty = true;
        task
    }

    fn update(&mut self, id: u64, new_title: &str) {
        if let Some(task) = self.records.tasks.iter_mut().find(|t| t.id == id) {
            task.title = new_title.to_string();
            self.dirty = true;
        }
    }

    fn delete(&mut self, id: u64) {
        let before = self.records.tasks.len();
        self.records.tasks.retain(|t| t.id != id);
        if self.records.tasks.len() != before {
            self.dirty = true;
        }
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        // Atomic-ish write via temp + rename.
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(&self.records)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        Ok(())
    }
}
