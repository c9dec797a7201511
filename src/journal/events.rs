//! Event journal for task markers.
//!
//! - Append-only, shared by every task of a run
//! - Echo order on stdout matches journal order
//! - Persisted as JSONL via write-then-rename

use crate::models::{MarkerKind, Result, TaskEvent, TaskrunError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// Thread-safe collector of `TaskEvent`s.
#[derive(Debug, Default)]
pub struct EventJournal {
    events: Mutex<Vec<TaskEvent>>,
    echo: bool,
}

impl EventJournal {
    /// Create a silent journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal that also prints each marker to stdout.
    pub fn with_echo(echo: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            echo,
        }
    }

    // Appends happen outside any panic-prone section, so a poisoned lock
    // still holds a consistent vector.
    fn lock(&self) -> MutexGuard<'_, Vec<TaskEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event.
    pub fn record(&self, event: TaskEvent) {
        let mut events = self.lock();
        if self.echo {
            println!("{event}");
        }
        events.push(event);
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<TaskEvent> {
        self.lock().clone()
    }

    /// Number of events of the given kind.
    pub fn count(&self, kind: MarkerKind) -> usize {
        self.lock().iter().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write all events to `path` as JSON Lines (atomic write).
    ///
    /// Each call writes through its own temp file next to `path`, which is
    /// removed again if any step before the rename fails.
    ///
    /// Returns the number of events written.
    pub fn write_jsonl(&self, path: &Path) -> Result<usize> {
        let events = self.events();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| TaskrunError::io("creating journal directory", e))?;
        }

        let temp_path = temp_path_for(path);
        let written = Self::write_events(&events, &temp_path)
            .and_then(|()| {
                fs::rename(&temp_path, path).map_err(|e| TaskrunError::io("renaming journal", e))
            });

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!(path = ?temp_path, error = %cleanup, "Temp journal not removed");
            }
            return Err(e);
        }

        debug!(path = ?path, "Journal renamed into place");
        info!(count = events.len(), path = ?path, "Event journal written");
        Ok(events.len())
    }

    fn write_events(events: &[TaskEvent], temp_path: &Path) -> Result<()> {
        let file =
            File::create(temp_path).map_err(|e| TaskrunError::io("creating temp journal", e))?;
        let mut writer = BufWriter::new(file);

        for event in events {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{json}").map_err(|e| TaskrunError::io("writing journal", e))?;
        }

        writer
            .flush()
            .map_err(|e| TaskrunError::io("flushing journal", e))
    }
}

/// Unique sibling of `path`: `<name>.<uuid>.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "journal".to_string());
    path.with_file_name(format!("{name}.{}.tmp", Uuid::new_v4()))
}
