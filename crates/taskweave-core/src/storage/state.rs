//! Durable task id → event id mapping.
//!
//! On disk the snapshot is a flat JSON object `{ "<task id>": "<event id>" }`.
//! In memory a reverse index keeps event membership checks O(1). Every
//! mutation rewrites the whole snapshot before returning.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StateError;

/// Persistent link table between tasks and calendar events.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    by_task: BTreeMap<String, String>,
    by_event: HashMap<String, BTreeSet<String>>,
}

impl StateStore {
    /// Load the snapshot at `path`.
    ///
    /// A missing file or content that is not a JSON object of strings gives
    /// an empty mapping. Nothing is written until the first mutation.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let by_task = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(mapping) => mapping,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "state file is malformed, starting empty");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "state file unreadable, starting empty");
                BTreeMap::new()
            }
        };

        let mut by_event: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (task_id, event_id) in &by_task {
            by_event
                .entry(event_id.clone())
                .or_default()
                .insert(task_id.clone());
        }

        tracing::debug!(path = %path.display(), entries = by_task.len(), "state loaded");
        Self {
            path,
            by_task,
            by_event,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Event linked to `task_id`, if any.
    pub fn get(&self, task_id: &str) -> Option<&str> {
        self.by_task.get(task_id).map(String::as_str)
    }

    /// Link `task_id` to `event_id`, replacing any previous link, and persist.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be written. The in-memory
    /// mapping is rolled back in that case.
    pub fn set(&mut self, task_id: &str, event_id: &str) -> Result<(), StateError> {
        let previous = self.by_task.insert(task_id.to_string(), event_id.to_string());
        if let Some(ref old) = previous {
            self.unindex(old, task_id);
        }
        self.index(event_id, task_id);

        if let Err(err) = self.persist() {
            self.unindex(event_id, task_id);
            match previous {
                Some(old) => {
                    self.index(&old, task_id);
                    self.by_task.insert(task_id.to_string(), old);
                }
                None => {
                    self.by_task.remove(task_id);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Drop the link for `task_id` and persist. Returns the removed event id.
    ///
    /// Removing an unknown task is a no-op and does not touch the file.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be written.
    pub fn remove(&mut self, task_id: &str) -> Result<Option<String>, StateError> {
        let Some(event_id) = self.by_task.remove(task_id) else {
            return Ok(None);
        };
        self.unindex(&event_id, task_id);

        if let Err(err) = self.persist() {
            self.index(&event_id, task_id);
            self.by_task.insert(task_id.to_string(), event_id);
            return Err(err);
        }
        Ok(Some(event_id))
    }

    /// Whether any task is linked to `event_id`.
    pub fn contains_event(&self, event_id: &str) -> bool {
        self.by_event.contains_key(event_id)
    }

    /// One task linked to `event_id` (the smallest id when several are).
    pub fn task_for_event(&self, event_id: &str) -> Option<&str> {
        self.by_event
            .get(event_id)
            .and_then(|tasks| tasks.iter().next())
            .map(String::as_str)
    }

    /// All links ordered by task id.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_task.iter().map(|(t, e)| (t.as_str(), e.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_task.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_task.is_empty()
    }

    fn index(&mut self, event_id: &str, task_id: &str) {
        self.by_event
            .entry(event_id.to_string())
            .or_default()
            .insert(task_id.to_string());
    }

    fn unindex(&mut self, event_id: &str, task_id: &str) {
        if let Some(tasks) = self.by_event.get_mut(event_id) {
            tasks.remove(task_id);
            if tasks.is_empty() {
                self.by_event.remove(event_id);
            }
        }
    }

    /// Rewrite the snapshot: temp file next to the target, then rename.
    fn persist(&self) -> Result<(), StateError> {
        let write_failed = |source: std::io::Error| StateError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(&self.by_task)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_failed)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).map_err(write_failed)?;
        fs::rename(&tmp, &self.path).map_err(write_failed)?;
        Ok(())
    }
}
