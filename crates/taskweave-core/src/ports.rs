//! Collaborator ports consumed by the flows.
//!
//! Every call is synchronous and attempted once. The flows decide which
//! failures are fatal, which are per-item and which degrade to a default.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::analysis::TaskAnalysis;
use crate::error::{AnalysisError, AuthError, StoreError};
use crate::model::{BusyInterval, CalendarEvent, NewEvent, NewTask, Task, TaskList, TaskPatch};

/// Identity provider: yields the bearer token used by the store adapters.
pub trait CredentialSource: Send + Sync {
    fn access_token(&self) -> Result<String, AuthError>;
}

/// Task list store.
pub trait TaskStore {
    fn list_task_lists(&self) -> Result<Vec<TaskList>, StoreError>;

    /// Open (not completed, not hidden) tasks of a list.
    fn list_open_tasks(&self, list_id: &str) -> Result<Vec<Task>, StoreError>;

    fn create_task(&self, list_id: &str, task: &NewTask) -> Result<Task, StoreError>;

    fn update_task(&self, list_id: &str, task_id: &str, patch: &TaskPatch)
        -> Result<Task, StoreError>;

    fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), StoreError>;
}

/// Calendar store. Times are local wall-clock.
pub trait CalendarStore {
    fn list_events(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, StoreError>;

    fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, StoreError>;

    /// Aggregate busy blocks of the calendar.
    fn free_busy(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, StoreError>;
}

/// Natural-language analysis capability.
pub trait Analyzer {
    /// Structured prediction for a task; `Ok(None)` when the capability has
    /// nothing to say.
    fn analyze_task(&self, title: &str, notes: &str)
        -> Result<Option<TaskAnalysis>, AnalysisError>;

    fn estimate_travel_minutes(&self, from: &str, to: &str) -> Result<u32, AnalysisError>;

    /// One of `candidates`, or `None` when no list fits.
    fn categorize(&self, title: &str, candidates: &[&str])
        -> Result<Option<String>, AnalysisError>;
}

/// Failure of the two-step move between lists.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// Nothing changed: the copy could not be created.
    #[error("could not insert task into destination list: {0}")]
    InsertFailed(#[source] StoreError),

    /// The copy exists in the destination but the original could not be
    /// deleted: the task now appears in both lists.
    #[error("task copied to destination as {copy_id} but not deleted from source: {source}")]
    DuplicateLeft {
        copy_id: String,
        #[source]
        source: StoreError,
    },
}

/// Move `task` to `destination_id`: insert a copy, then delete the original.
///
/// The task store has no atomic move. A failure after the insert leaves a
/// duplicate, reported as [`RelocateError::DuplicateLeft`].
pub fn relocate_task<S: TaskStore + ?Sized>(
    store: &S,
    task: &Task,
    destination_id: &str,
) -> Result<Task, RelocateError> {
    let copy = store
        .create_task(destination_id, &NewTask::from(task))
        .map_err(RelocateError::InsertFailed)?;

    store
        .delete_task(&task.list_id, &task.id)
        .map_err(|source| RelocateError::DuplicateLeft {
            copy_id: copy.id.clone(),
            source,
        })?;

    Ok(copy)
}
