//! Inbox → Lists: classify inbox tasks and move them to a target list.

use crate::error::Result;
use crate::model::ResolvedLists;
use crate::ports::{relocate_task, Analyzer, RelocateError, TaskStore};
use crate::report::{FlowKind, RunReport};

/// Moves inbox tasks to the destination list picked by the analyzer.
///
/// Does not touch the state store. A task without a usable answer stays
/// in the inbox.
pub struct InboxOrganizer<'a> {
    tasks: &'a dyn TaskStore,
    analyzer: &'a dyn Analyzer,
}

impl<'a> InboxOrganizer<'a> {
    pub fn new(tasks: &'a dyn TaskStore, analyzer: &'a dyn Analyzer) -> Self {
        Self { tasks, analyzer }
    }

    /// # Errors
    /// Fails only when the inbox tasks cannot be listed.
    pub fn run(&self, lists: &ResolvedLists) -> Result<RunReport> {
        let mut report = RunReport::new(FlowKind::InboxToLists);

        let Some(inbox) = lists.inbox() else {
            tracing::warn!("inbox list not found, nothing to organize");
            return Ok(report);
        };

        let destinations: Vec<_> = lists.destinations().collect();
        if destinations.is_empty() {
            tracing::warn!("no target lists found");
            return Ok(report);
        }
        let names: Vec<&str> = destinations.iter().map(|l| l.title.as_str()).collect();

        for task in self.tasks.list_open_tasks(&inbox.id)? {
            let chosen = match self.analyzer.categorize(&task.title, &names) {
                Ok(chosen) => chosen,
                Err(err) => {
                    tracing::warn!(task_id = %task.id, error = %err, "classification failed, keeping in inbox");
                    None
                }
            };

            let Some(destination) = chosen
                .as_deref()
                .and_then(|name| destinations.iter().find(|l| l.title == name))
            else {
                tracing::info!(task_id = %task.id, title = %task.title, "no category found, keeping in inbox");
                report.record_skipped();
                continue;
            };

            match relocate_task(self.tasks, &task, &destination.id) {
                Ok(copy) => {
                    tracing::info!(
                        task_id = %task.id,
                        new_task_id = %copy.id,
                        list = %destination.title,
                        "moved task"
                    );
                    report.record_created();
                }
                Err(RelocateError::InsertFailed(err)) => {
                    tracing::error!(task_id = %task.id, list = %destination.title, error = %err, "failed to move task");
                    report.record_failed();
                }
                Err(RelocateError::DuplicateLeft { copy_id, source }) => {
                    tracing::error!(
                        task_id = %task.id,
                        copy_id = %copy_id,
                        list = %destination.title,
                        error = %source,
                        "task copied but not removed from inbox; it now exists in both lists"
                    );
                    report.record_failed();
                }
            }
        }

        tracing::info!("{report}");
        Ok(report)
    }
}
