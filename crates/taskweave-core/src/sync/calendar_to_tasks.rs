//! Calendar → Tasks: mirror unlinked calendar events into the inbox.

use chrono::{Duration, NaiveDateTime};

use crate::error::Result;
use crate::markers::Markers;
use crate::model::{NewTask, ResolvedLists};
use crate::ports::{CalendarStore, TaskStore};
use crate::report::{FlowKind, RunReport};
use crate::storage::{Config, StateStore};

const UNTITLED_EVENT: &str = "No Title";

/// Creates one inbox task per calendar event that no task is linked to yet.
///
/// Idempotent: linked events are skipped, and every task created here is
/// linked before the next event is looked at.
pub struct CalendarMirror<'a> {
    tasks: &'a dyn TaskStore,
    calendar: &'a dyn CalendarStore,
    markers: Markers,
    horizon_days: u32,
}

impl<'a> CalendarMirror<'a> {
    pub fn new(config: &Config, tasks: &'a dyn TaskStore, calendar: &'a dyn CalendarStore) -> Self {
        Self {
            tasks,
            calendar,
            markers: Markers::new(&config.markers),
            horizon_days: config.schedule.horizon_days,
        }
    }

    /// Mirror events in `[now, now + horizon]`.
    ///
    /// # Errors
    /// Fails when the events cannot be listed or a new link cannot be
    /// persisted. A task that cannot be created is logged and counted.
    pub fn run(
        &self,
        lists: &ResolvedLists,
        state: &mut StateStore,
        now: NaiveDateTime,
    ) -> Result<RunReport> {
        let mut report = RunReport::new(FlowKind::CalendarToTasks);

        let Some(inbox) = lists.inbox() else {
            tracing::warn!("inbox list not found, nothing to mirror into");
            return Ok(report);
        };

        let end = now + Duration::days(i64::from(self.horizon_days));
        let events = self.calendar.list_events(now, end)?;
        tracing::info!(count = events.len(), "fetched calendar events");

        for event in events {
            if state.contains_event(&event.id) {
                tracing::debug!(event_id = %event.id, "event already linked");
                report.record_skipped();
                continue;
            }

            let summary = event.summary.as_deref().unwrap_or(UNTITLED_EVENT);
            let new_task = NewTask {
                title: self.markers.mark_scheduled(summary),
                notes: self.markers.mirrored_notes(&event.id),
                due: None,
            };

            match self.tasks.create_task(&inbox.id, &new_task) {
                Ok(task) => {
                    state.set(&task.id, &event.id)?;
                    tracing::info!(event_id = %event.id, task_id = %task.id, summary, "mirrored event into inbox");
                    report.record_created();
                }
                Err(err) => {
                    tracing::error!(event_id = %event.id, summary, error = %err, "failed to create task for event");
                    report.record_failed();
                }
            }
        }

        tracing::info!("{report}");
        Ok(report)
    }
}
