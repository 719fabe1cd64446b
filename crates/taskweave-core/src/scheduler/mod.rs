//! Tasks → Calendar: place unscheduled tasks into free work-hour slots.

pub mod slot;

pub use slot::{find_free_slot, TimeSlot, WorkHours};

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::analysis::duration_or_default;
use crate::error::{ConfigError, Result};
use crate::markers::Markers;
use crate::model::{BusyInterval, NewEvent, ResolvedLists, Task, TaskPatch};
use crate::ports::{Analyzer, CalendarStore, TaskStore};
use crate::report::{FlowKind, RunReport};
use crate::storage::{Config, StateStore};

/// A task together with the slot it would get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPlacement {
    pub task: Task,
    pub duration_minutes: u32,
    pub slot: TimeSlot,
}

/// Outcome of a dry run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulePlan {
    pub placements: Vec<PlannedPlacement>,
    /// Tasks with no free slot before the horizon.
    pub unplaced: Vec<Task>,
}

/// Drop tasks already on the calendar: scheduled title, back-reference in
/// the notes, or a recorded link.
pub fn select_candidates(tasks: Vec<Task>, markers: &Markers, state: &StateStore) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| {
            !markers.is_scheduled(&task.title)
                && !markers.has_back_reference(&task.notes)
                && state.get(&task.id).is_none()
        })
        .collect()
}

/// Stable sort by due date, tasks without one last.
pub fn sort_by_due(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.due.is_none(), task.due));
}

/// `now` truncated to the minute, moved forward to the work start when it
/// is earlier in the day.
pub fn run_start(now: NaiveDateTime, hours: WorkHours) -> NaiveDateTime {
    let truncated = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    truncated.max(hours.day_start(truncated.date()))
}

struct Prepared {
    candidates: Vec<Task>,
    busy: Vec<BusyInterval>,
    start: NaiveDateTime,
    horizon_end: NaiveDateTime,
}

fn insert_sorted(busy: &mut Vec<BusyInterval>, interval: BusyInterval) {
    let at = busy.partition_point(|b| *b <= interval);
    busy.insert(at, interval);
}

/// Places each unscheduled task into the first free slot, creates the
/// event and marks the task.
pub struct SchedulingFlow<'a> {
    tasks: &'a dyn TaskStore,
    calendar: &'a dyn CalendarStore,
    analyzer: &'a dyn Analyzer,
    markers: Markers,
    hours: WorkHours,
    horizon_days: u32,
    default_duration_minutes: u32,
    color_id: Option<String>,
}

impl<'a> SchedulingFlow<'a> {
    /// # Errors
    /// Returns an error when the configured work hours are not a valid
    /// window.
    pub fn new(
        config: &Config,
        tasks: &'a dyn TaskStore,
        calendar: &'a dyn CalendarStore,
        analyzer: &'a dyn Analyzer,
    ) -> Result<Self, ConfigError> {
        let hours = WorkHours::from_config(&config.schedule).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "schedule.work_start_hour".to_string(),
                message: format!(
                    "work hours {}-{} are not a valid window",
                    config.schedule.work_start_hour, config.schedule.work_end_hour
                ),
            }
        })?;

        Ok(Self {
            tasks,
            calendar,
            analyzer,
            markers: Markers::new(&config.markers),
            hours,
            horizon_days: config.schedule.horizon_days,
            default_duration_minutes: config.schedule.default_duration_minutes,
            color_id: config.calendar.color_id.clone(),
        })
    }

    fn prepare(
        &self,
        lists: &ResolvedLists,
        state: &StateStore,
        now: NaiveDateTime,
    ) -> Result<Prepared> {
        let mut open = Vec::new();
        for list in lists.schedulable() {
            open.extend(self.tasks.list_open_tasks(&list.id)?);
        }
        let total = open.len();
        let mut candidates = select_candidates(open, &self.markers, state);
        sort_by_due(&mut candidates);
        tracing::info!(total, candidates = candidates.len(), "selected tasks to schedule");

        let start = run_start(now, self.hours);
        let horizon_end = start + Duration::days(i64::from(self.horizon_days));

        let mut busy: Vec<BusyInterval> = self
            .calendar
            .list_events(start, horizon_end)?
            .iter()
            .filter_map(|event| event.busy_interval())
            .collect();
        busy.sort();
        tracing::debug!(count = busy.len(), %start, %horizon_end, "loaded busy intervals");

        Ok(Prepared {
            candidates,
            busy,
            start,
            horizon_end,
        })
    }

    fn duration_for(&self, task: &Task) -> u32 {
        duration_or_default(
            self.analyzer,
            &task.title,
            &task.notes,
            self.default_duration_minutes,
        )
    }

    /// Compute placements without creating events or touching tasks.
    ///
    /// # Errors
    /// Fails when tasks or events cannot be listed.
    pub fn plan(
        &self,
        lists: &ResolvedLists,
        state: &StateStore,
        now: NaiveDateTime,
    ) -> Result<SchedulePlan> {
        let Prepared {
            candidates,
            mut busy,
            start,
            horizon_end,
        } = self.prepare(lists, state, now)?;

        let mut plan = SchedulePlan::default();
        let mut cursor = start;
        for task in candidates {
            let minutes = self.duration_for(&task);
            let duration = Duration::minutes(i64::from(minutes));
            match find_free_slot(cursor, duration, &busy, self.hours, horizon_end) {
                Some(slot) => {
                    insert_sorted(&mut busy, slot.as_busy());
                    cursor = slot.start;
                    plan.placements.push(PlannedPlacement {
                        task,
                        duration_minutes: minutes,
                        slot,
                    });
                }
                None => plan.unplaced.push(task),
            }
        }
        Ok(plan)
    }

    /// Place every candidate task and record the links.
    ///
    /// # Errors
    /// Fails when tasks or events cannot be listed, or when a link cannot
    /// be persisted. Per-task store failures are logged and counted.
    pub fn run(
        &self,
        lists: &ResolvedLists,
        state: &mut StateStore,
        now: NaiveDateTime,
    ) -> Result<RunReport> {
        let Prepared {
            candidates,
            mut busy,
            start,
            horizon_end,
        } = self.prepare(lists, state, now)?;

        let mut report = RunReport::new(FlowKind::Scheduling);
        let mut cursor = start;

        for task in candidates {
            let duration = Duration::minutes(i64::from(self.duration_for(&task)));

            let Some(slot) = find_free_slot(cursor, duration, &busy, self.hours, horizon_end)
            else {
                tracing::warn!(task_id = %task.id, title = %task.title, "no free slot before the horizon");
                report.record_skipped();
                continue;
            };

            let new_event = NewEvent {
                summary: task.title.clone(),
                description: Some(format!("Task ID: {}\n{}", task.id, task.notes)),
                start: slot.start,
                end: slot.end,
                color_id: self.color_id.clone(),
            };
            let event = match self.calendar.create_event(&new_event) {
                Ok(event) => event,
                Err(err) => {
                    tracing::error!(task_id = %task.id, error = %err, "failed to create event");
                    report.record_failed();
                    continue;
                }
            };
            insert_sorted(&mut busy, slot.as_busy());

            let patch = TaskPatch {
                title: Some(self.markers.mark_scheduled(&task.title)),
                notes: Some(self.markers.append_back_reference(&task.notes, &event.id)),
            };
            let marked = self.tasks.update_task(&task.list_id, &task.id, &patch);

            state.set(&task.id, &event.id)?;

            match marked {
                Ok(_) => {
                    tracing::info!(
                        task_id = %task.id,
                        event_id = %event.id,
                        start = %slot.start,
                        end = %slot.end,
                        "scheduled task"
                    );
                    report.record_created();
                }
                Err(err) => {
                    tracing::error!(
                        task_id = %task.id,
                        event_id = %event.id,
                        error = %err,
                        "event created but task could not be marked"
                    );
                    report.record_failed();
                }
            }

            // Next search starts at this slot's start, not its end.
            cursor = slot.start;
        }

        tracing::info!("{report}");
        Ok(report)
    }
}
