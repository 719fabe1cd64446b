//! Runs the flows against one set of ports and one state snapshot.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::model::ResolvedLists;
use crate::ports::{Analyzer, CalendarStore, TaskStore};
use crate::report::RunReport;
use crate::scheduler::{SchedulePlan, SchedulingFlow};
use crate::storage::{Config, StateStore};
use crate::sync::{CalendarMirror, InboxOrganizer};

/// Owns the collaborators for a run. Flows never call each other; the
/// engine sequences them.
pub struct Engine {
    config: Config,
    tasks: Box<dyn TaskStore>,
    calendar: Box<dyn CalendarStore>,
    analyzer: Box<dyn Analyzer>,
    state: StateStore,
}

impl Engine {
    pub fn new(
        config: Config,
        tasks: Box<dyn TaskStore>,
        calendar: Box<dyn CalendarStore>,
        analyzer: Box<dyn Analyzer>,
        state: StateStore,
    ) -> Self {
        Self {
            config,
            tasks,
            calendar,
            analyzer,
            state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Fetch all task lists and tag each with its role.
    pub fn resolve_lists(&self) -> Result<ResolvedLists> {
        let lists = self.tasks.list_task_lists()?;
        let resolved = ResolvedLists::resolve(lists, &self.config.lists);
        tracing::debug!(lists = resolved.lists.len(), "resolved task lists");
        Ok(resolved)
    }

    pub fn sync_calendar(&mut self, lists: &ResolvedLists, now: NaiveDateTime) -> Result<RunReport> {
        CalendarMirror::new(&self.config, self.tasks.as_ref(), self.calendar.as_ref())
            .run(lists, &mut self.state, now)
    }

    pub fn organize_inbox(&self, lists: &ResolvedLists) -> Result<RunReport> {
        InboxOrganizer::new(self.tasks.as_ref(), self.analyzer.as_ref()).run(lists)
    }

    pub fn schedule(&mut self, lists: &ResolvedLists, now: NaiveDateTime) -> Result<RunReport> {
        let flow = SchedulingFlow::new(
            &self.config,
            self.tasks.as_ref(),
            self.calendar.as_ref(),
            self.analyzer.as_ref(),
        )?;
        flow.run(lists, &mut self.state, now)
    }

    /// Placements the scheduler would make, without writing anything.
    pub fn plan_schedule(&self, lists: &ResolvedLists, now: NaiveDateTime) -> Result<SchedulePlan> {
        let flow = SchedulingFlow::new(
            &self.config,
            self.tasks.as_ref(),
            self.calendar.as_ref(),
            self.analyzer.as_ref(),
        )?;
        flow.plan(lists, &self.state, now)
    }

    /// Calendar → Tasks, then Inbox → Lists, then scheduling, with list
    /// roles resolved once up front.
    ///
    /// # Errors
    /// Stops at the first flow that fails; earlier reports are lost with it.
    pub fn run_all(&mut self, now: NaiveDateTime) -> Result<Vec<RunReport>> {
        let lists = self.resolve_lists()?;
        Ok(vec![
            self.sync_calendar(&lists, now)?,
            self.organize_inbox(&lists)?,
            self.schedule(&lists, now)?,
        ])
    }
}
