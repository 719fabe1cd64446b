//! Per-run summary counts.

use serde::Serialize;
use std::fmt;

/// Which flow produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    CalendarToTasks,
    InboxToLists,
    Scheduling,
}

impl FlowKind {
    pub fn label(self) -> &'static str {
        match self {
            FlowKind::CalendarToTasks => "calendar -> tasks",
            FlowKind::InboxToLists => "inbox -> lists",
            FlowKind::Scheduling => "tasks -> calendar",
        }
    }
}

/// Counts of what a flow did with the items it looked at.
///
/// `processed` counts every item examined; each one ends up in exactly one
/// of `created`, `skipped` or `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub flow: FlowKind,
    pub processed: usize,
    /// Tasks created, tasks moved, or events placed, depending on the flow.
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(flow: FlowKind) -> Self {
        Self {
            flow,
            processed: 0,
            created: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub(crate) fn record_created(&mut self) {
        self.processed += 1;
        self.created += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.processed += 1;
        self.skipped += 1;
    }

    pub(crate) fn record_failed(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: processed {}, created {}, skipped {}, failed {}",
            self.flow.label(),
            self.processed,
            self.created,
            self.skipped,
            self.failed
        )
    }
}
