//! Domain types shared by the flows and the store adapters.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::storage::ListsConfig;

/// A task as read from the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Id of the list that currently owns the task.
    pub list_id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    /// Due date; the task store only keeps the date part.
    #[serde(default)]
    pub due: Option<NaiveDate>,
}

/// Fields for a task about to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub notes: String,
    pub due: Option<NaiveDate>,
}

/// Copy used when a task moves lists. Status, links and parent are not
/// modeled, so the copy is an open top-level task.
impl From<&Task> for NewTask {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
        }
    }
}

/// Partial update of a task. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub title: String,
}

/// Role of a task list, resolved once per run from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListRole {
    /// The inbox. `schedulable` when its title also carries the target prefix.
    Inbox { schedulable: bool },
    /// Classification destination and source of schedulable tasks.
    Target,
    /// Ignored by every flow.
    Unmanaged,
}

impl ListRole {
    pub fn of(list: &TaskList, rules: &ListsConfig) -> Self {
        let prefixed = list.title.starts_with(&rules.target_prefix);
        if list.title == rules.inbox_name {
            ListRole::Inbox {
                schedulable: prefixed,
            }
        } else if prefixed {
            ListRole::Target
        } else {
            ListRole::Unmanaged
        }
    }

    pub fn is_schedulable(self) -> bool {
        matches!(self, ListRole::Target | ListRole::Inbox { schedulable: true })
    }

    pub fn is_destination(self) -> bool {
        matches!(self, ListRole::Target)
    }
}

/// Task lists with their roles.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLists {
    pub lists: Vec<(TaskList, ListRole)>,
}

impl ResolvedLists {
    pub fn resolve(lists: Vec<TaskList>, rules: &ListsConfig) -> Self {
        let lists = lists
            .into_iter()
            .map(|list| {
                let role = ListRole::of(&list, rules);
                (list, role)
            })
            .collect();
        Self { lists }
    }

    /// The first list named like the inbox.
    pub fn inbox(&self) -> Option<&TaskList> {
        self.lists
            .iter()
            .find(|(_, role)| matches!(role, ListRole::Inbox { .. }))
            .map(|(list, _)| list)
    }

    /// Lists whose tasks the scheduler considers.
    pub fn schedulable(&self) -> impl Iterator<Item = &TaskList> {
        self.lists
            .iter()
            .filter(|(_, role)| role.is_schedulable())
            .map(|(list, _)| list)
    }

    /// Lists an inbox task can be moved to. Never contains the inbox.
    pub fn destinations(&self) -> impl Iterator<Item = &TaskList> {
        self.lists
            .iter()
            .filter(|(_, role)| role.is_destination())
            .map(|(list, _)| list)
    }
}

/// Start or end of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    DateTime(DateTime<FixedOffset>),
    /// All-day events only carry a date.
    Date(NaiveDate),
}

impl EventTime {
    /// Wall-clock reading with the offset dropped.
    pub fn naive_local(&self) -> Option<NaiveDateTime> {
        match self {
            EventTime::DateTime(dt) => Some(dt.naive_local()),
            EventTime::Date(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

impl CalendarEvent {
    /// Timed span of the event; `None` for all-day events.
    pub fn busy_interval(&self) -> Option<BusyInterval> {
        Some(BusyInterval {
            start: self.start.naive_local()?,
            end: self.end.naive_local()?,
        })
    }
}

/// Fields for an event about to be created. Times are local wall-clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub color_id: Option<String>,
}

/// A time range already occupied on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BusyInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// `max(start) < min(end)`; touching intervals do not overlap.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start.max(start) < self.end.min(end)
    }
}
