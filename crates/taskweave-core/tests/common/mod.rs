//! In-memory fakes of the ports for flow-level tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use taskweave_core::error::{AnalysisError, StoreError};
use taskweave_core::model::{
    BusyInterval, CalendarEvent, EventTime, NewEvent, NewTask, Task, TaskList, TaskPatch,
};
use taskweave_core::ports::{Analyzer, CalendarStore, TaskStore};
use taskweave_core::TaskAnalysis;

pub const INBOX: &str = "inbox";
pub const WORK: &str = "work";
pub const HOME: &str = "home";
pub const SHOPPING: &str = "shopping";

pub fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

pub fn timed(time: NaiveDateTime) -> EventTime {
    EventTime::DateTime(
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .from_local_datetime(&time)
            .unwrap(),
    )
}

pub fn event(id: &str, summary: &str, start: NaiveDateTime, end: NaiveDateTime) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        description: None,
        start: timed(start),
        end: timed(end),
    }
}

pub fn task(id: &str, list_id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        list_id: list_id.to_string(),
        title: title.to_string(),
        notes: String::new(),
        due: None,
    }
}

#[derive(Default)]
pub struct FakeTasks {
    pub lists: Vec<TaskList>,
    pub tasks: RefCell<Vec<Task>>,
    next_id: Cell<u32>,
    pub fail_create_in: RefCell<HashSet<String>>,
    pub fail_update: RefCell<HashSet<String>>,
    pub fail_delete: RefCell<HashSet<String>>,
}

impl FakeTasks {
    /// Inbox `■メモ`, targets `■Work` and `■Home`, and an unmanaged list.
    pub fn standard() -> Self {
        let list = |id: &str, title: &str| TaskList {
            id: id.to_string(),
            title: title.to_string(),
        };
        Self {
            lists: vec![
                list(INBOX, "■メモ"),
                list(WORK, "■Work"),
                list(HOME, "■Home"),
                list(SHOPPING, "Shopping"),
            ],
            ..Self::default()
        }
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        *self.tasks.borrow_mut() = tasks;
        self
    }

    pub fn in_list(&self, list_id: &str) -> Vec<Task> {
        self.tasks
            .borrow()
            .iter()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect()
    }

    pub fn find(&self, task_id: &str) -> Option<Task> {
        self.tasks.borrow().iter().find(|t| t.id == task_id).cloned()
    }
}

impl TaskStore for FakeTasks {
    fn list_task_lists(&self) -> Result<Vec<TaskList>, StoreError> {
        Ok(self.lists.clone())
    }

    fn list_open_tasks(&self, list_id: &str) -> Result<Vec<Task>, StoreError> {
        Ok(self.in_list(list_id))
    }

    fn create_task(&self, list_id: &str, new: &NewTask) -> Result<Task, StoreError> {
        if self.fail_create_in.borrow().contains(list_id) {
            return Err(StoreError::Other(format!("insert into {list_id} refused")));
        }
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let created = Task {
            id: format!("new-{n}"),
            list_id: list_id.to_string(),
            title: new.title.clone(),
            notes: new.notes.clone(),
            due: new.due,
        };
        self.tasks.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_task(&self, list_id: &str, task_id: &str, patch: &TaskPatch) -> Result<Task, StoreError> {
        if self.fail_update.borrow().contains(task_id) {
            return Err(StoreError::Other(format!("update of {task_id} refused")));
        }
        let mut tasks = self.tasks.borrow_mut();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id && t.list_id == list_id)
            .ok_or_else(|| StoreError::Other(format!("{task_id} not found")))?;
        if let Some(ref title) = patch.title {
            task.title = title.clone();
        }
        if let Some(ref notes) = patch.notes {
            task.notes = notes.clone();
        }
        Ok(task.clone())
    }

    fn delete_task(&self, list_id: &str, task_id: &str) -> Result<(), StoreError> {
        if self.fail_delete.borrow().contains(task_id) {
            return Err(StoreError::Other(format!("delete of {task_id} refused")));
        }
        self.tasks
            .borrow_mut()
            .retain(|t| !(t.id == task_id && t.list_id == list_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    pub events: RefCell<Vec<CalendarEvent>>,
    pub created: RefCell<Vec<NewEvent>>,
    next_id: Cell<u32>,
    pub fail_create_for: RefCell<HashSet<String>>,
    pub fail_list: Cell<bool>,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        let calendar = Self::default();
        *calendar.events.borrow_mut() = events;
        calendar
    }
}

impl CalendarStore for FakeCalendar {
    fn list_events(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<CalendarEvent>, StoreError> {
        if self.fail_list.get() {
            return Err(StoreError::Other("calendar unavailable".into()));
        }
        Ok(self
            .events
            .borrow()
            .iter()
            .filter(|e| match e.busy_interval() {
                Some(busy) => busy.overlaps(start, end),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn create_event(&self, new: &NewEvent) -> Result<CalendarEvent, StoreError> {
        if self.fail_create_for.borrow().contains(&new.summary) {
            return Err(StoreError::Other(format!("event {:?} refused", new.summary)));
        }
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let created = CalendarEvent {
            id: format!("event-{n}"),
            summary: Some(new.summary.clone()),
            description: new.description.clone(),
            start: timed(new.start),
            end: timed(new.end),
        };
        self.created.borrow_mut().push(new.clone());
        self.events.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn free_busy(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<BusyInterval>, StoreError> {
        let mut busy: Vec<_> = self
            .list_events(start, end)?
            .iter()
            .filter_map(|e| e.busy_interval())
            .collect();
        busy.sort();
        Ok(busy)
    }
}

/// Answers from fixed tables keyed by task title.
#[derive(Default)]
pub struct FakeAnalyzer {
    pub durations: HashMap<String, i64>,
    pub categories: HashMap<String, String>,
    pub failing: HashSet<String>,
}

impl FakeAnalyzer {
    pub fn duration(mut self, title: &str, minutes: i64) -> Self {
        self.durations.insert(title.to_string(), minutes);
        self
    }

    pub fn category(mut self, title: &str, list: &str) -> Self {
        self.categories.insert(title.to_string(), list.to_string());
        self
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }
}

impl Analyzer for FakeAnalyzer {
    fn analyze_task(&self, title: &str, _notes: &str) -> Result<Option<TaskAnalysis>, AnalysisError> {
        if self.failing.contains(title) {
            return Err(AnalysisError::Unparseable("not json".into()));
        }
        Ok(self.durations.get(title).map(|minutes| TaskAnalysis {
            estimated_duration_minutes: Some(*minutes),
            ..TaskAnalysis::default()
        }))
    }

    fn estimate_travel_minutes(&self, _from: &str, _to: &str) -> Result<u32, AnalysisError> {
        Err(AnalysisError::Disabled)
    }

    fn categorize(&self, title: &str, _candidates: &[&str]) -> Result<Option<String>, AnalysisError> {
        if self.failing.contains(title) {
            return Err(AnalysisError::Api {
                status: 500,
                message: "backend error".into(),
            });
        }
        Ok(self.categories.get(title).cloned())
    }
}
