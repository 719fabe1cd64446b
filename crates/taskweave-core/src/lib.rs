//! # Taskweave Core Library
//!
//! Keeps a task list store and a calendar in step. Calendar events are
//! mirrored into an inbox list, inbox tasks are classified into target
//! lists, and open tasks are placed into free work-hour slots on the
//! calendar.
//!
//! ## Architecture
//!
//! - **State Store**: durable task id → event id mapping, the source of
//!   idempotency across runs
//! - **Flows**: Calendar → Tasks, Inbox → Lists and Tasks → Calendar, each
//!   a single pass that logs and counts per-item failures
//! - **Ports**: traits for the task store, calendar store, analysis
//!   capability and credentials, with Google and Gemini adapters
//! - **Scheduler**: first-fit slot search over a work-hour constrained
//!   timeline
//!
//! ## Key Components
//!
//! - [`Engine`]: sequences the flows for a run
//! - [`StateStore`]: link persistence
//! - [`Config`]: TOML configuration
//! - [`find_free_slot`]: the interval search

pub mod analysis;
pub mod auth;
pub mod engine;
pub mod error;
pub mod google;
pub mod http;
pub mod markers;
pub mod model;
pub mod ports;
pub mod report;
pub mod scheduler;
pub mod storage;
pub mod sync;

pub use analysis::{DisabledAnalyzer, GeminiAnalyzer, TaskAnalysis};
pub use auth::{EnvOrKeyring, StaticToken};
pub use engine::Engine;
pub use error::{AnalysisError, AuthError, ConfigError, CoreError, StateError, StoreError};
pub use google::{GoogleCalendarClient, GoogleTasksClient};
pub use http::HttpRuntime;
pub use markers::Markers;
pub use model::{CalendarEvent, ListRole, ResolvedLists, Task, TaskList};
pub use ports::{relocate_task, Analyzer, CalendarStore, CredentialSource, RelocateError, TaskStore};
pub use report::{FlowKind, RunReport};
pub use scheduler::{find_free_slot, SchedulePlan, SchedulingFlow, TimeSlot, WorkHours};
pub use storage::{Config, StateStore};
pub use sync::{CalendarMirror, InboxOrganizer};
