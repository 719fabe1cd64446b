//! Synchronization flows between the calendar, the inbox and the target
//! lists.

pub mod calendar_to_tasks;
pub mod inbox;

pub use calendar_to_tasks::CalendarMirror;
pub use inbox::InboxOrganizer;
