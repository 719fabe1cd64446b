//! Encode/decode of the sentinel markers kept in task titles and notes.
//!
//! The title prefix says "already on the calendar"; the notes marker says
//! "linked to event X". Flows only talk to [`Markers`], never to the raw
//! literals.

use crate::storage::MarkersConfig;

const EVENT_ID_PLACEHOLDER: &str = "{event_id}";

/// First line of notes on tasks mirrored from calendar events.
pub const MIRRORED_NOTES_HEADER: &str = "From Calendar Event";

#[derive(Debug, Clone)]
pub struct Markers {
    scheduled_prefix: String,
    ref_head: String,
    ref_tail: String,
}

impl Markers {
    pub fn new(config: &MarkersConfig) -> Self {
        let (head, tail) = config
            .event_ref_template
            .split_once(EVENT_ID_PLACEHOLDER)
            .unwrap_or((config.event_ref_template.as_str(), ""));
        Self {
            scheduled_prefix: config.scheduled_prefix.clone(),
            ref_head: head.to_string(),
            ref_tail: tail.to_string(),
        }
    }

    pub fn is_scheduled(&self, title: &str) -> bool {
        title.contains(&self.scheduled_prefix)
    }

    pub fn mark_scheduled(&self, title: &str) -> String {
        format!("{}{}", self.scheduled_prefix, title)
    }

    pub fn back_reference(&self, event_id: &str) -> String {
        format!("{}{}{}", self.ref_head, event_id, self.ref_tail)
    }

    /// Any back-reference, well formed or not, counts.
    pub fn has_back_reference(&self, notes: &str) -> bool {
        if self.ref_head.is_empty() {
            return self.referenced_event(notes).is_some();
        }
        notes.contains(&self.ref_head)
    }

    /// Event id of the first back-reference in `notes`.
    pub fn referenced_event<'a>(&self, notes: &'a str) -> Option<&'a str> {
        let start = notes.find(&self.ref_head)? + self.ref_head.len();
        let rest = &notes[start..];
        let id = if self.ref_tail.is_empty() {
            rest.split_whitespace().next()?
        } else {
            &rest[..rest.find(&self.ref_tail)?]
        };
        (!id.is_empty()).then_some(id)
    }

    /// `notes` with the back-reference appended on its own line.
    pub fn append_back_reference(&self, notes: &str, event_id: &str) -> String {
        let marker = self.back_reference(event_id);
        if notes.is_empty() {
            marker
        } else {
            format!("{notes}\n{marker}")
        }
    }

    /// Notes for a task mirrored from a calendar event.
    pub fn mirrored_notes(&self, event_id: &str) -> String {
        format!("{MIRRORED_NOTES_HEADER}\n{}", self.back_reference(event_id))
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new(&MarkersConfig::default())
    }
}
