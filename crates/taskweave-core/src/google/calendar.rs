//! Google Calendar v3 client implementing [`CalendarStore`].

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::json;

use super::{local_rfc3339, parse_to_local, path_segment, GoogleApi};
use crate::error::StoreError;
use crate::http::HttpRuntime;
use crate::model::{BusyInterval, CalendarEvent, EventTime, NewEvent};
use crate::ports::{CalendarStore, CredentialSource};
use crate::storage::CalendarConfig;

const SERVICE: &str = "Google Calendar";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<WireEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    start: WireEventTime,
    end: WireEventTime,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: std::collections::HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<FreeBusyBlock>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyBlock {
    start: String,
    end: String,
}

impl WireEventTime {
    fn parse(&self) -> Result<EventTime, StoreError> {
        if let Some(ref raw) = self.date_time {
            return DateTime::parse_from_rfc3339(raw)
                .map(EventTime::DateTime)
                .map_err(|e| StoreError::malformed(SERVICE, format!("bad dateTime {raw:?}: {e}")));
        }
        if let Some(ref raw) = self.date {
            return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(EventTime::Date)
                .map_err(|e| StoreError::malformed(SERVICE, format!("bad date {raw:?}: {e}")));
        }
        Err(StoreError::malformed(SERVICE, "event time has neither dateTime nor date"))
    }
}

impl WireEvent {
    fn into_event(self) -> Result<CalendarEvent, StoreError> {
        Ok(CalendarEvent {
            start: self.start.parse()?,
            end: self.end.parse()?,
            id: self.id,
            summary: self.summary,
            description: self.description,
        })
    }
}

/// Google Calendar REST client bound to one calendar.
pub struct GoogleCalendarClient {
    api: GoogleApi,
    base: String,
    calendar_id: String,
    time_zone: Option<String>,
}

impl GoogleCalendarClient {
    pub fn new(
        http: Arc<HttpRuntime>,
        credentials: Arc<dyn CredentialSource>,
        config: &CalendarConfig,
    ) -> Self {
        Self {
            api: GoogleApi::new(SERVICE, http, credentials),
            base: config.api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            time_zone: config.time_zone.clone(),
        }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base, path_segment(&self.calendar_id))
    }

    /// `{dateTime, timeZone}` for a created event.
    fn event_time(&self, time: NaiveDateTime) -> Result<serde_json::Value, StoreError> {
        Ok(match self.time_zone {
            Some(ref zone) => json!({
                "dateTime": time.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "timeZone": zone,
            }),
            None => json!({ "dateTime": local_rfc3339(time)? }),
        })
    }
}

impl CalendarStore for GoogleCalendarClient {
    fn list_events(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, StoreError> {
        let url = self.events_url();
        let time_min = local_rfc3339(start)?;
        let time_max = local_rfc3339(end)?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.api.client().get(&url).query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: EventsPage = self.api.send(request)?;
            for wire in page.items {
                let id = wire.id.clone();
                match wire.into_event() {
                    Ok(event) => events.push(event),
                    Err(err) => {
                        tracing::warn!(event_id = %id, error = %err, "skipping unreadable event");
                    }
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }

    fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, StoreError> {
        let mut body = json!({
            "summary": event.summary,
            "start": self.event_time(event.start)?,
            "end": self.event_time(event.end)?,
        });
        if let Some(ref description) = event.description {
            body["description"] = json!(description);
        }
        if let Some(ref color) = event.color_id {
            body["colorId"] = json!(color);
        }

        let request = self.api.client().post(self.events_url()).json(&body);
        let created: WireEvent = self.api.send(request)?;
        created.into_event()
    }

    fn free_busy(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, StoreError> {
        let mut body = json!({
            "timeMin": local_rfc3339(start)?,
            "timeMax": local_rfc3339(end)?,
            "items": [{ "id": self.calendar_id }],
        });
        if let Some(ref zone) = self.time_zone {
            body["timeZone"] = json!(zone);
        }

        let request = self
            .api
            .client()
            .post(format!("{}/freeBusy", self.base))
            .json(&body);
        let response: FreeBusyResponse = self.api.send(request)?;

        let mut busy = Vec::new();
        for calendar in response.calendars.into_values() {
            for block in calendar.busy {
                busy.push(BusyInterval::new(
                    parse_to_local(SERVICE, &block.start)?,
                    parse_to_local(SERVICE, &block.end)?,
                ));
            }
        }
        busy.sort();
        Ok(busy)
    }
}
