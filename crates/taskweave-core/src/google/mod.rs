//! Google Tasks and Google Calendar adapters for the store ports.
//!
//! Plain REST over reqwest with a bearer token from a
//! [`CredentialSource`]. Base URLs come from the configuration so tests
//! can point the clients at a mock server.

pub mod calendar;
pub mod tasks;

pub use calendar::GoogleCalendarClient;
pub use tasks::GoogleTasksClient;

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::http::{error_message, HttpRuntime};
use crate::ports::CredentialSource;

/// Authenticated request helper shared by both clients.
#[derive(Clone)]
pub(crate) struct GoogleApi {
    service: &'static str,
    http: Arc<HttpRuntime>,
    credentials: Arc<dyn CredentialSource>,
}

impl GoogleApi {
    pub(crate) fn new(
        service: &'static str,
        http: Arc<HttpRuntime>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            service,
            http,
            credentials,
        }
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        self.http.client()
    }

    /// Send with the bearer token; fail on non-2xx. Returns the raw body.
    fn send_raw(&self, request: RequestBuilder) -> Result<String, StoreError> {
        let token = self.credentials.access_token()?;
        let (status, body) = self.http.execute(request.bearer_auth(token))?;
        if !status.is_success() {
            return Err(StoreError::Api {
                service: self.service,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    pub(crate) fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let body = self.send_raw(request)?;
        serde_json::from_str(&body).map_err(|e| StoreError::malformed(self.service, e.to_string()))
    }

    pub(crate) fn send_empty(&self, request: RequestBuilder) -> Result<(), StoreError> {
        self.send_raw(request).map(|_| ())
    }
}

/// Local wall-clock time as an RFC 3339 timestamp with the local offset.
pub(crate) fn local_rfc3339(time: NaiveDateTime) -> Result<String, StoreError> {
    Local
        .from_local_datetime(&time)
        .earliest()
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| StoreError::Other(format!("{time} does not exist in the local time zone")))
}

/// RFC 3339 timestamp converted to local wall-clock time.
pub(crate) fn parse_to_local(service: &'static str, raw: &str) -> Result<NaiveDateTime, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).naive_local())
        .map_err(|e| StoreError::malformed(service, format!("bad timestamp {raw:?}: {e}")))
}

/// `segment` escaped for use inside a URL path.
pub(crate) fn path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
