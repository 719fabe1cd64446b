//! Gemini-backed implementation of the [`Analyzer`] port.
//!
//! Calls the `models/{model}:generateContent` REST endpoint with an API
//! key. Without a key every call degrades (see [`DisabledAnalyzer`]).
//!
//! [`DisabledAnalyzer`]: super::DisabledAnalyzer

use std::sync::Arc;

use indoc::formatdoc;
use serde_json::json;

use super::{match_category, parse_task_analysis, parse_travel_minutes, TaskAnalysis};
use crate::error::AnalysisError;
use crate::http::{error_message, HttpRuntime};
use crate::ports::Analyzer;
use crate::storage::AnalysisConfig;

pub struct GeminiAnalyzer {
    http: Arc<HttpRuntime>,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    pub fn new(http: Arc<HttpRuntime>, config: &AnalysisConfig, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        }
    }

    /// Send `prompt` and return the first candidate's text.
    fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base,
            urlencoding::encode(&self.model)
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let request = self
            .http
            .client()
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);
        let (status, text) = self.http.execute(request)?;

        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Unparseable(e.to_string()))?;
        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AnalysisError::Unparseable("response has no candidate text".into()))
    }
}

impl Analyzer for GeminiAnalyzer {
    fn analyze_task(&self, title: &str, notes: &str) -> Result<Option<TaskAnalysis>, AnalysisError> {
        let prompt = formatdoc! {r#"
            You are a smart task scheduler assistant. Analyze the following task and return a JSON object.

            Task Title: {title}
            Task Notes: {notes}

            Output JSON format:
            {{
                "importance": (1-5, 5 being highest),
                "estimated_duration_minutes": (integer, default 30 if unknown),
                "location": (string or null),
                "is_fixed_time": (boolean, true if the task implies a specific time like 'Dinner at 7pm'),
                "suggested_subtasks": [
                    {{"title": "Subtask 1", "estimated_duration_minutes": 15}}
                ]
            }}
            Only include suggested_subtasks when the task is complex enough to need a breakdown.

            Return ONLY the JSON.
        "#};

        let text = self.generate(&prompt)?;
        parse_task_analysis(&text).map(Some)
    }

    fn estimate_travel_minutes(&self, from: &str, to: &str) -> Result<u32, AnalysisError> {
        let prompt = formatdoc! {r#"
            Estimate the travel time from "{from}" to "{to}" by public transport or driving (whichever is typical).
            Return ONLY the number of minutes as an integer.
        "#};

        let text = self.generate(&prompt)?;
        parse_travel_minutes(&text)
    }

    fn categorize(&self, title: &str, candidates: &[&str]) -> Result<Option<String>, AnalysisError> {
        if candidates.is_empty() {
            return Ok(None);
        }
        let prompt = formatdoc! {r#"
            Assign the task "{title}" to one of the following lists: {lists}.
            Return ONLY the list name. If no list is clearly appropriate, return "None".
        "#, lists = candidates.join(", ")};

        let text = self.generate(&prompt)?;
        Ok(match_category(&text, candidates))
    }
}
