//! Task analysis: types, response parsing and degrade-to-default helpers.
//!
//! The analysis capability is allowed to fail or to answer nonsense. Flows
//! go through [`duration_or_default`] and [`travel_minutes_or_default`] so a
//! bad answer never fails an item.

pub mod gemini;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::ports::Analyzer;

pub use gemini::GeminiAnalyzer;

/// Structured prediction for a single task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAnalysis {
    /// 1 (lowest) to 5 (highest).
    #[serde(default)]
    pub importance: Option<u8>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    /// The task names a specific time ("dinner at 7pm").
    #[serde(default)]
    pub is_fixed_time: bool,
    #[serde(default)]
    pub suggested_subtasks: Vec<SuggestedSubtask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedSubtask {
    pub title: String,
    #[serde(default)]
    pub estimated_duration_minutes: Option<i64>,
}

impl TaskAnalysis {
    /// Estimated duration when it is positive and fits in `u32`.
    pub fn duration_minutes(&self) -> Option<u32> {
        self.estimated_duration_minutes
            .filter(|m| *m > 0)
            .and_then(|m| u32::try_from(m).ok())
    }
}

/// Analyzer used when no model is configured. Always answers "nothing".
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAnalyzer;

impl Analyzer for DisabledAnalyzer {
    fn analyze_task(&self, _title: &str, _notes: &str) -> Result<Option<TaskAnalysis>, AnalysisError> {
        Ok(None)
    }

    fn estimate_travel_minutes(&self, _from: &str, _to: &str) -> Result<u32, AnalysisError> {
        Err(AnalysisError::Disabled)
    }

    fn categorize(&self, _title: &str, _candidates: &[&str]) -> Result<Option<String>, AnalysisError> {
        Ok(None)
    }
}

/// Duration for `title`, falling back to `default_minutes` when the
/// analyzer fails, has no estimate, or estimates zero or less.
pub fn duration_or_default<A: Analyzer + ?Sized>(
    analyzer: &A,
    title: &str,
    notes: &str,
    default_minutes: u32,
) -> u32 {
    match analyzer.analyze_task(title, notes) {
        Ok(Some(analysis)) => analysis.duration_minutes().unwrap_or(default_minutes),
        Ok(None) => default_minutes,
        Err(err) => {
            tracing::warn!(title, error = %err, "task analysis failed, using default duration");
            default_minutes
        }
    }
}

/// Travel time between two locations, or `default_minutes` when either is
/// blank or the analyzer fails.
pub fn travel_minutes_or_default<A: Analyzer + ?Sized>(
    analyzer: &A,
    from: &str,
    to: &str,
    default_minutes: u32,
) -> u32 {
    if from.trim().is_empty() || to.trim().is_empty() {
        return default_minutes;
    }
    match analyzer.estimate_travel_minutes(from, to) {
        Ok(minutes) => minutes,
        Err(err) => {
            tracing::debug!(from, to, error = %err, "travel estimate unavailable, using default");
            default_minutes
        }
    }
}

/// Drop Markdown code fences the model likes to wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the JSON object returned for a task analysis request.
pub fn parse_task_analysis(text: &str) -> Result<TaskAnalysis, AnalysisError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).map_err(|e| AnalysisError::Unparseable(format!("{e}: {cleaned}")))
}

/// First run of digits in the answer, e.g. `"About 45 minutes"` → 45.
pub fn parse_travel_minutes(text: &str) -> Result<u32, AnalysisError> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits
        .parse()
        .map_err(|_| AnalysisError::Unparseable(text.trim().to_string()))
}

/// The candidate named by the answer, matched exactly after trimming
/// whitespace and quotes. `"None"` or anything else gives `None`.
pub fn match_category(text: &str, candidates: &[&str]) -> Option<String> {
    let answer = text
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim();
    candidates
        .iter()
        .find(|candidate| **candidate == answer)
        .map(|candidate| candidate.to_string())
}
