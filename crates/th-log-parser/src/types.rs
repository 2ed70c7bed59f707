//! Type definitions for the structured artifact sections

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A log line recognized as a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLine {
    /// Zero-based position in the log
    pub linenumber: usize,

    /// Line content as dispatched (after truncation)
    pub line: String,
}

/// Outcome of a buildbot step
///
/// Buildbot reports these as numeric codes in the step-finished marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepResult {
    Success,
    TestFailed,
    Busted,
    Skipped,
    Exception,
    Retry,
    UserCancel,
    Unknown,
}

impl StepResult {
    /// Map a buildbot result code to a step result
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::TestFailed,
            2 => Self::Busted,
            3 => Self::Skipped,
            4 => Self::Exception,
            5 => Self::Retry,
            6 => Self::UserCancel,
            _ => Self::Unknown,
        }
    }
}

/// A single step of the build, delimited by start/finish markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step name as printed in the start marker
    pub name: String,

    /// Zero-based position among all steps
    pub order: usize,

    /// Start timestamp as printed in the log
    pub started: String,

    pub started_linenumber: usize,

    /// Finish timestamp (None while the step is still open)
    pub finished: Option<String>,

    pub finished_linenumber: Option<usize>,

    /// Elapsed seconds between start and finish timestamps
    pub duration: Option<i64>,

    pub result: StepResult,

    /// Recorded error lines, capped per step
    pub errors: Vec<ErrorLine>,

    /// Number of error lines seen, including those beyond the cap
    pub error_count: usize,
}

impl Step {
    /// Create an open step
    pub fn new(name: String, order: usize, started: String, started_linenumber: usize) -> Self {
        Self {
            name,
            order,
            started,
            started_linenumber,
            finished: None,
            finished_linenumber: None,
            duration: None,
            result: StepResult::Unknown,
            errors: Vec::new(),
            error_count: 0,
        }
    }

    /// Whether a finish marker has been seen for this step
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }
}

/// Artifact of the step parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    pub steps: Vec<Step>,

    /// Error lines of all steps, in log order
    pub all_errors: Vec<ErrorLine>,

    /// True if any step saw more error lines than it recorded
    pub errors_truncated: bool,
}

/// How a job detail's value should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "link")]
    Link,

    #[serde(rename = "raw_html")]
    RawHtml,

    /// Value is an embedded talos result object
    #[serde(rename = "TalosResult")]
    TalosResult,
}

/// One `TinderboxPrint:` entry of the job-info artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub content_type: ContentType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Display value; a JSON object for talos results, a string otherwise
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl JobDetail {
    /// Create a link entry
    pub fn link(title: Option<String>, value: String, url: String) -> Self {
        Self {
            content_type: ContentType::Link,
            title,
            value: Value::String(value),
            url: Some(url),
        }
    }

    /// Create a raw html entry
    pub fn raw_html(title: Option<String>, value: String) -> Self {
        Self {
            content_type: ContentType::RawHtml,
            title,
            value: Value::String(value),
            url: None,
        }
    }
}
