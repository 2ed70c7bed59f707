//! `TinderboxPrint:` job detail parsing
//!
//! Harnesses print summary information for the job as
//! `TinderboxPrint: <payload>` lines. Payloads are links, `title<br/>value`
//! pairs, arbitrary html, or an embedded `TalosResult: {json}` object.

use crate::parser::{LogParser, ParseError};
use crate::types::{ContentType, JobDetail};
use crate::variants::JOB_INFO;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Marker of a named measurement result embedded in a `TinderboxPrint:` line
pub const TALOS_RESULT_MARKER: &str = "TalosResult";

const TINDERBOX_PRINT: &str = "TinderboxPrint:";
const UPLOADED_TITLE: &str = "artifact uploaded";

fn uploaded_regex() -> &'static Regex {
    static UPLOADED_REGEX: OnceLock<Regex> = OnceLock::new();
    UPLOADED_REGEX.get_or_init(|| {
        Regex::new(r#"^<a href=['"](?P<url>https?://[^'"]*)['"]>(?P<value>.+)</a>: uploaded"#)
            .unwrap()
    })
}

fn link_html_regex() -> &'static Regex {
    static LINK_HTML_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_HTML_REGEX.get_or_init(|| {
        Regex::new(
            r#"^(?:(?P<title>[A-Za-z/.0-9_ -]+): )?<a .*?href=['"](?P<url>https?://[^'"]+)['"].*?>(?P<value>.+)</a>"#,
        )
        .unwrap()
    })
}

fn link_text_regex() -> &'static Regex {
    static LINK_TEXT_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_TEXT_REGEX.get_or_init(|| {
        Regex::new(r"^(?:(?P<title>[A-Za-z/.0-9_ -]+): )?(?P<url>https?://\S+)").unwrap()
    })
}

/// Collects job details from `TinderboxPrint:` lines
///
/// Its section is the job-info summary. The parser never completes, since
/// summary lines may appear anywhere in the log.
#[derive(Debug, Default)]
pub struct TinderboxPrintParser {
    details: Vec<JobDetail>,
}

impl TinderboxPrintParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details(&self) -> &[JobDetail] {
        &self.details
    }

    fn parse_payload(payload: &str, line_number: usize) -> Result<JobDetail, ParseError> {
        if let Some(json) = payload.strip_prefix(TALOS_RESULT_MARKER) {
            let json = json.trim_start_matches(':').trim();
            let value: Value = serde_json::from_str(json).map_err(|source| {
                ParseError::MalformedMeasurement {
                    marker: TALOS_RESULT_MARKER,
                    line_number,
                    source,
                }
            })?;
            return Ok(JobDetail {
                content_type: ContentType::TalosResult,
                title: Some(TALOS_RESULT_MARKER.to_string()),
                value,
                url: None,
            });
        }

        if let Some(captures) = uploaded_regex().captures(payload) {
            return Ok(JobDetail::link(
                Some(UPLOADED_TITLE.to_string()),
                captures["value"].to_string(),
                captures["url"].to_string(),
            ));
        }

        if let Some(captures) = link_html_regex().captures(payload) {
            return Ok(JobDetail::link(
                captures.name("title").map(|m| m.as_str().to_string()),
                captures["value"].to_string(),
                captures["url"].to_string(),
            ));
        }

        if let Some(captures) = link_text_regex().captures(payload) {
            let url = captures["url"].to_string();
            return Ok(JobDetail::link(
                captures.name("title").map(|m| m.as_str().to_string()),
                url.clone(),
                url,
            ));
        }

        Ok(match payload.split_once("<br/>") {
            Some((title, value)) => {
                JobDetail::raw_html(Some(title.trim().to_string()), value.trim().to_string())
            }
            None => JobDetail::raw_html(None, payload.to_string()),
        })
    }
}

impl LogParser for TinderboxPrintParser {
    fn name(&self) -> &str {
        JOB_INFO
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        let Some(start) = line.find(TINDERBOX_PRINT) else {
            return Ok(());
        };

        let payload = line[start + TINDERBOX_PRINT.len()..].trim();
        let detail = Self::parse_payload(payload, line_number)?;
        self.details.push(detail);
        Ok(())
    }

    fn artifact(&self) -> Result<Value, ParseError> {
        Ok(serde_json::to_value(&self.details)?)
    }
}
