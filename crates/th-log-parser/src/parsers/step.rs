//! Buildbot step parsing
//!
//! Steps are delimited by marker lines such as:
//!
//! ```text
//! ========= Started compile (results: 0, elapsed: 0 secs) (at 2013-06-05 12:48:37.371637) =========
//! ========= Finished compile (results: 2, elapsed: 1 mins, 2 secs) (at 2013-06-05 12:49:39.612093) =========
//! ```
//!
//! Lines between the two markers are checked for failures when error
//! checking is enabled.

use super::error_lines::ErrorLineMatcher;
use crate::parser::{LogParser, ParseError};
use crate::types::{ErrorLine, Step, StepData, StepResult};
use chrono::NaiveDateTime;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Error lines stored per step before further matches are only counted
pub const DEFAULT_MAX_STEP_ERRORS: usize = 100;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn step_start_regex() -> &'static Regex {
    static STEP_START_REGEX: OnceLock<Regex> = OnceLock::new();
    STEP_START_REGEX.get_or_init(|| {
        Regex::new(
            r"^={9} Started (?P<name>.*?)(?: \(results: \d+, elapsed: .*?\))? \(at (?P<timestamp>.*?)\) ={9}$",
        )
        .unwrap()
    })
}

fn step_finish_regex() -> &'static Regex {
    static STEP_FINISH_REGEX: OnceLock<Regex> = OnceLock::new();
    STEP_FINISH_REGEX.get_or_init(|| {
        Regex::new(
            r"^={9} Finished (?P<name>.*?) \(results: (?P<code>\d+), elapsed: .*?\) \(at (?P<timestamp>.*?)\) ={9}$",
        )
        .unwrap()
    })
}

/// Seconds elapsed between two marker timestamps, if both parse
fn duration_between(started: &str, finished: &str) -> Option<i64> {
    let started = NaiveDateTime::parse_from_str(started, TIMESTAMP_FORMAT).ok()?;
    let finished = NaiveDateTime::parse_from_str(finished, TIMESTAMP_FORMAT).ok()?;
    Some((finished - started).num_seconds())
}

/// Splits the log into steps and collects their error lines
///
/// The parser needs the whole stream, so it never reports completion.
#[derive(Debug)]
pub struct StepParser {
    check_errors: bool,
    max_errors: usize,
    matcher: ErrorLineMatcher,
    steps: Vec<Step>,
    current: Option<Step>,
    errors_truncated: bool,
}

impl StepParser {
    pub const NAME: &'static str = "step_data";

    /// Create a step parser
    ///
    /// # Arguments
    ///
    /// * `check_errors` - Whether lines inside steps are checked for failures
    pub fn new(check_errors: bool) -> Self {
        Self {
            check_errors,
            max_errors: DEFAULT_MAX_STEP_ERRORS,
            matcher: ErrorLineMatcher::new(),
            steps: Vec::new(),
            current: None,
            errors_truncated: false,
        }
    }

    /// Change how many error lines are stored per step
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn check_errors(&self) -> bool {
        self.check_errors
    }

    /// Steps seen so far, including the open one
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().chain(self.current.as_ref())
    }

    fn start_step(&mut self, name: &str, timestamp: &str, line_number: usize) {
        if let Some(unfinished) = self.current.take() {
            log::debug!(
                "Step '{}' has no finish marker, closing it at line {}",
                unfinished.name,
                line_number
            );
            self.steps.push(unfinished);
        }

        let order = self.steps.len();
        log::debug!("Step {} '{}' started at line {}", order, name, line_number);
        self.current = Some(Step::new(
            name.to_string(),
            order,
            timestamp.to_string(),
            line_number,
        ));
    }

    fn finish_step(&mut self, code: &str, timestamp: &str, line_number: usize) {
        let Some(mut step) = self.current.take() else {
            return;
        };

        step.result = code
            .parse()
            .map(StepResult::from_code)
            .unwrap_or(StepResult::Unknown);
        step.duration = duration_between(&step.started, timestamp);
        step.finished = Some(timestamp.to_string());
        step.finished_linenumber = Some(line_number);

        log::debug!(
            "Step {} '{}' finished at line {} with {:?} ({} errors)",
            step.order,
            step.name,
            line_number,
            step.result,
            step.error_count
        );
        self.steps.push(step);
    }

    fn record_error(&mut self, line: &str, line_number: usize) {
        let Some(step) = self.current.as_mut() else {
            return;
        };

        step.error_count += 1;
        if step.errors.len() < self.max_errors {
            step.errors.push(ErrorLine {
                linenumber: line_number,
                line: line.to_string(),
            });
        } else {
            self.errors_truncated = true;
        }
    }

    fn step_data(&self) -> StepData {
        let steps: Vec<Step> = self.steps().cloned().collect();
        let all_errors = steps
            .iter()
            .flat_map(|step| step.errors.iter().cloned())
            .collect();

        StepData {
            steps,
            all_errors,
            errors_truncated: self.errors_truncated,
        }
    }
}

impl LogParser for StepParser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_complete(&self) -> bool {
        false
    }

    fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        if let Some(captures) = step_start_regex().captures(line) {
            self.start_step(&captures["name"], &captures["timestamp"], line_number);
            return Ok(());
        }

        if self.current.is_none() {
            return Ok(());
        }

        if let Some(captures) = step_finish_regex().captures(line) {
            self.finish_step(&captures["code"], &captures["timestamp"], line_number);
        } else if self.check_errors && self.matcher.is_error(line) {
            self.record_error(line, line_number);
        }

        Ok(())
    }

    fn artifact(&self) -> Result<Value, ParseError> {
        Ok(serde_json::to_value(self.step_data())?)
    }
}
