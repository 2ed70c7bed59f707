//! Buildbot log header parsing
//!
//! The header is the block of `key: value` lines printed before the first
//! step, e.g. `builder: mozilla-central_ubuntu64_vm-debug_test-mochitest-1`.

use super::STEP_START_PREFIX;
use crate::parser::{LogParser, ParseError};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Collects header properties until the first step starts
#[derive(Debug, Default)]
pub struct HeaderParser {
    properties: BTreeMap<String, String>,
    complete: bool,
}

impl HeaderParser {
    pub const NAME: &'static str = "header";

    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a recorded header property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

fn header_regex() -> &'static Regex {
    static HEADER_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADER_REGEX.get_or_init(|| Regex::new(r"^([a-z]+): (.*)$").unwrap())
}

impl LogParser for HeaderParser {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        if self.complete {
            return Ok(());
        }

        if line.starts_with(STEP_START_PREFIX) {
            log::debug!(
                "Header ended at line {} with {} properties",
                line_number,
                self.properties.len()
            );
            self.complete = true;
            return Ok(());
        }

        if let Some(captures) = header_regex().captures(line) {
            self.properties
                .insert(captures[1].to_string(), captures[2].to_string());
        }

        Ok(())
    }

    fn artifact(&self) -> Result<Value, ParseError> {
        Ok(serde_json::to_value(&self.properties)?)
    }
}
