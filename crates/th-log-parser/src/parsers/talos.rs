//! Talos performance data parsing

use crate::parser::{LogParser, ParseError};
use crate::variants::TALOS_DATA;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Marker of a bulk measurement payload: `TALOSDATA: [json]`
pub const TALOS_DATA_MARKER: &str = "TALOSDATA";

fn talos_data_regex() -> &'static Regex {
    static TALOS_DATA_REGEX: OnceLock<Regex> = OnceLock::new();
    TALOS_DATA_REGEX.get_or_init(|| Regex::new(r"TALOSDATA:\s*(?P<json>\[.*\])\s*$").unwrap())
}

/// Stores the records of the first `TALOSDATA` line
///
/// The parser completes once a payload has been parsed; later payloads are
/// never looked at.
#[derive(Debug, Default)]
pub struct TalosParser {
    records: Vec<Value>,
    complete: bool,
}

impl TalosParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }
}

impl LogParser for TalosParser {
    fn name(&self) -> &str {
        TALOS_DATA
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
        if self.complete {
            return Ok(());
        }

        let Some(captures) = talos_data_regex().captures(line) else {
            return Ok(());
        };

        let records: Vec<Value> = serde_json::from_str(&captures["json"]).map_err(|source| {
            ParseError::MalformedMeasurement {
                marker: TALOS_DATA_MARKER,
                line_number,
                source,
            }
        })?;

        log::debug!(
            "Found {} talos records at line {}",
            records.len(),
            line_number
        );
        self.records = records;
        self.complete = true;
        Ok(())
    }

    fn artifact(&self) -> Result<Value, ParseError> {
        Ok(Value::Array(self.records.clone()))
    }
}
