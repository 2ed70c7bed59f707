//! Line truncation with an exemption for embedded measurement data

use crate::parsers::{TALOS_DATA_MARKER, TALOS_RESULT_MARKER};

/// Decides how much of each log line reaches the sub-parsers
///
/// Lines are cut to `max_line_length` characters unless they contain one of
/// the measurement markers. Measurement payloads are single-line JSON, so a
/// cut payload could never be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationPolicy {
    max_line_length: usize,
    markers: Vec<String>,
}

impl TruncationPolicy {
    pub const DEFAULT_MAX_LINE_LENGTH: usize = 500;

    /// Create a policy with a custom limit and marker set
    ///
    /// Empty markers are dropped, since they would exempt every line.
    pub fn new<I, S>(max_line_length: usize, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_line_length,
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|marker: &String| !marker.is_empty())
                .collect(),
        }
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// True if the line carries a measurement marker anywhere
    pub fn is_exempt(&self, line: &str) -> bool {
        self.markers.iter().any(|marker| line.contains(marker.as_str()))
    }

    /// Return the part of `line` that should be dispatched
    ///
    /// Length is counted in characters; the cut always lands on a char boundary.
    pub fn apply<'a>(&self, line: &'a str) -> &'a str {
        if self.is_exempt(line) {
            return line;
        }

        match line.char_indices().nth(self.max_line_length) {
            Some((byte_index, _)) => &line[..byte_index],
            None => line,
        }
    }
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_LINE_LENGTH,
            [TALOS_DATA_MARKER, TALOS_RESULT_MARKER],
        )
    }
}
