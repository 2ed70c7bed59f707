//! Sub-parser capability contract shared by every log parser

use serde_json::Value;
use thiserror::Error;

/// Errors raised by sub-parsers while consuming lines or producing artifacts
///
/// The artifact builder never catches these; they reach the caller as-is.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed {marker} payload on line {line_number}: {source}")]
    MalformedMeasurement {
        marker: &'static str,
        line_number: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A stateful, line-consuming unit that recognizes one pattern family
///
/// Implementations must keep `is_complete` monotonic: once it returns
/// `true` it never returns `false` again, and `parse_line` becomes a no-op.
pub trait LogParser: Send {
    /// Section key under which this parser's artifact is stored
    fn name(&self) -> &str;

    /// Whether the parser has captured everything it needs
    fn is_complete(&self) -> bool;

    /// Consume one line of the log
    ///
    /// # Arguments
    ///
    /// * `line` - The (possibly truncated) line content
    /// * `line_number` - Zero-based position of the line in the stream
    fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError>;

    /// The accumulated structured result
    ///
    /// Callable at any time and idempotent: it never mutates parser state.
    fn artifact(&self) -> Result<Value, ParseError>;
}
