//! Artifact builder: drives a log stream through a fixed set of sub-parsers

use crate::parser::{LogParser, ParseError};
use crate::truncation::TruncationPolicy;
use serde_json::{Map, Value};
use std::fmt;

/// Composite artifact: `logurl` plus one section per sub-parser
pub type Artifact = Map<String, Value>;

/// Key holding the log's source URL in every artifact
pub const LOG_URL_KEY: &str = "logurl";

/// Feeds log lines to an ordered list of sub-parsers and assembles their output
///
/// Lines are dispatched in declaration order to every parser that has not yet
/// completed. The builder keeps no state of its own besides the line counter.
pub struct ArtifactBuilder {
    name: String,
    artifact: Artifact,
    line_number: usize,
    parsers: Vec<Box<dyn LogParser>>,
    truncation: TruncationPolicy,
}

impl ArtifactBuilder {
    /// Create a builder over a fixed parser list
    ///
    /// # Arguments
    ///
    /// * `name` - Label for this builder, used in diagnostics
    /// * `url` - Origin of the log, copied verbatim into the artifact
    /// * `parsers` - Sub-parsers in dispatch and assembly order
    pub fn new(
        name: impl Into<String>,
        url: Option<String>,
        parsers: Vec<Box<dyn LogParser>>,
    ) -> Self {
        let mut artifact = Artifact::new();
        artifact.insert(
            LOG_URL_KEY.to_string(),
            url.map_or(Value::Null, Value::String),
        );

        Self {
            name: name.into(),
            artifact,
            line_number: 0,
            parsers,
            truncation: TruncationPolicy::default(),
        }
    }

    /// Replace the truncation policy
    pub fn with_truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.truncation = truncation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lines processed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn parsers(&self) -> &[Box<dyn LogParser>] {
        &self.parsers
    }

    pub fn truncation(&self) -> &TruncationPolicy {
        &self.truncation
    }

    /// Process a single log line
    ///
    /// The line is truncated per the builder's policy and handed to every
    /// sub-parser that is not yet complete. A sub-parser error is returned
    /// unchanged; the line still counts as processed.
    pub fn process_line(&mut self, line: &str) -> Result<(), ParseError> {
        let line = self.truncation.apply(line);
        let line_number = self.line_number;
        self.line_number += 1;

        for parser in self.parsers.iter_mut() {
            if parser.is_complete() {
                continue;
            }

            parser.parse_line(line, line_number)?;

            if parser.is_complete() {
                log::debug!(
                    "{}: parser '{}' complete at line {}",
                    self.name,
                    parser.name(),
                    line_number
                );
            }
        }

        Ok(())
    }

    /// Process lines in order, stopping at the first error
    pub fn process_lines<I, S>(&mut self, lines: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.process_line(line.as_ref())?;
        }
        Ok(())
    }

    /// Assemble the composite artifact from the current parser state
    ///
    /// Each parser's section is (re)written under its name; parser state is
    /// left untouched, so this can be called repeatedly mid-stream.
    pub fn artifact(&mut self) -> Result<&Artifact, ParseError> {
        for parser in &self.parsers {
            self.artifact
                .insert(parser.name().to_string(), parser.artifact()?);
        }
        Ok(&self.artifact)
    }

    /// Consume the builder and return the finished artifact
    pub fn into_artifact(mut self) -> Result<Artifact, ParseError> {
        self.artifact()?;
        log::debug!(
            "{}: assembled artifact from {} lines",
            self.name,
            self.line_number
        );
        Ok(self.artifact)
    }
}

impl fmt::Debug for ArtifactBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBuilder")
            .field("name", &self.name)
            .field("line_number", &self.line_number)
            .field(
                "parsers",
                &self.parsers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("truncation", &self.truncation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, usize)>>>;

    /// Records every line it receives and completes after `limit` lines
    struct RecordingParser {
        name: &'static str,
        limit: Option<usize>,
        seen: Seen,
    }

    impl RecordingParser {
        fn new(name: &'static str, limit: Option<usize>) -> (Self, Seen) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let parser = Self {
                name,
                limit,
                seen: Arc::clone(&seen),
            };
            (parser, seen)
        }
    }

    impl LogParser for RecordingParser {
        fn name(&self) -> &str {
            self.name
        }

        fn is_complete(&self) -> bool {
            self.limit
                .is_some_and(|limit| self.seen.lock().unwrap().len() >= limit)
        }

        fn parse_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseError> {
            if self.is_complete() {
                return Ok(());
            }
            self.seen
                .lock()
                .unwrap()
                .push((line.to_string(), line_number));
            Ok(())
        }

        fn artifact(&self) -> Result<Value, ParseError> {
            Ok(json!(self.seen.lock().unwrap().len()))
        }
    }

    struct FailingParser;

    impl LogParser for FailingParser {
        fn name(&self) -> &str {
            "failing"
        }

        fn is_complete(&self) -> bool {
            false
        }

        fn parse_line(&mut self, _line: &str, line_number: usize) -> Result<(), ParseError> {
            let source = serde_json::from_str::<Value>("[").unwrap_err();
            Err(ParseError::MalformedMeasurement {
                marker: "TEST",
                line_number,
                source,
            })
        }

        fn artifact(&self) -> Result<Value, ParseError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_empty_builder_artifact() {
        let mut builder = ArtifactBuilder::new("Empty", None, Vec::new());
        let artifact = builder.artifact().unwrap();
        assert_eq!(artifact.len(), 1);
        assert_eq!(artifact[LOG_URL_KEY], Value::Null);
    }

    #[test]
    fn test_line_counter_counts_every_call() {
        let (parser, _) = RecordingParser::new("rec", Some(1));
        let mut builder = ArtifactBuilder::new("Counter", None, vec![Box::new(parser)]);

        for n in 0..5 {
            assert_eq!(builder.line_number(), n);
            builder.process_line("line").unwrap();
        }
        assert_eq!(builder.line_number(), 5);
    }

    #[test]
    fn test_dispatch_passes_zero_based_line_numbers() {
        let (parser, seen) = RecordingParser::new("rec", None);
        let mut builder = ArtifactBuilder::new("Numbers", None, vec![Box::new(parser)]);
        builder.process_lines(["a", "", "c"]).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("a".to_string(), 0),
                (String::new(), 1),
                ("c".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_complete_parser_is_skipped() {
        let (done_early, early_seen) = RecordingParser::new("early", Some(2));
        let (never_done, late_seen) = RecordingParser::new("late", None);
        let mut builder = ArtifactBuilder::new(
            "Skip",
            None,
            vec![Box::new(done_early), Box::new(never_done)],
        );

        builder.process_lines(["1", "2", "3", "4"]).unwrap();

        assert_eq!(early_seen.lock().unwrap().len(), 2);
        assert_eq!(late_seen.lock().unwrap().len(), 4);
        assert!(builder.parsers()[0].is_complete());
        assert!(!builder.parsers()[1].is_complete());
    }

    #[test]
    fn test_truncation_applied_before_dispatch() {
        let (parser, seen) = RecordingParser::new("rec", None);
        let mut builder = ArtifactBuilder::new("Trunc", None, vec![Box::new(parser)]);

        let plain = "p".repeat(600);
        let marked = format!("TALOSDATA: {}", "m".repeat(600));
        builder.process_line(&plain).unwrap();
        builder.process_line(&marked).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0.chars().count(), 500);
        assert_eq!(seen[1].0, marked);
    }

    #[test]
    fn test_artifact_keys_follow_parser_names() {
        let (a, _) = RecordingParser::new("alpha", None);
        let (b, _) = RecordingParser::new("beta", None);
        let mut builder = ArtifactBuilder::new(
            "Keys",
            Some("http://x/log.txt".to_string()),
            vec![Box::new(a), Box::new(b)],
        );
        builder.process_line("one").unwrap();

        let artifact = builder.artifact().unwrap();
        let keys: Vec<&str> = artifact.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"logurl"));
        assert!(keys.contains(&"alpha"));
        assert!(keys.contains(&"beta"));
        assert_eq!(artifact["logurl"], "http://x/log.txt");
        assert_eq!(artifact["alpha"], json!(1));
    }

    #[test]
    fn test_artifact_reflects_later_lines() {
        let (parser, _) = RecordingParser::new("rec", None);
        let mut builder = ArtifactBuilder::new("Repeat", None, vec![Box::new(parser)]);

        builder.process_line("first").unwrap();
        assert_eq!(builder.artifact().unwrap()["rec"], json!(1));
        assert_eq!(builder.artifact().unwrap()["rec"], json!(1));

        builder.process_line("second").unwrap();
        assert_eq!(builder.artifact().unwrap()["rec"], json!(2));
    }

    #[test]
    fn test_parser_error_propagates_and_line_still_counted() {
        let mut builder = ArtifactBuilder::new("Failing", None, vec![Box::new(FailingParser)]);
        let err = builder.process_line("anything").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedMeasurement { line_number: 0, .. }
        ));
        assert_eq!(builder.line_number(), 1);
    }

    #[test]
    fn test_debug_lists_parser_names() {
        let (parser, _) = RecordingParser::new("rec", None);
        let builder = ArtifactBuilder::new("Dbg", None, vec![Box::new(parser)]);
        let debug = format!("{:?}", builder);
        assert!(debug.contains("Dbg"));
        assert!(debug.contains("rec"));
    }
}
