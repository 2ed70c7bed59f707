//! The three artifact builder configurations

use crate::builder::ArtifactBuilder;
use crate::parsers::{
    DEFAULT_MAX_STEP_ERRORS, HeaderParser, StepParser, TalosParser, TinderboxPrintParser,
};
use crate::truncation::TruncationPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the job-info builder and of its single section
pub const JOB_INFO: &str = "Job Info";

/// Name of the structured log view builder
pub const STRUCTURED_LOG: &str = "Structured Log";

/// Name of the performance data builder and of its single section
pub const TALOS_DATA: &str = "talos_data";

impl ArtifactBuilder {
    /// Job summary from `TinderboxPrint:` lines
    pub fn job_info(url: Option<String>) -> Self {
        Self::new(JOB_INFO, url, vec![Box::new(TinderboxPrintParser::new())])
    }

    /// Header properties and per-step results
    ///
    /// # Arguments
    ///
    /// * `url` - Origin of the log
    /// * `check_errors` - Forwarded to the step parser
    pub fn structured_log(url: Option<String>, check_errors: bool) -> Self {
        Self::structured_log_with_max_errors(url, check_errors, DEFAULT_MAX_STEP_ERRORS)
    }

    /// Structured log view storing at most `max_errors` error lines per step
    pub fn structured_log_with_max_errors(
        url: Option<String>,
        check_errors: bool,
        max_errors: usize,
    ) -> Self {
        let steps = StepParser::new(check_errors).with_max_errors(max_errors);
        Self::new(
            STRUCTURED_LOG,
            url,
            vec![Box::new(HeaderParser::new()), Box::new(steps)],
        )
    }

    /// Talos performance data
    pub fn talos_data(url: Option<String>) -> Self {
        Self::new(TALOS_DATA, url, vec![Box::new(TalosParser::new())])
    }
}

/// Settings applied when a builder is picked at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Check step lines for failures (structured log only)
    pub check_errors: bool,

    /// Error lines stored per step (structured log only)
    pub max_step_errors: usize,

    pub truncation: TruncationPolicy,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            check_errors: true,
            max_step_errors: DEFAULT_MAX_STEP_ERRORS,
            truncation: TruncationPolicy::default(),
        }
    }
}

/// Returned when a builder kind name is not recognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown builder kind '{0}' (expected job-info, structured-log or talos-data)")]
pub struct UnknownBuilderKind(pub String);

/// Selects one of the builder configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuilderKind {
    JobInfo,
    StructuredLog,
    TalosData,
}

impl BuilderKind {
    pub const ALL: [BuilderKind; 3] = [Self::JobInfo, Self::StructuredLog, Self::TalosData];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JobInfo => "job-info",
            Self::StructuredLog => "structured-log",
            Self::TalosData => "talos-data",
        }
    }

    /// Build the configured builder for this kind
    pub fn build(self, url: Option<String>, options: &ParserOptions) -> ArtifactBuilder {
        let builder = match self {
            Self::JobInfo => ArtifactBuilder::job_info(url),
            Self::StructuredLog => ArtifactBuilder::structured_log_with_max_errors(
                url,
                options.check_errors,
                options.max_step_errors,
            ),
            Self::TalosData => ArtifactBuilder::talos_data(url),
        };
        builder.with_truncation(options.truncation.clone())
    }
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuilderKind {
    type Err = UnknownBuilderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBuilderKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section_names(builder: &ArtifactBuilder) -> Vec<&str> {
        builder.parsers().iter().map(|p| p.name()).collect()
    }

    #[test]
    fn test_job_info_wiring() {
        let mut builder = ArtifactBuilder::job_info(Some("http://x/log.txt".to_string()));
        assert_eq!(builder.name(), "Job Info");
        assert_eq!(section_names(&builder), vec!["Job Info"]);

        let artifact = builder.artifact().unwrap();
        assert_eq!(
            serde_json::Value::Object(artifact.clone()),
            json!({"logurl": "http://x/log.txt", "Job Info": []})
        );
    }

    #[test]
    fn test_structured_log_wiring() {
        let builder = ArtifactBuilder::structured_log(None, false);
        assert_eq!(builder.name(), "Structured Log");
        assert_eq!(section_names(&builder), vec!["header", "step_data"]);
    }

    #[test]
    fn test_talos_data_wiring() {
        let mut builder = ArtifactBuilder::talos_data(None);
        assert_eq!(builder.name(), "talos_data");
        assert_eq!(section_names(&builder), vec!["talos_data"]);
        assert_eq!(
            serde_json::Value::Object(builder.artifact().unwrap().clone()),
            json!({"logurl": null, "talos_data": []})
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("job-info".parse::<BuilderKind>(), Ok(BuilderKind::JobInfo));
        assert_eq!(
            " Structured-Log ".parse::<BuilderKind>(),
            Ok(BuilderKind::StructuredLog)
        );
        assert_eq!("talos-data".parse::<BuilderKind>(), Ok(BuilderKind::TalosData));
        assert_eq!(
            "perf".parse::<BuilderKind>(),
            Err(UnknownBuilderKind("perf".to_string()))
        );
    }

    #[test]
    fn test_kind_display_roundtrips_through_serde() {
        for kind in BuilderKind::ALL {
            assert_eq!(json!(kind), json!(kind.to_string()));
        }
    }

    #[test]
    fn test_kind_build_applies_options() {
        let options = ParserOptions {
            check_errors: false,
            max_step_errors: 5,
            truncation: TruncationPolicy::new(10, ["KEEP"]),
        };
        let builder = BuilderKind::StructuredLog.build(None, &options);
        assert_eq!(builder.truncation().max_line_length(), 10);
        assert_eq!(section_names(&builder), vec!["header", "step_data"]);

        let builder = BuilderKind::JobInfo.build(None, &ParserOptions::default());
        assert_eq!(
            builder.truncation().max_line_length(),
            TruncationPolicy::DEFAULT_MAX_LINE_LENGTH
        );
    }

    #[test]
    fn test_kind_build_caps_step_errors() {
        let options = ParserOptions {
            max_step_errors: 1,
            ..ParserOptions::default()
        };
        let mut builder = BuilderKind::StructuredLog.build(None, &options);
        builder
            .process_lines([
                "========= Started compile (at 2013-06-05 12:00:00.000000) =========",
                "make: *** one",
                "make: *** two",
                "========= Finished compile (results: 2, elapsed: 0 secs) (at 2013-06-05 12:00:01.000000) =========",
            ])
            .unwrap();

        let artifact = builder.artifact().unwrap();
        assert_eq!(
            artifact["step_data"]["steps"][0]["errors"],
            json!([{"linenumber": 1, "line": "make: *** one"}])
        );
        assert_eq!(artifact["step_data"]["steps"][0]["error_count"], 2);
        assert_eq!(artifact["step_data"]["errors_truncated"], true);

        let builder = BuilderKind::JobInfo.build(None, &ParserOptions::default());
        assert_eq!(
            builder.truncation().max_line_length(),
            TruncationPolicy::DEFAULT_MAX_LINE_LENGTH
        );
    }
}
