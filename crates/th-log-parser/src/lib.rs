//! Buildbot Log Artifact Parser
//!
//! A library that streams line-oriented CI build logs through a fixed set of
//! stateful sub-parsers and assembles their results into one composite
//! artifact: job details, a structured step view, or talos performance data.
//!
//! # Example
//!
//! ```
//! use th_log_parser::ArtifactBuilder;
//!
//! let mut builder = ArtifactBuilder::job_info(Some("http://x/log.txt".to_string()));
//! builder.process_line("TinderboxPrint: mochitest-plain<br/>1234/0/56")?;
//!
//! let artifact = builder.artifact()?;
//! assert_eq!(artifact["logurl"], "http://x/log.txt");
//! assert_eq!(artifact["Job Info"][0]["title"], "mochitest-plain");
//! # Ok::<(), th_log_parser::ParseError>(())
//! ```

mod builder;
mod parser;
mod parsers;
mod truncation;
mod types;
mod variants;

pub use builder::{Artifact, ArtifactBuilder, LOG_URL_KEY};
pub use parser::{LogParser, ParseError};
pub use parsers::{
    DEFAULT_MAX_STEP_ERRORS, ErrorLineMatcher, HeaderParser, StepParser, TALOS_DATA_MARKER,
    TALOS_RESULT_MARKER, TalosParser, TinderboxPrintParser,
};
pub use truncation::TruncationPolicy;
pub use types::*;
pub use variants::{
    BuilderKind, JOB_INFO, ParserOptions, STRUCTURED_LOG, TALOS_DATA, UnknownBuilderKind,
};
