//! Reference sub-parsers for buildbot logs

mod error_lines;
mod header;
mod step;
mod talos;
mod tinderbox;

pub use error_lines::ErrorLineMatcher;
pub use header::HeaderParser;
pub use step::{DEFAULT_MAX_STEP_ERRORS, StepParser};
pub use talos::{TALOS_DATA_MARKER, TalosParser};
pub use tinderbox::{TALOS_RESULT_MARKER, TinderboxPrintParser};

/// Prefix shared by buildbot step-start markers
pub(crate) const STEP_START_PREFIX: &str = "========= Started";
