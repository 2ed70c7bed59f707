//! Recognition of failure lines inside build steps

use regex::Regex;
use std::sync::OnceLock;

/// Substrings that mark a failure wherever they appear
const IN_LINE_PATTERNS: &[&str] = &[
    "TEST-UNEXPECTED-",
    "fatal error",
    "FATAL ERROR",
    "REFTEST ERROR",
    "PROCESS-CRASH",
    "Assertion failure:",
    "Assertion failed:",
    "###!!! ABORT:",
    "E/GeckoLinker",
    "SUMMARY: AddressSanitizer",
    "SUMMARY: LeakSanitizer",
    "Automation Error:",
    "command timed out:",
    "wget: unable ",
    "TEST-VALGRIND-ERROR",
];

/// Decides whether a log line reports a failure
///
/// Lines emitted through mozharness carry a `HH:MM:SS  LEVEL - ` prefix,
/// which is stripped before the anchored patterns are tried.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorLineMatcher;

impl ErrorLineMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Check a single line
    pub fn is_error(&self, line: &str) -> bool {
        let line = strip_mozharness_prefix(line.trim_end());

        if exclude_regex().is_match(line) {
            return false;
        }

        let in_line = IN_LINE_PATTERNS.iter().any(|p| line.contains(p));
        in_line || anchored_regex().is_match(line) || search_regex().is_match(line)
    }
}

fn strip_mozharness_prefix(line: &str) -> &str {
    static PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

    let re = PREFIX_REGEX.get_or_init(|| {
        Regex::new(r"^\d{2}:\d{2}:\d{2} +(?:DEBUG|INFO|WARNING|ERROR|CRITICAL|FATAL) - +")
            .unwrap()
    });

    match re.find(line) {
        Some(prefix) => &line[prefix.end()..],
        None => line,
    }
}

fn anchored_regex() -> &'static Regex {
    static ANCHORED_REGEX: OnceLock<Regex> = OnceLock::new();
    ANCHORED_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:error: ",
            r"|g?make(?:\[\d+\])?: \*\*\*",
            r"|[A-Za-z.]+Error: ",
            r"|[A-Za-z.]*Exception: ",
            r"|remoteFailed:",
            r"|rm: cannot ",
            r"|abort:",
            r"|Output exceeded \d+ bytes",
            r"|The web-page 'stop build' button was pressed",
            r"|.*\.js: line \d+, col \d+, Error -",
            r"|\[taskcluster\] Error:)",
        ))
        .unwrap()
    })
}

fn search_regex() -> &'static Regex {
    static SEARCH_REGEX: OnceLock<Regex> = OnceLock::new();
    SEARCH_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r" error\(\d*\):",
            r"|:\d+: error:",
            r"| error R?C\d*:",
            r"|ERROR [45]\d\d:",
            r"|mozmake\.(?:exe|EXE)(?:\[\d+\])?: \*\*\*",
        ))
        .unwrap()
    })
}

fn exclude_regex() -> &'static Regex {
    static EXCLUDE_REGEX: OnceLock<Regex> = OnceLock::new();
    EXCLUDE_REGEX.get_or_init(|| Regex::new(r"TEST-(?:INFO|PASS) ").unwrap())
}
