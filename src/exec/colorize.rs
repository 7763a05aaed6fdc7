// src/exec/colorize.rs

//! Line classification for colored test output.

use std::sync::LazyLock;

use regex::Regex;

/// `<file>.go:` reference, e.g. `foo_test.go:42: expected 1`.
static GO_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w\.go:").expect("location pattern is valid")
});

/// Kind of a test-output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Skip,
    Pass,
    Fail,
    Location,
    Neutral,
}

impl LineClass {
    /// ANSI SGR parameters for this class.
    pub fn ansi_code(self) -> &'static str {
        match self {
            LineClass::Skip => "33;1",
            LineClass::Pass => "32;1",
            LineClass::Fail => "31;1",
            LineClass::Location => "35;1",
            LineClass::Neutral => "37;1",
        }
    }
}

/// Classify a line. Rules are checked in order; the first match wins.
pub fn classify(line: &str) -> LineClass {
    if line.starts_with('?') || line.contains("SKIP") {
        LineClass::Skip
    } else if line.starts_with("ok") || line.contains("PASS") {
        LineClass::Pass
    } else if line.starts_with("FAIL") {
        LineClass::Fail
    } else if GO_LOCATION.is_match(line) {
        LineClass::Location
    } else {
        LineClass::Neutral
    }
}

/// Wrap `line` in the color for its class.
pub fn colorize(line: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", classify(line).ansi_code(), line)
}
