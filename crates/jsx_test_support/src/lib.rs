//! Shared helpers for renderer tests: deterministic suspension points and the
//! golden render-case corpus.

use serde::Deserialize;
use std::fmt::Write;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Suspends the awaiting task `polls` times before completing.
///
/// Each suspension wakes the task immediately, so any executor makes progress
/// and the interleaving of sibling branches is reproducible: a branch that
/// waits for more polls settles later.
pub fn delay(polls: usize) -> Delay {
    Delay { remaining: polls }
}

#[derive(Debug)]
pub struct Delay {
    remaining: usize,
}

impl Future for Delay {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.remaining == 0 {
            return Poll::Ready(());
        }
        self.remaining -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// One golden case: an element tree in its JSON shape and the expected
/// headless output (or the expected error message).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RenderCase {
    pub name: String,
    pub input: String,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Deserialize)]
struct RenderCaseFile {
    #[serde(rename = "case")]
    cases: Vec<RenderCase>,
}

pub fn load_cases(path: &Path) -> Vec<RenderCase> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read render cases {path:?}: {err}"));
    let file: RenderCaseFile = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse render cases {path:?}: {err}"));
    for case in &file.cases {
        assert!(
            case.expected.is_some() != case.error.is_some(),
            "case {:?} must set exactly one of `expected` and `error`",
            case.name
        );
    }
    file.cases
}

/// Describes the first differing line between two multi-line outputs, or
/// returns an empty string when they match.
pub fn diff_lines(expected: &str, actual: &str) -> String {
    let expected: Vec<&str> = expected.lines().collect();
    let actual: Vec<&str> = actual.lines().collect();
    let mut out = String::new();
    let max = expected.len().max(actual.len());
    let Some(first) = (0..max).find(|&i| expected.get(i) != actual.get(i)) else {
        return out;
    };
    let _ = writeln!(&mut out, "first mismatch at line {}:", first + 1);
    let start = first.saturating_sub(2);
    for line in start..(first + 3).min(max) {
        let marker = if line == first { ">" } else { " " };
        let left = expected.get(line).copied().unwrap_or("<missing>");
        let right = actual.get(line).copied().unwrap_or("<missing>");
        let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line + 1);
        let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_outputs_have_no_diff() {
        assert_eq!(diff_lines("a\nb", "a\nb"), "");
    }

    #[test]
    fn diff_points_at_first_mismatch() {
        let diff = diff_lines("a\nb\nc", "a\nx\nc");
        assert!(diff.starts_with("first mismatch at line 2:"));
        assert!(diff.contains(">    2  expected: b"));
        assert!(diff.contains(">    2    actual: x"));
    }

    #[test]
    fn missing_lines_are_marked() {
        let diff = diff_lines("a\nb", "a");
        assert!(diff.contains("actual: <missing>"));
    }
}
