// Solide - Solidity analysis toolkit
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Lint rule engine
//!
//! A fixed registry of independent detectors runs over one shared, read-only
//! [`LintContext`]. Each detector is isolated: an error or a panic inside it
//! drops that detector's findings and nothing else. Issues come back sorted
//! by position, ties broken by registry order.

mod detectors;

pub use detectors::DETECTORS;

use crate::{
    outline::Outline,
    source::LineIndex,
    syntax::{tokenize, Token, TokenKind},
    LintError,
};
use serde::Serialize;
use solide_common::LintConfig;
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
};
use tracing::{debug, warn};

/// Issue severity, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Code that is broken
    Error,
    /// Code that is likely wrong or risky
    Warning,
    /// Style and best-practice notes
    Info,
}

impl Severity {
    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic produced by the lint engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    /// Severity of the issue
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
    /// 1-based line where the issue begins
    pub line: usize,
    /// 1-based column where the issue begins
    pub column: usize,
    /// Code of the detector that raised it
    pub code: Option<&'static str>,
}

/// A raw detector hit, located by byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Byte offset where the issue begins
    pub offset: usize,
    /// Human-readable description
    pub message: String,
}

impl Finding {
    /// Create a finding
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self { offset, message: message.into() }
    }
}

/// Signature shared by all detectors
pub type CheckFn = fn(&LintContext<'_>) -> Result<Vec<Finding>, LintError>;

/// A registered lint rule
#[derive(Clone, Copy)]
pub struct Detector {
    /// Stable rule code
    pub code: &'static str,
    /// Severity of every issue this rule raises
    pub severity: Severity,
    /// Short description for rule listings
    pub description: &'static str,
    /// The rule itself
    pub check: CheckFn,
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("code", &self.code)
            .field("severity", &self.severity)
            .field("check", &"<fn>")
            .finish()
    }
}

/// Everything a detector may read about the source
#[derive(Debug)]
pub struct LintContext<'src> {
    /// The source text
    pub source: &'src str,
    /// Source with comment and string contents blanked to spaces, byte offsets preserved
    pub masked: String,
    /// All tokens, including whitespace and comments
    pub tokens: Vec<Token<'src>>,
    /// Declarations found in the source
    pub outline: Outline<'src>,
    /// Line start index
    pub lines: LineIndex<'src>,
    /// Lint settings
    pub config: &'src LintConfig,
}

impl<'src> LintContext<'src> {
    /// Tokenize and outline `source` once for all detectors
    pub fn new(source: &'src str, config: &'src LintConfig) -> Self {
        let tokens = tokenize(source);
        let outline = Outline::scan(source, &tokens);
        Self {
            source,
            masked: mask_literals(source, &tokens),
            tokens,
            outline,
            lines: LineIndex::new(source),
            config,
        }
    }
}

/// Blank out comments and strings so text patterns only see code
fn mask_literals(source: &str, tokens: &[Token<'_>]) -> String {
    let mut masked = String::with_capacity(source.len());
    for token in tokens {
        if matches!(token.kind, TokenKind::Comment | TokenKind::String) {
            for ch in token.text.chars() {
                if ch == '\n' {
                    masked.push('\n');
                } else {
                    masked.extend(std::iter::repeat(' ').take(ch.len_utf8()));
                }
            }
        } else {
            masked.push_str(token.text);
        }
    }
    masked
}

/// Runs the detector registry
#[derive(Debug, Clone, Default)]
pub struct Linter {
    config: LintConfig,
}

impl Linter {
    /// Create a linter with the given settings
    pub fn new(config: LintConfig) -> Self {
        Self { config }
    }

    /// Lint `source` with every enabled detector
    pub fn lint(&self, source: &str) -> Vec<LintIssue> {
        let ctx = LintContext::new(source, &self.config);

        let mut issues: Vec<(usize, LintIssue)> = Vec::new();
        for (rank, detector) in DETECTORS.iter().enumerate() {
            if !self.config.is_enabled(detector.code) {
                continue;
            }
            let Some(findings) = run_detector(detector, &ctx) else { continue };
            issues.extend(findings.into_iter().map(|finding| {
                let position = ctx.lines.position(finding.offset);
                let issue = LintIssue {
                    severity: detector.severity,
                    message: finding.message,
                    line: position.line,
                    column: position.column,
                    code: Some(detector.code),
                };
                (rank, issue)
            }));
        }

        issues.sort_by_key(|(rank, issue)| (issue.line, issue.column, *rank));
        debug!(issues = issues.len(), bytes = source.len(), "lint pass complete");
        issues.into_iter().map(|(_, issue)| issue).collect()
    }
}

/// Run one detector, swallowing its errors and panics
///
/// The default panic hook still reports a caught panic on stderr.
fn run_detector(detector: &Detector, ctx: &LintContext<'_>) -> Option<Vec<Finding>> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (detector.check)(ctx)))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            Err(LintError::Panicked { code: detector.code, message })
        });

    match outcome {
        Ok(findings) => Some(findings),
        Err(err) => {
            warn!(code = detector.code, error = %err, "lint detector failed, skipping");
            None
        }
    }
}

/// Lint `source` with the default settings
pub fn lint(source: &str) -> Vec<LintIssue> {
    Linter::default().lint(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panicking(_: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
        panic!("boom")
    }

    fn failing(_: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
        Err(LintError::Panicked { code: "failing", message: String::new() })
    }

    #[test]
    fn test_masking_preserves_offsets() {
        let source = "a = \"é;\"; // x;\nb;";
        let tokens = tokenize(source);
        let masked = mask_literals(source, &tokens);
        assert_eq!(masked.len(), source.len());
        assert_eq!(masked, format!("a ={};{}\nb;", " ".repeat(6), " ".repeat(6)));
    }

    #[test]
    fn test_failing_detectors_are_isolated() {
        let config = LintConfig::default();
        let ctx = LintContext::new("contract A {}", &config);
        let bad = Detector {
            code: "panicking",
            severity: Severity::Error,
            description: "",
            check: panicking,
        };
        assert!(run_detector(&bad, &ctx).is_none());
        let bad = Detector { check: failing, ..bad };
        assert!(run_detector(&bad, &ctx).is_none());
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }

    #[test]
    fn test_disabled_rules_are_skipped() {
        let config = LintConfig {
            disabled_rules: vec!["missing-spdx".to_string(), "missing-pragma".to_string()],
            ..LintConfig::default()
        };
        assert!(Linter::new(config).lint("").is_empty());
    }
}
