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

//! Line-based formatter
//!
//! Indentation is normalised line by line from each line's own leading
//! whitespace; brace structure is never consulted. [`Formatter::optimize`]
//! additionally moves the increment of simple counted `for` loops into an
//! `unchecked` block.

use crate::{
    outline::find_matching,
    syntax::{significant_tokens, tokenize, Token, TokenKind},
};
use solide_common::EditorConfig;
use tracing::debug;

/// Reformats source text
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: EditorConfig,
}

impl Formatter {
    /// Create a formatter with the given settings
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Normalise the indentation of every line
    ///
    /// Tabs count as `tab_size` columns. Each line is re-indented with
    /// `indent_width` spaces per whole indent level of its original leading
    /// whitespace; trailing whitespace is dropped unless disabled.
    pub fn format(&self, source: &str) -> String {
        let unit = self.config.indent_width.max(1);
        source
            .split('\n')
            .map(|line| {
                let rest = line.trim_start_matches([' ', '\t']);
                let indent = &line[..line.len() - rest.len()];
                let content =
                    if self.config.trim_trailing_whitespace { rest.trim_end() } else { rest };
                if content.is_empty() {
                    return String::new();
                }
                let width = self.indent_width(indent);
                format!("{}{content}", " ".repeat(width / unit * unit))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format, then rewrite simple counted loops to increment in an `unchecked` block
    ///
    /// A loop qualifies when it has the shape `for (uintN i = 0; i < bound; i++)`
    /// (or `++i`) and its body mentions neither `unchecked` nor `continue`.
    pub fn optimize(&self, source: &str) -> String {
        let formatted = self.format(source);
        let tokens = tokenize(&formatted);
        let significant = significant_tokens(&tokens);

        let mut edits: Vec<Edit> = Vec::new();
        for idx in 0..significant.len() {
            if let Some(loop_edits) = self.counted_loop(&formatted, &significant, idx) {
                edits.extend(loop_edits);
            }
        }
        if edits.is_empty() {
            return formatted;
        }

        debug!(loops = edits.len() / 2, "moving loop increments into unchecked blocks");
        edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
        let mut optimized = formatted;
        for edit in edits {
            optimized.replace_range(edit.range, &edit.text);
        }
        self.format(&optimized)
    }

    fn indent_width(&self, indent: &str) -> usize {
        indent.chars().map(|c| if c == '\t' { self.config.tab_size } else { 1 }).sum()
    }

    /// Edits for the loop whose `for` keyword is at `idx`, if it qualifies
    fn counted_loop(&self, text: &str, tokens: &[Token<'_>], idx: usize) -> Option<[Edit; 2]> {
        if !tokens[idx].is_keyword("for") {
            return None;
        }
        let open = idx + 1;
        if !tokens.get(open)?.is_op("(") {
            return None;
        }
        let close = find_matching(tokens, open, "(", ")")?;
        let header = &tokens[open + 1..close];

        // uintN i = 0 ;
        let [ty, var, assign, zero, semi, ..] = header else { return None };
        let counter = var.text;
        let starts_at_zero = ty.kind == TokenKind::Type
            && ty.text.starts_with("uint")
            && var.kind == TokenKind::Variable
            && assign.is_op("=")
            && zero.kind == TokenKind::Number
            && zero.text == "0"
            && semi.is_op(";");
        if !starts_at_zero {
            return None;
        }

        // i < bound ; i++   or   i < bound ; ++i
        let second = header.iter().rposition(|t| t.is_op(";"))?;
        let condition = header.get(5..second)?;
        let bounded = matches!(condition, [lhs, op, _, ..]
            if lhs.text == counter && (op.is_op("<") || op.is_op("<=")));
        let increments = match &header[second + 1..] {
            [a, b] => (a.text == counter && b.is_op("++")) || (a.is_op("++") && b.text == counter),
            _ => false,
        };
        if !bounded || !increments || condition.iter().any(|t| t.is_op(";")) {
            return None;
        }

        let body_open = close + 1;
        if !tokens.get(body_open)?.is_op("{") {
            return None;
        }
        let body_close = find_matching(tokens, body_open, "{", "}")?;
        let body = &tokens[body_open + 1..body_close];
        if body.iter().any(|t| t.is_keyword("unchecked") || t.is_keyword("continue")) {
            return None;
        }

        let increment_start = header[second].end();
        let closing = tokens[body_close];
        let line_start = text[..closing.start].rfind('\n').map_or(0, |idx| idx + 1);
        let before_brace = &text[line_start..closing.start];
        let insertion = if before_brace.trim().is_empty() {
            let indent = " ".repeat(self.indent_width(before_brace) + self.config.indent_width.max(1));
            Edit {
                range: line_start..line_start,
                text: format!("{indent}unchecked {{ ++{counter}; }}\n"),
            }
        } else {
            Edit {
                range: closing.start..closing.start,
                text: format!("unchecked {{ ++{counter}; }} "),
            }
        };

        Some([
            insertion,
            Edit { range: increment_start..tokens[close].start, text: String::new() },
        ])
    }
}

/// A pending text replacement
#[derive(Debug)]
struct Edit {
    range: std::ops::Range<usize>,
    text: String,
}

/// Format `source` with the default settings
pub fn format(source: &str) -> String {
    Formatter::default().format(source)
}

/// Format and optimize `source` with the default settings
pub fn optimize(source: &str) -> String {
    Formatter::default().optimize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(format(""), "");
        assert_eq!(optimize(""), "");
    }

    #[test]
    fn test_indent_levels_are_floored() {
        let source = "contract A {\n      uint256 x;\n\tuint256 y;   \n  }\n";
        assert_eq!(format(source), "contract A {\n    uint256 x;\n    uint256 y;\n}\n");
    }

    #[test]
    fn test_whitespace_only_lines_become_empty() {
        assert_eq!(format("a\n    \n\tb"), "a\n\n    b");
    }

    #[test]
    fn test_trailing_whitespace_kept_when_disabled() {
        let formatter =
            Formatter::new(EditorConfig { trim_trailing_whitespace: false, ..EditorConfig::default() });
        assert_eq!(formatter.format("  x  \n"), "x  \n");
    }

    #[test]
    fn test_custom_indent_width() {
        let formatter = Formatter::new(EditorConfig {
            tab_size: 2,
            indent_width: 2,
            ..EditorConfig::default()
        });
        assert_eq!(formatter.format("\t\tx\n   y"), "    x\n  y");
    }

    #[test]
    fn test_optimize_counted_loop() {
        let source = "function f(uint256 n) public {\n    for (uint256 i = 0; i < n; i++) {\n        total += i;\n    }\n}\n";
        let expected = "function f(uint256 n) public {\n    for (uint256 i = 0; i < n;) {\n        total += i;\n        unchecked { ++i; }\n    }\n}\n";
        assert_eq!(optimize(source), expected);
        assert_eq!(format(&optimize(source)), optimize(source));
    }

    #[test]
    fn test_optimize_single_line_loop() {
        let source = "for (uint i = 0; i < 3; ++i) { sum += i; }";
        assert_eq!(optimize(source), "for (uint i = 0; i < 3;) { sum += i; unchecked { ++i; } }");
    }

    #[test]
    fn test_optimize_skips_other_loops() {
        for source in [
            "for (uint256 i = 0; i < n; i++) { unchecked { total += i; } }",
            "for (uint256 i = 0; i < n; i++) { if (i == 2) continue; }",
            "for (uint256 i = 1; i < n; i++) { total += i; }",
            "for (int256 i = 0; i < n; i++) { total += i; }",
            "for (uint256 i = 0; i < n; i += 2) { total += i; }",
            "for (uint256 i = 0; j < n; i++) { total += i; }",
        ] {
            assert_eq!(optimize(source), source);
        }
    }

    #[test]
    fn test_optimize_leaves_partial_headers() {
        for source in [
            "for (uint i = 0;) {}",
            "contract A {\n    function f() public {\n        for (uint256 i = 0; i < n) {\n        }\n    }\n}\n",
        ] {
            assert_eq!(optimize(source), format(source));
        }
    }

    #[test]
    fn test_optimize_nested_loops() {
        let source = "for (uint256 i = 0; i < n; i++) {\n    for (uint256 j = 0; j < m; j++) {\n        total += j;\n    }\n}";
        let expected = "for (uint256 i = 0; i < n;) {\n    for (uint256 j = 0; j < m;) {\n        total += j;\n        unchecked { ++j; }\n    }\n    unchecked { ++i; }\n}";
        assert_eq!(optimize(source), expected);
    }
}
