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

//! Per-line summaries for minimap rendering

use super::{tokenize, TokenKind, TokenStyle};
use serde::Serialize;

/// Columns that map to a full-width minimap row
pub const MINIMAP_COLUMNS: usize = 100;

/// Summary of a single source line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinimapLine {
    /// Dominant style of the line
    pub style: TokenStyle,
    /// Fraction of [`MINIMAP_COLUMNS`] occupied by non-whitespace characters
    pub density: f32,
    /// Leading whitespace width in characters
    pub indent: usize,
}

/// Whether a line contains only whitespace
pub fn is_empty_line(line: &str) -> bool {
    line.trim().is_empty()
}

/// Non-whitespace characters relative to [`MINIMAP_COLUMNS`], capped at 1.0
pub fn line_density(line: &str) -> f32 {
    let filled = line.chars().take(MINIMAP_COLUMNS).filter(|c| !c.is_whitespace()).count();
    filled as f32 / MINIMAP_COLUMNS as f32
}

/// The style that best represents a whole line
pub fn line_style(line: &str) -> TokenStyle {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return TokenStyle::Default;
    }
    if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
        return TokenStyle::Comment;
    }

    let tokens = tokenize(trimmed);
    let Some(first) = tokens.first() else { return TokenStyle::Default };
    if first.kind == TokenKind::Keyword
        && matches!(
            first.text,
            "pragma"
                | "import"
                | "contract"
                | "interface"
                | "library"
                | "abstract"
                | "function"
                | "modifier"
                | "constructor"
                | "event"
                | "error"
                | "struct"
                | "enum"
        )
    {
        return TokenStyle::Keyword;
    }

    // Otherwise weigh styles by the characters they cover; earlier styles win ties.
    let mut weights: Vec<(TokenStyle, usize)> = Vec::new();
    for token in tokens.iter().filter(|t| t.kind != TokenKind::Whitespace) {
        let style = token.style();
        match weights.iter_mut().find(|(s, _)| *s == style) {
            Some((_, weight)) => *weight += token.text.len(),
            None => weights.push((style, token.text.len())),
        }
    }
    weights
        .iter()
        .fold(None, |best: Option<(TokenStyle, usize)>, &(style, weight)| match best {
            Some((_, best_weight)) if best_weight >= weight => best,
            _ => Some((style, weight)),
        })
        .map_or(TokenStyle::Default, |(style, _)| style)
}

/// Summarize every line of `source`
pub fn minimap(source: &str) -> Vec<MinimapLine> {
    source
        .split('\n')
        .map(|line| MinimapLine {
            style: line_style(line),
            density: line_density(line),
            indent: line.chars().take_while(|c| c.is_whitespace()).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lines() {
        assert!(is_empty_line(""));
        assert!(is_empty_line(" \t "));
        assert!(!is_empty_line("  }"));
    }

    #[test]
    fn test_density() {
        assert_eq!(line_density(""), 0.0);
        assert_eq!(line_density("  ab"), 0.02);
        assert_eq!(line_density(&"x".repeat(250)), 1.0);
    }

    #[test]
    fn test_line_styles() {
        assert_eq!(line_style("   // note"), TokenStyle::Comment);
        assert_eq!(line_style(" * @dev"), TokenStyle::Comment);
        assert_eq!(line_style("pragma solidity ^0.8.0;"), TokenStyle::Keyword);
        assert_eq!(line_style("    function f() public {"), TokenStyle::Keyword);
        assert_eq!(line_style("        name = \"a long string literal\";"), TokenStyle::String);
        assert_eq!(line_style("    }"), TokenStyle::Operator);
        assert_eq!(line_style(""), TokenStyle::Default);
    }

    #[test]
    fn test_minimap_lines() {
        let lines = minimap("contract A {\n    uint256 x;\n}");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].style, TokenStyle::Keyword);
        assert_eq!(lines[1].indent, 4);
        assert_eq!(lines[1].style, TokenStyle::Type);
    }
}
