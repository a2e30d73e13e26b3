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

//! Source positions
//!
//! Converts byte offsets into 1-based line/column pairs and extracts code
//! context around a position for diagnostics output.

use serde::Serialize;

/// A 1-based line and column
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

/// Byte offsets of every line start in a source text
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    /// Index the line starts of `source`
    pub fn new(source: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { source, line_starts }
    }

    /// Number of lines; an empty source has one empty line
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a 1-based line without its line break
    pub fn line(&self, line: usize) -> Option<&'src str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self.line_starts.get(line).map_or(self.source.len(), |next| next - 1);
        Some(&self.source[start..end])
    }

    /// Position of a byte offset
    ///
    /// Offsets past the end clamp to the end of the source; offsets inside a
    /// multi-byte character resolve to that character.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line_idx = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let line_start = self.line_starts[line_idx];
        let column = self.source[line_start..]
            .char_indices()
            .take_while(|(idx, _)| line_start + idx < offset)
            .count();
        Position { line: line_idx + 1, column: column + 1 }
    }

    /// Render the lines around `position` with a caret under the column
    pub fn code_context(&self, position: Position, context_lines: usize) -> String {
        let first = position.line.saturating_sub(context_lines).max(1);
        let last = (position.line + context_lines).min(self.line_count());
        let width = last.to_string().len();

        let mut context = String::new();
        for line_number in first..=last {
            let Some(text) = self.line(line_number) else { break };
            context.push_str(&format!("  {line_number:>width$} | {text}\n"));
            if line_number == position.line {
                let padding = " ".repeat(width + 5 + position.column.saturating_sub(1));
                context.push_str(&format!("{padding}^\n"));
            }
        }
        context
    }
}
