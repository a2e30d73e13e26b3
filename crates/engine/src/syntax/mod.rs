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

//! Syntax module
//!
//! Lossless tokenization of Solidity source and the mapping from token
//! categories to presentation styles used by highlighters and the minimap.

mod lexer;
pub mod minimap;

pub use lexer::{is_keyword, is_type, Lexer};

use serde::Serialize;
use std::ops::Range;

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Reserved words, modifiers, control flow and unit suffixes
    Keyword,
    /// Built-in elementary types (`uint256`, `address`, `bytes32`, ...)
    Type,
    /// Identifier directly followed by `(`
    Function,
    /// String literal, terminated or not
    String,
    /// Line or block comment
    Comment,
    /// Numeric literal
    Number,
    /// Operator or punctuation
    Operator,
    /// Any other identifier
    Variable,
    /// Run of spaces, tabs and line breaks
    Whitespace,
    /// Anything the lexer does not recognise
    Other,
}

/// A classified slice of the source
///
/// Concatenating the `text` of every token returned by [`tokenize`] yields the
/// input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'src> {
    /// Category of the token
    pub kind: TokenKind,
    /// Exact source text covered by the token
    pub text: &'src str,
    /// Byte offset of the first character
    pub start: usize,
}

impl<'src> Token<'src> {
    /// Byte offset one past the last character
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Byte range covered by the token
    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Whitespace and comments carry no syntax
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Whether this is an operator token with exactly the given text
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Whether this is a keyword token with exactly the given text
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    /// Identifier-like tokens: variables, function names, types and keywords
    pub fn is_word(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Keyword | TokenKind::Type | TokenKind::Function | TokenKind::Variable
        )
    }

    /// Whether a string or block comment reaches its closing delimiter
    ///
    /// Always true for other kinds, including line comments.
    pub fn is_terminated(&self) -> bool {
        match self.kind {
            TokenKind::String => {
                let bytes = self.text.as_bytes();
                if bytes.len() < 2 || bytes[bytes.len() - 1] != bytes[0] {
                    return false;
                }
                let escapes =
                    bytes[1..bytes.len() - 1].iter().rev().take_while(|b| **b == b'\\').count();
                escapes % 2 == 0
            }
            TokenKind::Comment if self.text.starts_with("/*") => {
                self.text.len() >= 4 && self.text.ends_with("*/")
            }
            _ => true,
        }
    }

    /// Presentation style for this token
    pub fn style(&self) -> TokenStyle {
        self.kind.style()
    }
}

/// Token style categories (themed by the consumer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStyle {
    /// Keywords
    Keyword,
    /// Type names
    Type,
    /// Function names
    Function,
    /// String literals
    String,
    /// Comments
    Comment,
    /// Numbers
    Number,
    /// Operators and punctuation
    Operator,
    /// Default foreground
    Default,
}

impl TokenKind {
    /// Map a token category to its presentation style
    pub fn style(self) -> TokenStyle {
        match self {
            Self::Keyword => TokenStyle::Keyword,
            Self::Type => TokenStyle::Type,
            Self::Function => TokenStyle::Function,
            Self::String => TokenStyle::String,
            Self::Comment => TokenStyle::Comment,
            Self::Number => TokenStyle::Number,
            Self::Operator => TokenStyle::Operator,
            Self::Variable | Self::Whitespace | Self::Other => TokenStyle::Default,
        }
    }

    /// Lowercase name of the category
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Type => "type",
            Self::Function => "function",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Number => "number",
            Self::Operator => "operator",
            Self::Variable => "variable",
            Self::Whitespace => "whitespace",
            Self::Other => "other",
        }
    }
}

impl TokenStyle {
    /// Stylesheet class used by web highlighters
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Keyword => "text-keyword",
            Self::Type => "text-type-keyword",
            Self::Function => "text-function",
            Self::String => "text-string",
            Self::Comment => "text-comment",
            Self::Number => "text-number",
            Self::Operator => "text-operator",
            Self::Default => "text-foreground",
        }
    }

    /// ANSI SGR parameters for terminal highlighting
    pub fn ansi(self) -> &'static str {
        match self {
            Self::Keyword => "35",
            Self::Type => "36",
            Self::Function => "33",
            Self::String => "32",
            Self::Comment => "2;37",
            Self::Number => "38;5;208",
            Self::Operator => "37",
            Self::Default => "0",
        }
    }
}

/// Tokenize Solidity source code
///
/// Never fails: malformed input degrades to coarse tokens.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    Lexer::new(source).collect()
}

/// Tokens that carry syntax, in source order
pub fn significant_tokens<'src>(tokens: &[Token<'src>]) -> Vec<Token<'src>> {
    tokens.iter().filter(|t| !t.is_trivia()).copied().collect()
}

/// Render source with ANSI colors
pub fn highlight_ansi(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    for token in Lexer::new(source) {
        match token.style() {
            TokenStyle::Default => out.push_str(token.text),
            style => {
                out.push_str("\x1b[");
                out.push_str(style.ansi());
                out.push('m');
                out.push_str(token.text);
                out.push_str("\x1b[0m");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_mapping() {
        assert_eq!(TokenKind::Keyword.style(), TokenStyle::Keyword);
        assert_eq!(TokenKind::Variable.style(), TokenStyle::Default);
        assert_eq!(TokenKind::Whitespace.style(), TokenStyle::Default);
        assert_eq!(TokenStyle::Type.class_name(), "text-type-keyword");
    }

    #[test]
    fn test_terminated_literals() {
        let tokens = tokenize(r#""ok" "open"#);
        assert!(tokens[0].is_terminated());
        assert!(!tokens[2].is_terminated());

        let tokens = tokenize(r#""escaped\""#);
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].is_terminated());

        let tokens = tokenize("/* done */ /* open");
        assert!(tokens[0].is_terminated());
        assert!(!tokens[2].is_terminated());
        assert!(!tokenize("/*/")[0].is_terminated());
    }

    #[test]
    fn test_highlight_keeps_text() {
        let highlighted = highlight_ansi("uint256 x = 1;");
        assert!(highlighted.contains("\x1b[36muint256\x1b[0m"));
        assert!(highlighted.contains(" x "));
    }
}
