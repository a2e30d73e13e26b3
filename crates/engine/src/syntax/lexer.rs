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

//! Single-pass Solidity lexer
//!
//! Matchers are tried in a fixed priority order at each position: comment,
//! string, number, word, operator, whitespace, and finally a single
//! unrecognised character. Every byte of the input ends up in exactly one
//! token. Unit suffixes such as `ether` or `days` are separate keyword tokens.

use super::{Token, TokenKind};

/// Multi-character operators, longest first
const MULTI_CHAR_OPERATORS: &[&str] = &[
    "<<=", ">>=", ">>>", "**", "++", "--", "==", "!=", "<=", ">=", "&&", "||", "=>", "->", "+=",
    "-=", "*=", "/=", "%=", "|=", "&=", "^=", "<<", ">>", ":=",
];

const SINGLE_CHAR_OPERATORS: &[u8] = b"+-*/%&|^~<>=!?:;,.(){}[]";

/// Streaming Solidity lexer
///
/// Iterates over [`Token`]s borrowing from the source.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    /// Create a lexer positioned at the start of `src`
    pub fn new(src: &'src str) -> Self {
        Self { src, pos: 0 }
    }

    fn bytes(&self) -> &'src [u8] {
        self.src.as_bytes()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn scan_comment(&self) -> Option<usize> {
        let rest = &self.src[self.pos..];
        if rest.starts_with("//") {
            Some(rest.find('\n').unwrap_or(rest.len()))
        } else if rest.starts_with("/*") {
            Some(rest[2..].find("*/").map_or(rest.len(), |idx| idx + 4))
        } else {
            None
        }
    }

    fn scan_string(&self) -> Option<usize> {
        let quote = self.peek(0).filter(|b| *b == b'"' || *b == b'\'')?;
        let bytes = &self.bytes()[self.pos..];
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b if b == quote => return Some(i + 1),
                _ => i += 1,
            }
        }
        Some(bytes.len())
    }

    fn scan_number(&self) -> Option<usize> {
        let bytes = &self.bytes()[self.pos..];
        if !bytes.first()?.is_ascii_digit() {
            return None;
        }

        if bytes.len() > 2
            && bytes[0] == b'0'
            && matches!(bytes[1], b'x' | b'X')
            && bytes[2].is_ascii_hexdigit()
        {
            return Some(2 + run(&bytes[2..], |b| b.is_ascii_hexdigit() || b == b'_'));
        }

        let is_decimal = |b: u8| b.is_ascii_digit() || b == b'_';
        let mut len = run(bytes, is_decimal);

        if bytes.get(len) == Some(&b'.') && bytes.get(len + 1).is_some_and(u8::is_ascii_digit) {
            len += 1 + run(&bytes[len + 1..], is_decimal);
        }

        if matches!(bytes.get(len), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(len + 1), Some(b'+' | b'-')));
            if bytes.get(len + 1 + sign).is_some_and(u8::is_ascii_digit) {
                len += 1 + sign + run(&bytes[len + 1 + sign..], is_decimal);
            }
        }

        Some(len)
    }

    fn scan_word(&self) -> Option<(usize, TokenKind)> {
        let bytes = &self.bytes()[self.pos..];
        let first = *bytes.first()?;
        if !(first.is_ascii_alphabetic() || first == b'_' || first == b'$') {
            return None;
        }

        let len = run(bytes, |b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
        let word = &self.src[self.pos..self.pos + len];

        let kind = if is_keyword(word) {
            TokenKind::Keyword
        } else if is_type(word) {
            TokenKind::Type
        } else {
            let gap = run(&bytes[len..], |b| b.is_ascii_whitespace());
            if bytes.get(len + gap) == Some(&b'(') {
                TokenKind::Function
            } else {
                TokenKind::Variable
            }
        };

        Some((len, kind))
    }

    fn scan_operator(&self) -> Option<usize> {
        let rest = &self.src[self.pos..];
        if let Some(op) = MULTI_CHAR_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            return Some(op.len());
        }
        SINGLE_CHAR_OPERATORS.contains(&self.peek(0)?).then_some(1)
    }

    fn scan_whitespace(&self) -> Option<usize> {
        let len = run(&self.bytes()[self.pos..], |b| b.is_ascii_whitespace());
        (len > 0).then_some(len)
    }

    fn next_token(&self) -> (usize, TokenKind) {
        if let Some(len) = self.scan_comment() {
            return (len, TokenKind::Comment);
        }
        if let Some(len) = self.scan_string() {
            return (len, TokenKind::String);
        }
        if let Some(len) = self.scan_number() {
            return (len, TokenKind::Number);
        }
        if let Some(word) = self.scan_word() {
            return word;
        }
        if let Some(len) = self.scan_operator() {
            return (len, TokenKind::Operator);
        }
        if let Some(len) = self.scan_whitespace() {
            return (len, TokenKind::Whitespace);
        }

        let len = self.src[self.pos..].chars().next().map_or(1, char::len_utf8);
        (len, TokenKind::Other)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.src.len() {
            return None;
        }

        let (len, kind) = self.next_token();
        // Escapes may step past the end of an unterminated string.
        let end = (self.pos + len).min(self.src.len());
        let token = Token { kind, text: &self.src[self.pos..end], start: self.pos };
        self.pos = end;
        Some(token)
    }
}

/// Length of the longest prefix of `bytes` satisfying `pred`
fn run(bytes: &[u8], pred: impl Fn(u8) -> bool) -> usize {
    bytes.iter().take_while(|b| pred(**b)).count()
}

/// Whether `word` is a reserved word, modifier, literal keyword or unit suffix
pub fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "abstract"
            | "anonymous"
            | "as"
            | "assembly"
            | "assert"
            | "break"
            | "calldata"
            | "case"
            | "catch"
            | "constant"
            | "constructor"
            | "continue"
            | "contract"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "emit"
            | "enum"
            | "error"
            | "event"
            | "experimental"
            | "external"
            | "fallback"
            | "false"
            | "for"
            | "from"
            | "function"
            | "if"
            | "immutable"
            | "import"
            | "indexed"
            | "interface"
            | "internal"
            | "is"
            | "leave"
            | "let"
            | "library"
            | "mapping"
            | "memory"
            | "modifier"
            | "new"
            | "override"
            | "payable"
            | "pragma"
            | "private"
            | "public"
            | "pure"
            | "receive"
            | "require"
            | "return"
            | "returns"
            | "revert"
            | "solidity"
            | "storage"
            | "struct"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "type"
            | "unchecked"
            | "using"
            | "view"
            | "virtual"
            | "while"
            // units
            | "wei"
            | "gwei"
            | "ether"
            | "seconds"
            | "minutes"
            | "hours"
            | "days"
            | "weeks"
            | "years"
    )
}

/// Whether `word` names a built-in elementary type
pub fn is_type(word: &str) -> bool {
    match word {
        "address" | "bool" | "string" | "bytes" | "byte" | "uint" | "int" | "fixed" | "ufixed" => {
            true
        }
        _ => {
            if let Some(width) = word.strip_prefix("uint").or_else(|| word.strip_prefix("int")) {
                return parse_width(width).is_some_and(|w| w % 8 == 0 && (8..=256).contains(&w));
            }
            if let Some(width) = word.strip_prefix("bytes") {
                return parse_width(width).is_some_and(|w| (1..=32).contains(&w));
            }
            false
        }
    }
}

fn parse_width(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenize;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_solidity_keywords_and_types() {
        let tokens = kinds("contract SimpleToken { uint256 public balance; }");
        assert_eq!(tokens[0], (TokenKind::Keyword, "contract"));
        assert_eq!(tokens[2], (TokenKind::Variable, "SimpleToken"));
        assert!(tokens.contains(&(TokenKind::Type, "uint256")));
        assert!(tokens.contains(&(TokenKind::Keyword, "public")));
        assert!(tokens.contains(&(TokenKind::Variable, "balance")));
    }

    #[test]
    fn test_function_names() {
        let tokens = kinds("function transfer (address to) { foo(); bar; }");
        assert!(tokens.contains(&(TokenKind::Function, "transfer")));
        assert!(tokens.contains(&(TokenKind::Function, "foo")));
        assert!(tokens.contains(&(TokenKind::Variable, "bar")));
        // keywords and types win over the call heuristic
        assert_eq!(kinds("require(x)")[0], (TokenKind::Keyword, "require"));
        assert_eq!(kinds("uint256(x)")[0], (TokenKind::Type, "uint256"));
    }

    #[test]
    fn test_type_widths() {
        assert!(is_type("uint8"));
        assert!(is_type("int256"));
        assert!(is_type("bytes32"));
        assert!(!is_type("uint7"));
        assert!(!is_type("uint264"));
        assert!(!is_type("bytes33"));
        assert!(!is_type("uint08"));
        assert!(!is_type("uintx"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("0x1F_ff"), vec![(TokenKind::Number, "0x1F_ff")]);
        assert_eq!(kinds("1.5e18"), vec![(TokenKind::Number, "1.5e18")]);
        assert_eq!(kinds("1_000"), vec![(TokenKind::Number, "1_000")]);
        assert_eq!(
            kinds("0x"),
            vec![(TokenKind::Number, "0"), (TokenKind::Variable, "x")]
        );
        assert_eq!(
            kinds("1.x"),
            vec![(TokenKind::Number, "1"), (TokenKind::Operator, "."), (TokenKind::Variable, "x")]
        );
    }

    #[test]
    fn test_unit_suffix_is_separate_token() {
        assert_eq!(
            kinds("1 ether"),
            vec![
                (TokenKind::Number, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Keyword, "ether")
            ]
        );
        assert_eq!(kinds("2days"), vec![(TokenKind::Number, "2"), (TokenKind::Keyword, "days")]);
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a<<=b"),
            vec![
                (TokenKind::Variable, "a"),
                (TokenKind::Operator, "<<="),
                (TokenKind::Variable, "b")
            ]
        );
        assert_eq!(kinds("=>")[0], (TokenKind::Operator, "=>"));
        assert_eq!(kinds("!")[0], (TokenKind::Operator, "!"));
    }

    #[test]
    fn test_comments_and_strings_are_opaque() {
        let tokens = kinds("// contract \"x\"\n'function'");
        assert_eq!(tokens[0], (TokenKind::Comment, "// contract \"x\""));
        assert_eq!(tokens[1], (TokenKind::Whitespace, "\n"));
        assert_eq!(tokens[2], (TokenKind::String, "'function'"));

        assert_eq!(kinds("/* a */b")[0], (TokenKind::Comment, "/* a */"));
        assert_eq!(kinds("/* open")[0], (TokenKind::Comment, "/* open"));
        assert_eq!(kinds(r#""a\"b""#), vec![(TokenKind::String, r#""a\"b""#)]);
    }

    #[test]
    fn test_unterminated_string_with_trailing_escape() {
        assert_eq!(kinds("\"abc\\"), vec![(TokenKind::String, "\"abc\\")]);
    }

    #[test]
    fn test_other_characters() {
        assert_eq!(
            kinds("@é#"),
            vec![(TokenKind::Other, "@"), (TokenKind::Other, "é"), (TokenKind::Other, "#")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }
}
