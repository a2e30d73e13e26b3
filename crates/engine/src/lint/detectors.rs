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

//! Built-in lint rules
//!
//! Registry order is the tie-break order for issues reported at the same
//! position.

use super::{Detector, Finding, LintContext, Severity};
use crate::{
    outline::{is_external_call, write_target, TypeDeclKind, Visibility},
    syntax::TokenKind,
    LintError,
};
use regex::Regex;
use std::{collections::HashSet, sync::OnceLock};

/// Compile a pattern once per process
macro_rules! pattern {
    ($re:expr) => {{
        static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
        PATTERN
            .get_or_init(|| Regex::new($re))
            .as_ref()
            .map_err(|err| LintError::Pattern(err.clone()))
    }};
}

/// Every built-in detector, in tie-break order
pub static DETECTORS: &[Detector] = &[
    Detector {
        code: "unterminated-literal",
        severity: Severity::Error,
        description: "String literal or block comment without a closing delimiter",
        check: unterminated_literal,
    },
    Detector {
        code: "unbalanced-braces",
        severity: Severity::Error,
        description: "Unmatched `{` or `}`",
        check: unbalanced_braces,
    },
    Detector {
        code: "missing-spdx",
        severity: Severity::Info,
        description: "No SPDX license identifier near the top of the file",
        check: missing_spdx,
    },
    Detector {
        code: "missing-pragma",
        severity: Severity::Warning,
        description: "No `pragma solidity` near the top of the file",
        check: missing_pragma,
    },
    Detector {
        code: "floating-pragma",
        severity: Severity::Info,
        description: "Compiler version is not pinned",
        check: floating_pragma,
    },
    Detector {
        code: "unchecked-call",
        severity: Severity::Warning,
        description: "Result of a low-level call is ignored",
        check: unchecked_call,
    },
    Detector {
        code: "reentrancy",
        severity: Severity::Warning,
        description: "State written after an external call",
        check: reentrancy,
    },
    Detector {
        code: "tx-origin",
        severity: Severity::Warning,
        description: "`tx.origin` used",
        check: tx_origin,
    },
    Detector {
        code: "timestamp-dependence",
        severity: Severity::Warning,
        description: "Block timestamp or randomness source drives control flow",
        check: timestamp_dependence,
    },
    Detector {
        code: "unbounded-loop",
        severity: Severity::Warning,
        description: "Loop bounded by a collection length",
        check: unbounded_loop,
    },
    Detector {
        code: "magic-number",
        severity: Severity::Info,
        description: "Unnamed numeric literal in a comparison",
        check: magic_number,
    },
    Detector {
        code: "naming-convention",
        severity: Severity::Info,
        description: "Declaration name breaks Solidity naming conventions",
        check: naming_convention,
    },
];

/// Byte offset one past the `)` closing the `(` at `open`, or the text length
fn paren_group_end(text: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (idx, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return idx + 1;
                }
            }
            _ => {}
        }
    }
    text.len()
}

/// Byte offset just past the last line the header scan covers
fn header_end(ctx: &LintContext<'_>) -> usize {
    let lines = ctx.config.header_scan_lines;
    ctx.masked
        .match_indices('\n')
        .nth(lines.saturating_sub(1))
        .map_or(ctx.masked.len(), |(idx, _)| idx)
}

fn unterminated_literal(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    Ok(ctx
        .tokens
        .iter()
        .filter(|token| !token.is_terminated())
        .map(|token| {
            let what = if token.kind == TokenKind::String { "string literal" } else { "block comment" };
            Finding::new(token.start, format!("Unterminated {what}"))
        })
        .collect())
}

fn unbalanced_braces(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let mut findings = Vec::new();
    let mut open = Vec::new();
    for token in &ctx.outline.tokens {
        if token.is_op("{") {
            open.push(token.start);
        } else if token.is_op("}") && open.pop().is_none() {
            findings.push(Finding::new(token.start, "Unmatched closing brace"));
        }
    }
    findings.extend(open.into_iter().map(|offset| Finding::new(offset, "Unclosed brace")));
    Ok(findings)
}

fn missing_spdx(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    // The identifier lives in a comment, so search the raw text.
    let mut header = ctx.source.lines().take(ctx.config.header_scan_lines);
    if header.any(|line| line.contains("SPDX-License-Identifier:")) {
        return Ok(vec![]);
    }
    Ok(vec![Finding::new(0, "Missing SPDX license identifier")])
}

fn missing_pragma(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let re = pattern!(r"\bpragma\s+solidity\b")?;
    if re.is_match(&ctx.masked[..header_end(ctx)]) {
        return Ok(vec![]);
    }
    Ok(vec![Finding::new(0, "Missing `pragma solidity` version directive")])
}

fn floating_pragma(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let re = pattern!(r"\bpragma\s+solidity\s+([^;]*)")?;
    Ok(re
        .captures_iter(&ctx.masked)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let version = caps.get(1)?.as_str().trim();
            version.contains(['^', '~', '>']).then(|| {
                Finding::new(
                    whole.start(),
                    format!("Floating pragma `{version}`; pin an exact compiler version"),
                )
            })
        })
        .collect())
}

fn unchecked_call(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let call = pattern!(r"\.\s*(call|delegatecall|staticcall|send)\s*(\{[^}]*\})?\s*\(")?;
    let guard = pattern!(r"\b(require|assert|if|while)\s*\(")?;
    let returned = pattern!(r"^\s*return\b")?;

    let mut findings = Vec::new();
    for caps in call.captures_iter(&ctx.masked) {
        let (Some(whole), Some(method)) = (caps.get(0), caps.get(1)) else { continue };
        let statement_start = ctx.masked[..whole.start()]
            .rfind([';', '{', '}'])
            .map_or(0, |idx| idx + 1);

        // a call is checked only from inside the guard's parentheses
        let mut checked = false;
        let mut effective = statement_start;
        for g in guard.find_iter(&ctx.masked[statement_start..whole.start()]) {
            let open = statement_start + g.end() - 1;
            let close = paren_group_end(&ctx.masked, open);
            if close > whole.start() {
                checked = true;
                break;
            }
            effective = effective.max(close);
        }
        if checked {
            continue;
        }

        let prefix = &ctx.masked[effective.min(whole.start())..whole.start()];
        if prefix.contains('=') || prefix.contains('!') || returned.is_match(prefix) {
            continue;
        }
        findings.push(Finding::new(
            method.start(),
            format!("Return value of low-level `{}` is not checked", method.as_str()),
        ));
    }
    Ok(findings)
}

fn reentrancy(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let outline = &ctx.outline;
    let state = outline.mutable_state_names();
    if state.is_empty() {
        return Ok(vec![]);
    }

    let mut findings = Vec::new();
    for function in outline.functions.iter().filter(|f| !f.mutability.is_read_only()) {
        let body = outline.body_tokens(function);
        let Some(call) = (0..body.len()).find(|idx| is_external_call(body, *idx)) else {
            continue;
        };

        let write = (call + 2..body.len())
            .filter_map(|idx| write_target(body, idx))
            .find(|target| state.contains(target.text));
        if let Some(target) = write {
            findings.push(Finding::new(
                target.start,
                format!(
                    "State variable `{}` is written after an external call in `{}`; \
                     update state before calling out",
                    target.text, function.name
                ),
            ));
        }
    }
    Ok(findings)
}

fn tx_origin(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let re = pattern!(r"\btx\s*\.\s*origin\b")?;
    Ok(re
        .find_iter(&ctx.masked)
        .map(|m| Finding::new(m.start(), "Avoid `tx.origin`; use `msg.sender` for authorization"))
        .collect())
}

fn timestamp_dependence(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let condition = pattern!(r"\b(if|require|assert|while)\s*\(")?;
    let time = pattern!(r"\bblock\s*\.\s*timestamp\b|\bnow\b")?;
    let randomness = pattern!(r"\bblock\s*\.\s*(difficulty|prevrandao)\b|\bblockhash\s*\(")?;
    let hashing = pattern!(r"\bkeccak256\s*\(")?;

    let masked = ctx.masked.as_str();
    let mut seen = HashSet::new();
    let mut findings = Vec::new();

    for m in condition.find_iter(masked) {
        let range = m.end() - 1..paren_group_end(masked, m.end() - 1);
        let text = &masked[range.clone()];
        for hit in time.find_iter(text) {
            if seen.insert(range.start + hit.start()) {
                findings.push(Finding::new(
                    range.start + hit.start(),
                    "Control flow depends on the block timestamp, which miners can skew",
                ));
            }
        }
        for hit in randomness.find_iter(text) {
            if seen.insert(range.start + hit.start()) {
                findings.push(Finding::new(
                    range.start + hit.start(),
                    "Control flow depends on a predictable block value",
                ));
            }
        }
    }

    for m in hashing.find_iter(masked) {
        let range = m.end() - 1..paren_group_end(masked, m.end() - 1);
        let text = &masked[range.clone()];
        for hit in time.find_iter(text).chain(randomness.find_iter(text)) {
            if seen.insert(range.start + hit.start()) {
                findings.push(Finding::new(
                    range.start + hit.start(),
                    "Block values are not a source of randomness",
                ));
            }
        }
    }

    Ok(findings)
}

fn unbounded_loop(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let header = pattern!(r"\b(for|while)\s*\(")?;
    let length = pattern!(r"\.\s*length\b")?;

    let masked = ctx.masked.as_str();
    Ok(header
        .captures_iter(masked)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = caps.get(1)?;
            let text = &masked[whole.end() - 1..paren_group_end(masked, whole.end() - 1)];
            length.is_match(text).then(|| {
                Finding::new(
                    keyword.start(),
                    format!(
                        "`{}` loop is bounded by a collection length and may run out of gas",
                        keyword.as_str()
                    ),
                )
            })
        })
        .collect())
}

fn magic_number(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let allowlist = &ctx.config.magic_number_allowlist;
    let tokens = &ctx.outline.tokens;
    let is_comparison = |idx: Option<usize>| {
        idx.and_then(|i| tokens.get(i)).is_some_and(|t| {
            t.kind == TokenKind::Operator && matches!(t.text, "<" | ">" | "<=" | ">=" | "==" | "!=")
        })
    };

    let mut findings = Vec::new();
    let mut in_pragma = false;
    for (idx, token) in tokens.iter().enumerate() {
        if token.is_keyword("pragma") {
            in_pragma = true;
        } else if token.is_op(";") {
            in_pragma = false;
        }
        if in_pragma || token.kind != TokenKind::Number {
            continue;
        }

        let literal = token.text.replace('_', "");
        if allowlist.iter().any(|allowed| *allowed == literal) {
            continue;
        }
        if is_comparison(idx.checked_sub(1)) || is_comparison(Some(idx + 1)) {
            findings.push(Finding::new(
                token.start,
                format!("Magic number `{}` in comparison; consider a named constant", token.text),
            ));
        }
    }
    Ok(findings)
}

fn naming_convention(ctx: &LintContext<'_>) -> Result<Vec<Finding>, LintError> {
    let outline = &ctx.outline;
    let mut findings = Vec::new();

    for decl in &outline.types {
        if !decl.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            let kind = match decl.kind {
                TypeDeclKind::Contract => "Contract",
                TypeDeclKind::Interface => "Interface",
                TypeDeclKind::Library => "Library",
                TypeDeclKind::Struct => "Struct",
                TypeDeclKind::Enum => "Enum",
                TypeDeclKind::Event => "Event",
                TypeDeclKind::Error => "Error",
            };
            findings.push(Finding::new(
                decl.offset,
                format!("{kind} name `{}` should use CapWords", decl.name),
            ));
        }
    }

    for var in &outline.state_variables {
        if var.constant {
            let upper = var.name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
            if !upper {
                findings.push(Finding::new(
                    var.offset,
                    format!("Constant `{}` should be UPPER_CASE", var.name),
                ));
            }
        } else if var.visibility == Some(Visibility::Private) && !var.name.starts_with('_') {
            findings.push(Finding::new(
                var.offset,
                format!("Private state variable `{}` should start with an underscore", var.name),
            ));
        }
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::{lint, CheckFn, LintIssue};
    use solide_common::LintConfig;

    const HEADER: &str = "// SPDX-License-Identifier: MIT\npragma solidity 0.8.19;\n";

    fn codes(issues: &[LintIssue]) -> Vec<&'static str> {
        issues.iter().filter_map(|issue| issue.code).collect()
    }

    fn run(check: CheckFn, source: &str) -> Vec<Finding> {
        let config = LintConfig::default();
        let ctx = LintContext::new(source, &config);
        check(&ctx).unwrap()
    }

    #[test]
    fn test_registry_codes_are_unique() {
        let codes: HashSet<_> = DETECTORS.iter().map(|d| d.code).collect();
        assert_eq!(codes.len(), DETECTORS.len());
    }

    #[test]
    fn test_clean_header_has_no_issues() {
        let source = format!("{HEADER}contract Token {{\n}}\n");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_missing_header() {
        let issues = lint("contract A {}");
        assert_eq!(codes(&issues), vec!["missing-spdx", "missing-pragma"]);
        assert!(issues.iter().all(|i| i.line == 1 && i.column == 1));
    }

    #[test]
    fn test_pragma_in_comment_does_not_count() {
        let findings = run(missing_pragma, "// pragma solidity 0.8.0;\ncontract A {}");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_header_scan_is_limited() {
        let source = format!("{}{HEADER}", "\n".repeat(12));
        let issues = lint(&source);
        assert_eq!(codes(&issues), vec!["missing-spdx", "missing-pragma"]);
    }

    #[test]
    fn test_floating_pragma() {
        assert_eq!(run(floating_pragma, "pragma solidity ^0.8.0;").len(), 1);
        assert_eq!(run(floating_pragma, "pragma solidity >=0.8.0 <0.9.0;").len(), 1);
        assert!(run(floating_pragma, "pragma solidity 0.8.19;").is_empty());
    }

    #[test]
    fn test_unterminated_literals() {
        let findings = run(unterminated_literal, "string s = \"open;\n/* never closed");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Unterminated string literal");

        let findings = run(unterminated_literal, "x; /* never closed");
        assert_eq!(findings[0].message, "Unterminated block comment");
    }

    #[test]
    fn test_unbalanced_braces() {
        let findings = run(unbalanced_braces, "contract A { function f() { }");
        assert_eq!(findings, vec![Finding::new(11, "Unclosed brace")]);

        let findings = run(unbalanced_braces, "} contract A { string s = \"}\"; }");
        assert_eq!(findings, vec![Finding::new(0, "Unmatched closing brace")]);
    }

    #[test]
    fn test_unchecked_calls() {
        let source = r#"
            to.call{value: amount}("");
            (bool ok, ) = to.call{value: amount}("");
            require(to.send(1));
            if (!to.send(1)) { revert(); }
            if (go) to.send(1);
            if (a == b) to.send(2);
            while (pending) to.call("");
            return to.send(3);
            to.delegatecall(data);
        "#;
        let findings = run(unchecked_call, source);
        let methods: Vec<_> = findings.iter().map(|f| &source[f.offset..f.offset + 4]).collect();
        assert_eq!(methods, vec!["call", "send", "send", "call", "dele"]);
    }

    #[test]
    fn test_unchecked_call_after_if_condition() {
        let source = format!(
            "{HEADER}contract A {{\n    function f(address payable to, bool go) public {{\n        if (go) to.send(1);\n        to.send(2);\n        require(to.send(3));\n    }}\n}}\n"
        );
        let lines: Vec<_> = lint(&source)
            .into_iter()
            .filter(|issue| issue.code == Some("unchecked-call"))
            .map(|issue| issue.line)
            .collect();
        assert_eq!(lines, vec![5, 6]);
    }

    #[test]
    fn test_reentrancy() {
        let source = r#"
contract Bank {
    mapping(address => uint256) balances;

    function withdraw() external {
        uint256 amount = balances[msg.sender];
        (bool ok, ) = msg.sender.call{value: amount}("");
        require(ok);
        balances[msg.sender] = 0;
    }

    function safe() external {
        balances[msg.sender] = 0;
        payable(msg.sender).transfer(1);
    }
}
"#;
        let findings = run(reentrancy, source);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("`balances`"));
        assert!(findings[0].message.contains("`withdraw`"));
        assert_eq!(&source[findings[0].offset..findings[0].offset + 8], "balances");
    }

    #[test]
    fn test_tx_origin() {
        let findings = run(tx_origin, "require(tx.origin == owner); // tx.origin");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].offset, 8);
    }

    #[test]
    fn test_timestamp_dependence() {
        let source = r#"
            if (block.timestamp > deadline) {}
            uint256 t = block.timestamp;
            require(now >= start);
            uint256 r = uint256(keccak256(abi.encodePacked(block.prevrandao))) % 10;
        "#;
        let findings = run(timestamp_dependence, source);
        assert_eq!(findings.len(), 3);
        assert!(findings[2].message.contains("randomness"));
    }

    #[test]
    fn test_unbounded_loop() {
        let source = "for (uint256 i = 0; i < users.length; i++) {}\nfor (uint256 i = 0; i < 10; i++) {}\nwhile (queue.length > 0) {}";
        let findings = run(unbounded_loop, source);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].offset, 0);
        assert!(findings[1].message.starts_with("`while`"));
    }

    #[test]
    fn test_magic_numbers() {
        let source = "pragma solidity 0.8.19;\nif (x > 100 && y == 1 && 42 <= z && w = 7) {}";
        let findings = run(magic_number, source);
        let literals: Vec<_> = findings.iter().map(|f| &source[f.offset..f.offset + 2]).collect();
        assert_eq!(literals, vec!["10", "42"]);
    }

    #[test]
    fn test_naming_conventions() {
        let source = r#"
contract token {
    uint256 private balance;
    uint256 private _supply;
    uint256 public constant maxSupply = 1;
    uint256 public constant MAX_SUPPLY = 1;
    struct info { uint256 a; }
}
"#;
        let messages: Vec<_> = run(naming_convention, source).into_iter().map(|f| f.message).collect();
        assert_eq!(
            messages,
            vec![
                "Contract name `token` should use CapWords",
                "Struct name `info` should use CapWords",
                "Private state variable `balance` should start with an underscore",
                "Constant `maxSupply` should be UPPER_CASE",
            ]
        );
    }

    #[test]
    fn test_issues_are_sorted_by_position() {
        let source = format!("{HEADER}contract A {{\n    function f() public {{ require(tx.origin == o && x > 5); }}\n}}\n");
        let issues = lint(&source);
        assert_eq!(codes(&issues), vec!["tx-origin", "magic-number"]);
        assert!(issues.windows(2).all(|w| (w[0].line, w[0].column) <= (w[1].line, w[1].column)));
    }
}
