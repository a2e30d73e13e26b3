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

//! Declaration outline
//!
//! A token-level scan that finds type declarations, contract-level state
//! variables and function-like declarations together with their body spans.
//! There is no parser behind it: declarations are recognised by their leading
//! keyword and bodies by brace matching over significant tokens, so braces in
//! strings and comments never count.

use crate::syntax::{Token, TokenKind};
use serde::Serialize;
use std::{collections::HashSet, ops::Range};

/// Kinds of named type-like declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDeclKind {
    /// `contract` (including `abstract contract`)
    Contract,
    /// `interface`
    Interface,
    /// `library`
    Library,
    /// `struct`
    Struct,
    /// `enum`
    Enum,
    /// `event`
    Event,
    /// `error`
    Error,
}

/// A named type-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeDecl<'src> {
    /// Declaration keyword
    pub kind: TypeDeclKind,
    /// Declared name
    pub name: &'src str,
    /// Byte offset of the name
    pub offset: usize,
}

/// Declared visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// `public`
    Public,
    /// `private`
    Private,
    /// `internal`
    Internal,
    /// `external`
    External,
}

/// A contract-level state variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateVariable<'src> {
    /// Variable name
    pub name: &'src str,
    /// Byte offset of the name
    pub offset: usize,
    /// Explicit visibility, if any
    pub visibility: Option<Visibility>,
    /// Declared `constant`
    pub constant: bool,
    /// Declared `immutable`
    pub immutable: bool,
}

/// Function-like declaration keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    /// `function name(...)`
    Function,
    /// `constructor(...)`
    Constructor,
    /// `receive(...)`
    Receive,
    /// `fallback(...)`
    Fallback,
}

/// State mutability of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    /// No mutability keyword
    NonPayable,
    /// `payable`
    Payable,
    /// `view`
    View,
    /// `pure`
    Pure,
}

impl Mutability {
    /// `view` and `pure` functions cannot write state
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::View | Self::Pure)
    }
}

/// Token and byte extent of a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    /// Indices into [`Outline::tokens`] strictly between the braces
    pub tokens: Range<usize>,
    /// Bytes from the opening brace through the closing brace, or to end of input
    pub span: Range<usize>,
    /// Whether the closing brace was found
    pub closed: bool,
}

/// A function-like declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl<'src> {
    /// Declaration keyword
    pub kind: FunctionKind,
    /// Declared name; the keyword itself for constructors, `receive` and `fallback`
    pub name: &'src str,
    /// Byte offset of the name
    pub offset: usize,
    /// Parameter types in declaration order
    pub param_types: Vec<String>,
    /// State mutability
    pub mutability: Mutability,
    /// Body, absent for bodiless declarations
    pub body: Option<Body>,
}

impl FunctionDecl<'_> {
    /// Name with parameter types, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.param_types.join(","))
    }
}

/// Declarations found in one source text
#[derive(Debug, Clone, Default)]
pub struct Outline<'src> {
    /// Significant tokens (no whitespace or comments) in source order
    pub tokens: Vec<Token<'src>>,
    /// Contracts, interfaces, libraries, structs, enums, events and errors
    pub types: Vec<TypeDecl<'src>>,
    /// Contract-level state variables
    pub state_variables: Vec<StateVariable<'src>>,
    /// Functions, constructors, `receive` and `fallback`
    pub functions: Vec<FunctionDecl<'src>>,
}

impl<'src> Outline<'src> {
    /// Scan a token stream of `source`
    pub fn scan(source: &'src str, tokens: &[Token<'src>]) -> Self {
        let tokens: Vec<Token<'src>> = tokens.iter().filter(|t| !t.is_trivia()).copied().collect();
        let mut outline = Self { tokens, ..Self::default() };
        outline.collect(source.len());
        outline
    }

    /// Names of non-constant state variables
    pub fn mutable_state_names(&self) -> HashSet<&'src str> {
        self.state_variables
            .iter()
            .filter(|var| !var.constant && !var.immutable)
            .map(|var| var.name)
            .collect()
    }

    /// Significant tokens of a function body
    pub fn body_tokens(&self, function: &FunctionDecl<'src>) -> &[Token<'src>] {
        function.body.as_ref().map_or(&[], |body| &self.tokens[body.tokens.clone()])
    }

    fn collect(&mut self, source_len: usize) {
        let mut depth = 0usize;
        let mut parens = 0usize;
        // Brace depths at which a contract, interface or library body is open.
        let mut containers: Vec<usize> = Vec::new();
        let mut pending_container = false;
        let mut statement: Option<usize> = None;

        let mut i = 0;
        while i < self.tokens.len() {
            let token = self.tokens[i];
            let in_container = containers.last() == Some(&depth);

            match token.text {
                "(" if token.kind == TokenKind::Operator => parens += 1,
                ")" if token.kind == TokenKind::Operator => parens = parens.saturating_sub(1),
                "{" if token.kind == TokenKind::Operator => {
                    depth += 1;
                    if pending_container {
                        containers.push(depth);
                        pending_container = false;
                    }
                    if in_container && parens == 0 {
                        statement = None;
                    }
                    i += 1;
                    continue;
                }
                "}" if token.kind == TokenKind::Operator => {
                    if containers.last() == Some(&depth) {
                        containers.pop();
                    }
                    depth = depth.saturating_sub(1);
                    if parens == 0 {
                        statement = None;
                    }
                    i += 1;
                    continue;
                }
                _ => {}
            }

            if token.kind == TokenKind::Keyword {
                match token.text {
                    "contract" | "interface" | "library" => {
                        let kind = match token.text {
                            "contract" => TypeDeclKind::Contract,
                            "interface" => TypeDeclKind::Interface,
                            _ => TypeDeclKind::Library,
                        };
                        self.push_type(kind, i);
                        pending_container = true;
                    }
                    "struct" => self.push_type(TypeDeclKind::Struct, i),
                    "enum" => self.push_type(TypeDeclKind::Enum, i),
                    "event" => self.push_type(TypeDeclKind::Event, i),
                    "error" => self.push_type(TypeDeclKind::Error, i),
                    "function" | "constructor" | "receive" | "fallback" => {
                        if let Some(function) = self.function_at(i, source_len) {
                            self.functions.push(function);
                        }
                    }
                    _ => {}
                }
            }

            if in_container {
                if token.is_op(";") {
                    if let Some(start) = statement.take() {
                        if let Some(var) = state_variable(&self.tokens[start..i]) {
                            self.state_variables.push(var);
                        }
                    }
                } else if statement.is_none() {
                    statement = Some(i);
                }
            }

            i += 1;
        }
    }

    fn push_type(&mut self, kind: TypeDeclKind, keyword: usize) {
        if let Some(name) = self.tokens.get(keyword + 1).filter(|t| is_name(t)) {
            self.types.push(TypeDecl { kind, name: name.text, offset: name.start });
        }
    }

    fn function_at(&self, keyword: usize, source_len: usize) -> Option<FunctionDecl<'src>> {
        let tokens = &self.tokens;
        let keyword_token = tokens[keyword];

        let (kind, name, open_paren) = match keyword_token.text {
            "function" => {
                let name = tokens.get(keyword + 1).filter(|t| is_name(t))?;
                (FunctionKind::Function, *name, keyword + 2)
            }
            "constructor" => (FunctionKind::Constructor, keyword_token, keyword + 1),
            "receive" => (FunctionKind::Receive, keyword_token, keyword + 1),
            _ => (FunctionKind::Fallback, keyword_token, keyword + 1),
        };

        if !tokens.get(open_paren)?.is_op("(") {
            return None;
        }
        let close_paren = find_matching(tokens, open_paren, "(", ")")?;
        let param_types = split_params(&tokens[open_paren + 1..close_paren])
            .into_iter()
            .filter(|param| !param.is_empty())
            .map(param_type)
            .collect();

        let mut mutability = Mutability::NonPayable;
        let mut parens = 0usize;
        let mut body = None;
        for idx in close_paren + 1..tokens.len() {
            let token = tokens[idx];
            match token.text {
                "(" if token.kind == TokenKind::Operator => parens += 1,
                ")" if token.kind == TokenKind::Operator => parens = parens.saturating_sub(1),
                ";" if parens == 0 && token.kind == TokenKind::Operator => break,
                "{" if parens == 0 && token.kind == TokenKind::Operator => {
                    body = Some(match find_matching(tokens, idx, "{", "}") {
                        Some(close) => Body {
                            tokens: idx + 1..close,
                            span: token.start..tokens[close].end(),
                            closed: true,
                        },
                        None => Body {
                            tokens: idx + 1..tokens.len(),
                            span: token.start..source_len,
                            closed: false,
                        },
                    });
                    break;
                }
                "view" if token.kind == TokenKind::Keyword => mutability = Mutability::View,
                "pure" if token.kind == TokenKind::Keyword => mutability = Mutability::Pure,
                "payable" if token.kind == TokenKind::Keyword && parens == 0 => {
                    mutability = Mutability::Payable
                }
                _ => {}
            }
        }

        Some(FunctionDecl {
            kind,
            name: name.text,
            offset: name.start,
            param_types,
            mutability,
            body,
        })
    }
}

fn is_name(token: &Token<'_>) -> bool {
    matches!(token.kind, TokenKind::Variable | TokenKind::Function)
}

/// Index of the token closing the group opened at `open_idx`
pub(crate) fn find_matching(
    tokens: &[Token<'_>],
    open_idx: usize,
    open: &str,
    close: &str,
) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate().skip(open_idx) {
        if token.is_op(open) {
            depth += 1;
        } else if token.is_op(close) && depth > 0 {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Member calls that hand control to another contract
const EXTERNAL_CALLS: &[&str] = &["call", "delegatecall", "staticcall", "send", "transfer"];

/// Whether the tokens at `idx` form `.call`, `.transfer` or another external member call
pub(crate) fn is_external_call(tokens: &[Token<'_>], idx: usize) -> bool {
    tokens.get(idx).is_some_and(|dot| dot.is_op("."))
        && tokens
            .get(idx + 1)
            .is_some_and(|name| name.is_word() && EXTERNAL_CALLS.contains(&name.text))
}

/// Operators that store into their left operand
pub(crate) const ASSIGNMENT_OPERATORS: &[&str] =
    &["=", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", "<<=", ">>="];

/// Whether `token` writes a location: an assignment, `++`, `--` or `delete`
pub(crate) fn is_write(token: &Token<'_>) -> bool {
    (token.kind == TokenKind::Operator
        && (ASSIGNMENT_OPERATORS.contains(&token.text) || matches!(token.text, "++" | "--")))
        || token.is_keyword("delete")
}

/// Root identifier of the location written by the token at `idx`
///
/// For `balances[to].total += 1` this is `balances`. Returns `None` when
/// the token is not a write or the target has no identifier root.
pub(crate) fn write_target<'t, 'src>(
    tokens: &'t [Token<'src>],
    idx: usize,
) -> Option<&'t Token<'src>> {
    let token = tokens.get(idx)?;
    if !is_write(token) {
        return None;
    }

    let assignment = token.kind == TokenKind::Operator && ASSIGNMENT_OPERATORS.contains(&token.text);
    let postfix = !assignment && token.kind == TokenKind::Operator && idx > 0 && {
        let prev = &tokens[idx - 1];
        (prev.is_word() && prev.kind != TokenKind::Keyword) || prev.is_op("]")
    };
    if !assignment && !postfix {
        // `++x`, `--x`, `delete x`
        return tokens.get(idx + 1).filter(|t| t.is_word());
    }

    let mut root = None;
    let mut j = idx;
    while j > 0 {
        j -= 1;
        let current = &tokens[j];
        if current.is_op("]") {
            let mut depth = 1usize;
            while j > 0 && depth > 0 {
                j -= 1;
                if tokens[j].is_op("]") {
                    depth += 1;
                } else if tokens[j].is_op("[") {
                    depth -= 1;
                }
            }
            if depth > 0 {
                break;
            }
        } else if current.is_word() {
            root = Some(current);
            if j > 0 && tokens[j - 1].is_op(".") {
                j -= 1;
            } else {
                break;
            }
        } else {
            break;
        }
    }
    root
}

/// Split a parameter list on top-level commas
fn split_params<'a, 'src>(tokens: &'a [Token<'src>]) -> Vec<&'a [Token<'src>]> {
    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, token) in tokens.iter().enumerate() {
        match token.text {
            "(" | "[" if token.kind == TokenKind::Operator => depth += 1,
            ")" | "]" if token.kind == TokenKind::Operator => depth = depth.saturating_sub(1),
            "," if depth == 0 && token.kind == TokenKind::Operator => {
                params.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    params.push(&tokens[start..]);
    params
}

/// The type portion of one parameter, e.g. `uint256[]` from `uint256[] memory ids`
fn param_type(param: &[Token<'_>]) -> String {
    let mut ty = String::new();
    let mut depth = 0usize;
    let mut after_dot = false;
    for (idx, token) in param.iter().enumerate() {
        let opens = token.is_op("(") || token.is_op("[");
        let closes = token.is_op(")") || token.is_op("]");
        let continues = idx == 0
            || depth > 0
            || after_dot
            || opens
            || token.is_op(".")
            || token.is_keyword("payable");
        if !continues {
            break;
        }
        if opens {
            depth += 1;
        } else if closes {
            depth = depth.saturating_sub(1);
        }
        after_dot = token.is_op(".");
        // `address payable` is `address` in signatures
        if !token.is_keyword("payable") {
            ty.push_str(token.text);
        }
    }
    ty
}

/// Interpret one contract-level statement as a state variable declaration
fn state_variable<'src>(statement: &[Token<'src>]) -> Option<StateVariable<'src>> {
    let first = statement.first()?;
    let starts_with_type = first.kind == TokenKind::Type
        || first.is_keyword("mapping")
        || first.kind == TokenKind::Variable;
    if !starts_with_type {
        return None;
    }

    let mut parens = 0usize;
    let declarator_end = statement
        .iter()
        .position(|t| {
            if t.is_op("(") {
                parens += 1;
            } else if t.is_op(")") {
                parens = parens.saturating_sub(1);
            }
            parens == 0 && t.is_op("=")
        })
        .unwrap_or(statement.len());
    let declarator = &statement[..declarator_end];

    let name_idx = declarator.iter().rposition(|t| t.kind == TokenKind::Variable)?;
    if name_idx == 0 {
        return None;
    }
    let name = declarator[name_idx];

    let mut var = StateVariable {
        name: name.text,
        offset: name.start,
        visibility: None,
        constant: false,
        immutable: false,
    };
    for token in declarator.iter().filter(|t| t.kind == TokenKind::Keyword) {
        match token.text {
            "public" => var.visibility = Some(Visibility::Public),
            "private" => var.visibility = Some(Visibility::Private),
            "internal" => var.visibility = Some(Visibility::Internal),
            "external" => var.visibility = Some(Visibility::External),
            "constant" => var.constant = true,
            "immutable" => var.immutable = true,
            _ => {}
        }
    }
    Some(var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenize;

    const SOURCE: &str = r#"
contract Vault is Base {
    struct Info { uint256 amount; }
    enum state { Open, Closed }
    uint256 public constant MAX = 10;
    address private owner;
    mapping(address => uint256) balances;
    Info[] public infos;
    string name = "{not a brace}";
    event Deposited(address indexed who);

    function deposit(uint256[] memory ids, address payable to) external payable {
        balances[msg.sender] += msg.value;
    }

    function total() public view returns (uint256) { return 0; }

    constructor() { owner = msg.sender; }
}

interface IVault {
    function deposit(uint256[] memory ids, address payable to) external payable;
}
"#;

    fn outline(source: &str) -> Outline<'_> {
        Outline::scan(source, &tokenize(source))
    }

    #[test]
    fn test_type_declarations() {
        let outline = outline(SOURCE);
        let names: Vec<_> = outline.types.iter().map(|t| (t.kind, t.name)).collect();
        assert_eq!(
            names,
            vec![
                (TypeDeclKind::Contract, "Vault"),
                (TypeDeclKind::Struct, "Info"),
                (TypeDeclKind::Enum, "state"),
                (TypeDeclKind::Event, "Deposited"),
                (TypeDeclKind::Interface, "IVault"),
            ]
        );
    }

    #[test]
    fn test_state_variables() {
        let outline = outline(SOURCE);
        let names: Vec<_> = outline.state_variables.iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["MAX", "owner", "balances", "infos", "name"]);

        let max = &outline.state_variables[0];
        assert!(max.constant);
        assert_eq!(max.visibility, Some(Visibility::Public));
        assert_eq!(outline.state_variables[1].visibility, Some(Visibility::Private));
        assert_eq!(outline.state_variables[2].visibility, None);

        let mutable = outline.mutable_state_names();
        assert!(mutable.contains("owner"));
        assert!(!mutable.contains("MAX"));
    }

    #[test]
    fn test_functions() {
        let source = SOURCE;
        let outline = outline(source);
        let functions = &outline.functions;
        assert_eq!(functions.len(), 4);

        assert_eq!(functions[0].signature(), "deposit(uint256[],address)");
        assert_eq!(functions[0].mutability, Mutability::Payable);
        let body = functions[0].body.as_ref().unwrap();
        assert!(body.closed);
        assert!(source[body.span.clone()].starts_with('{'));
        assert!(source[body.span.clone()].ends_with('}'));

        assert_eq!(functions[1].name, "total");
        assert_eq!(functions[1].mutability, Mutability::View);
        assert_eq!(outline.body_tokens(&functions[1]).len(), 3);

        assert_eq!(functions[2].kind, FunctionKind::Constructor);
        assert_eq!(functions[2].name, "constructor");

        // interface declaration has no body
        assert!(functions[3].body.is_none());
    }

    #[test]
    fn test_unclosed_body_runs_to_end() {
        let source = "contract A { function f() public { if (x) { y = 1; }";
        let outline = outline(source);
        let body = outline.functions[0].body.as_ref().unwrap();
        assert!(!body.closed);
        assert_eq!(body.span.end, source.len());
    }

    #[test]
    fn test_write_targets() {
        let target = |source: &str| {
            let tokens: Vec<_> = tokenize(source).into_iter().filter(|t| !t.is_trivia()).collect();
            let idx = tokens.iter().position(is_write)?;
            write_target(&tokens, idx).map(|t| t.text.to_string())
        };
        assert_eq!(target("balances[to].total += 1;").as_deref(), Some("balances"));
        assert_eq!(target("uint256 x = 1;").as_deref(), Some("x"));
        assert_eq!(target("count++;").as_deref(), Some("count"));
        assert_eq!(target("++count;").as_deref(), Some("count"));
        assert_eq!(target("delete owner;").as_deref(), Some("owner"));
        assert_eq!(target("(a, b) = f();"), None);
        assert_eq!(target("x == 1;"), None);
    }

    #[test]
    fn test_function_types_are_not_declarations() {
        let outline = outline("contract A { function (uint256) external returns (uint256) f; }");
        assert!(outline.functions.is_empty());
    }
}
