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

//! Import statements and the file dependency graph
//!
//! Imports resolve to files by final path segment. When several files share
//! that segment, the import path is matched against the file paths instead.

use crate::{
    source::LineIndex,
    syntax::{significant_tokens, tokenize, TokenKind},
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Where an import path points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// `./` or `../`
    Relative,
    /// `@scope/...` or `node_modules/...`
    Package,
    /// Anything else
    Absolute,
}

impl ImportKind {
    /// Classify an import path
    pub fn of(path: &str) -> Self {
        if path.starts_with("./") || path.starts_with("../") {
            Self::Relative
        } else if path.starts_with('@') || path.starts_with("node_modules/") {
            Self::Package
        } else {
            Self::Absolute
        }
    }
}

/// One `import` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// Imported path without quotes
    pub path: String,
    /// Path classification
    pub kind: ImportKind,
    /// 1-based line of the `import` keyword
    pub line: usize,
}

impl Import {
    /// Final segment of the path, e.g. `IERC20.sol`
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lexically normalised path: `.` dropped, `..` applied, `/` separators
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|last| *last != "..") => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}

/// The file among `candidates` (all sharing the import's final segment) that
/// `importer` refers to with `import`
fn resolve<'g>(candidates: &'g [String], importer: &str, import: &Import) -> Option<&'g String> {
    if let [only] = candidates {
        return Some(only);
    }

    let wanted = match (import.kind, importer.rfind(['/', '\\'])) {
        (ImportKind::Relative, Some(dir)) => normalize(&format!("{}/{}", &importer[..dir], import.path)),
        _ => normalize(&import.path),
    };
    let suffix = format!("/{wanted}");
    candidates
        .iter()
        .find(|candidate| normalize(candidate) == wanted)
        .or_else(|| candidates.iter().find(|candidate| normalize(candidate).ends_with(&suffix)))
}

/// Parse every import statement in `source`
pub fn parse_imports(source: &str) -> Vec<Import> {
    let tokens = tokenize(source);
    let significant = significant_tokens(&tokens);
    let lines = LineIndex::new(source);

    let mut imports = Vec::new();
    for (idx, token) in significant.iter().enumerate() {
        if !token.is_keyword("import") {
            continue;
        }
        let path = significant[idx + 1..]
            .iter()
            .take_while(|t| !t.is_op(";"))
            .find(|t| t.kind == TokenKind::String && t.is_terminated());
        if let Some(path) = path {
            let path = &path.text[1..path.text.len() - 1];
            imports.push(Import {
                path: path.to_string(),
                kind: ImportKind::of(path),
                line: lines.position(token.start).line,
            });
        }
    }
    imports
}

/// Imports of one file and the files importing it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileNode {
    /// All import statements of the file
    pub imports: Vec<Import>,
    /// Files in the graph this file imports
    pub dependencies: Vec<String>,
    /// Files in the graph importing this file
    pub imported_by: Vec<String>,
}

/// Import relationships between a set of files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    files: BTreeMap<String, FileNode>,
}

impl DependencyGraph {
    /// Build the graph from `(file path, source)` pairs
    ///
    /// A path given twice keeps the later source.
    pub fn build<I, N, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<str>,
    {
        let mut graph: BTreeMap<String, FileNode> = BTreeMap::new();
        for (name, source) in files {
            let name = name.into();
            let node = FileNode { imports: parse_imports(source.as_ref()), ..Default::default() };
            if graph.insert(name.clone(), node).is_some() {
                warn!(file = %name, "file given twice, keeping the later source");
            }
        }

        let mut by_file_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in graph.keys() {
            by_file_name.entry(file_name(name).to_string()).or_default().push(name.clone());
        }

        let mut edges = Vec::new();
        for (name, node) in &mut graph {
            for import in &node.imports {
                let Some(candidates) = by_file_name.get(import.file_name()) else { continue };
                let Some(target) = resolve(candidates, name, import) else { continue };
                if !node.dependencies.contains(target) {
                    node.dependencies.push(target.clone());
                    edges.push((name.clone(), target.clone()));
                }
            }
        }
        for (from, to) in edges {
            if let Some(node) = graph.get_mut(&to) {
                node.imported_by.push(from);
            }
        }

        debug!(files = graph.len(), "built dependency graph");
        Self { files: graph }
    }

    /// Node of a file
    pub fn get(&self, name: &str) -> Option<&FileNode> {
        self.files.get(name)
    }

    /// Files in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileNode)> {
        self.files.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Every circular dependency, once each
    ///
    /// A cycle is listed starting from its smallest file name, e.g.
    /// `["A.sol", "B.sol"]` for `A.sol -> B.sol -> A.sol`.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut found = BTreeSet::new();
        for start in self.files.keys() {
            let mut path = vec![start.as_str()];
            self.walk(&mut path, &mut found);
        }
        found.into_iter().collect()
    }

    fn walk<'a>(&'a self, path: &mut Vec<&'a str>, found: &mut BTreeSet<Vec<String>>) {
        let Some(current) = path.last().and_then(|name| self.files.get(*name)) else { return };
        for next in &current.dependencies {
            if let Some(pos) = path.iter().position(|name| *name == next.as_str()) {
                let cycle = &path[pos..];
                let min =
                    cycle.iter().enumerate().min_by_key(|(_, name)| **name).map_or(0, |(i, _)| i);
                let rotated =
                    cycle[min..].iter().chain(&cycle[..min]).map(|s| s.to_string()).collect();
                found.insert(rotated);
            } else if path[0] <= next.as_str() {
                // cycles through smaller names are found from their own start
                path.push(next);
                self.walk(path, found);
                path.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_imports() {
        let source = r#"// import "commented.sol";
import "./Base.sol";
import {IERC20} from "@openzeppelin/contracts/token/ERC20/IERC20.sol";
import * as Lib from "node_modules/lib/Lib.sol";
import 'contracts/Util.sol';
string constant s = "import \"no.sol\";";
"#;
        let imports = parse_imports(source);
        let summary: Vec<_> = imports.iter().map(|i| (i.path.as_str(), i.kind, i.line)).collect();
        assert_eq!(
            summary,
            vec![
                ("./Base.sol", ImportKind::Relative, 2),
                ("@openzeppelin/contracts/token/ERC20/IERC20.sol", ImportKind::Package, 3),
                ("node_modules/lib/Lib.sol", ImportKind::Package, 4),
                ("contracts/Util.sol", ImportKind::Absolute, 5),
            ]
        );
        assert_eq!(imports[1].file_name(), "IERC20.sol");
    }

    #[test]
    fn test_dependency_graph() {
        let graph = DependencyGraph::build([
            ("Token.sol", "import \"./Base.sol\";\nimport \"@oz/Missing.sol\";"),
            ("Base.sol", ""),
            ("Vault.sol", "import \"../Token.sol\";\nimport \"./Base.sol\";"),
        ]);

        let token = graph.get("Token.sol").unwrap();
        assert_eq!(token.imports.len(), 2);
        assert_eq!(token.dependencies, vec!["Base.sol"]);

        let base = graph.get("Base.sol").unwrap();
        assert_eq!(base.imported_by, vec!["Token.sol", "Vault.sol"]);
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn test_cycles() {
        let graph = DependencyGraph::build([
            ("A.sol", "import \"./B.sol\";"),
            ("B.sol", "import \"./C.sol\";"),
            ("C.sol", "import \"./A.sol\";"),
            ("D.sol", "import \"./D.sol\";\nimport \"./A.sol\";"),
        ]);
        assert_eq!(
            graph.cycles(),
            vec![
                vec!["A.sol".to_string(), "B.sol".to_string(), "C.sol".to_string()],
                vec!["D.sol".to_string()],
            ]
        );
    }

    #[test]
    fn test_duplicate_file_names() {
        let graph = DependencyGraph::build([
            ("a/Token.sol", "import \"./Base.sol\";"),
            ("b/Token.sol", "import \"./Base.sol\";"),
            ("a/Base.sol", ""),
            ("b/Base.sol", ""),
            ("c/User.sol", "import \"./Base.sol\";"),
            ("x/Main.sol", "import \"../a/Token.sol\";\nimport \"b/Token.sol\";"),
        ]);
        assert_eq!(graph.iter().count(), 6);

        assert_eq!(graph.get("a/Token.sol").unwrap().dependencies, vec!["a/Base.sol"]);
        assert_eq!(graph.get("b/Token.sol").unwrap().dependencies, vec!["b/Base.sol"]);
        // no `c/Base.sol` to pick, and neither candidate matches
        assert!(graph.get("c/User.sol").unwrap().dependencies.is_empty());
        assert_eq!(
            graph.get("x/Main.sol").unwrap().dependencies,
            vec!["a/Token.sol", "b/Token.sol"]
        );
        assert_eq!(graph.get("b/Base.sol").unwrap().imported_by, vec!["b/Token.sol"]);
    }
}
