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

//! Import listing and cycle detection across files

use eyre::Result;
use serde_json::json;
use solide_engine::{DependencyGraph, ImportKind};
use std::{path::PathBuf, process::ExitCode};

use crate::{
    utils::{print_json, read_source},
    Cli,
};

fn kind_label(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Relative => "relative",
        ImportKind::Package => "package",
        ImportKind::Absolute => "absolute",
    }
}

/// Print each file's imports and every circular dependency among the files
pub fn imports(cli: &Cli, files: &[PathBuf]) -> Result<ExitCode> {
    let sources = files
        .iter()
        .map(|file| -> Result<(String, String)> {
            Ok((file.display().to_string(), read_source(file)?))
        })
        .collect::<Result<Vec<_>>>()?;
    let graph = DependencyGraph::build(sources.iter().map(|(name, source)| (name.as_str(), source)));
    let cycles = graph.cycles();

    if cli.json {
        print_json(&json!({ "files": graph, "cycles": cycles }))?;
        return Ok(ExitCode::SUCCESS);
    }

    for (name, node) in graph.iter() {
        println!("📄 {name}");
        if node.imports.is_empty() {
            println!("    (no imports)");
        }
        for import in &node.imports {
            println!("    {:>4}  {:<8}  {}", import.line, kind_label(import.kind), import.path);
        }
        if !node.imported_by.is_empty() {
            println!("    imported by: {}", node.imported_by.join(", "));
        }
    }

    for cycle in &cycles {
        let mut chain = cycle.clone();
        if let Some(first) = cycle.first() {
            chain.push(first.clone());
        }
        println!("🔁 Circular dependency: {}", chain.join(" -> "));
    }
    Ok(ExitCode::SUCCESS)
}
