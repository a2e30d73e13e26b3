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

//! Lint reporting

use eyre::Result;
use serde_json::json;
use solide_common::Config;
use solide_engine::{LineIndex, LintIssue, Linter, Position, Severity};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::debug;

use crate::{
    utils::{print_json, read_source},
    Cli,
};

/// Lint every file; the exit status is 1 when any error-severity issue was found
pub fn lint(cli: &Cli, config: &Config, files: &[PathBuf]) -> Result<ExitCode> {
    let linter = Linter::new(config.lint.clone());
    let mut has_errors = false;
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let source = read_source(file)?;
        let issues = linter.lint(&source);
        debug!(file = %file.display(), issues = issues.len(), "linted file");
        has_errors |= issues.iter().any(|issue| issue.severity == Severity::Error);

        if cli.json {
            reports.push(json!({ "file": file.display().to_string(), "issues": issues }));
        } else {
            print_report(file, &source, &issues);
        }
    }

    if cli.json {
        print_json(&reports)?;
    }
    Ok(if has_errors { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️ ",
        Severity::Info => "ℹ️ ",
    }
}

fn print_report(file: &Path, source: &str, issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ {}: no issues found", file.display());
        return;
    }

    println!("📄 {}", file.display());
    let lines = LineIndex::new(source);
    for issue in issues {
        println!(
            "{} {} [{}] {} (Line {}, Column {})",
            severity_icon(issue.severity),
            issue.severity,
            issue.code.unwrap_or("-"),
            issue.message,
            issue.line,
            issue.column
        );
        print!("{}", lines.code_context(Position { line: issue.line, column: issue.column }, 1));
    }

    let count =
        |severity: Severity| issues.iter().filter(|issue| issue.severity == severity).count();
    println!(
        "{}: {} error(s), {} warning(s), {} info",
        file.display(),
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    );
}
