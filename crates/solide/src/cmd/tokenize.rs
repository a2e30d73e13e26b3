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

//! Token stream dump

use eyre::Result;
use solide_engine::{tokenize as lex, LineIndex, TokenKind};
use std::{path::Path, process::ExitCode};

use crate::{
    utils::{print_json, read_source},
    Cli,
};

/// Print every non-whitespace token with its category, style and position
pub fn tokenize(cli: &Cli, file: &Path) -> Result<ExitCode> {
    let source = read_source(file)?;
    let tokens = lex(&source);

    if cli.json {
        print_json(&tokens)?;
        return Ok(ExitCode::SUCCESS);
    }

    let lines = LineIndex::new(&source);
    for token in tokens.iter().filter(|t| t.kind != TokenKind::Whitespace) {
        let position = lines.position(token.start);
        let location = format!("{}:{}", position.line, position.column);
        println!(
            "{location:<9} {:<10} {:<18} {:?}",
            token.kind.as_str(),
            token.style().class_name(),
            token.text
        );
    }
    Ok(ExitCode::SUCCESS)
}
