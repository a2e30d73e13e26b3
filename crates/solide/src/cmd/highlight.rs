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

//! Terminal rendering: ANSI highlighting and the minimap

use eyre::Result;
use serde_json::json;
use solide_engine::{
    highlight_ansi,
    syntax::minimap::{minimap as summarize, MINIMAP_COLUMNS},
    tokenize,
};
use std::{path::Path, process::ExitCode};

use crate::{
    utils::{print_json, read_source},
    Cli,
};

/// Width of a full minimap bar in terminal cells
const BAR_WIDTH: usize = 40;

/// Print the source with ANSI colors, or its styled spans with `--json`
pub fn highlight(cli: &Cli, file: &Path) -> Result<ExitCode> {
    let source = read_source(file)?;

    if cli.json {
        let spans: Vec<_> = tokenize(&source)
            .iter()
            .map(|token| json!({ "style": token.style(), "text": token.text }))
            .collect();
        print_json(&spans)?;
    } else {
        print!("{}", highlight_ansi(&source));
    }
    Ok(ExitCode::SUCCESS)
}

/// Print one density bar per line, colored by the line's dominant style
pub fn minimap(cli: &Cli, file: &Path) -> Result<ExitCode> {
    let source = read_source(file)?;
    let rows = summarize(&source);

    if cli.json {
        print_json(&rows)?;
        return Ok(ExitCode::SUCCESS);
    }

    let scale = BAR_WIDTH as f32 / MINIMAP_COLUMNS as f32;
    for (index, row) in rows.iter().enumerate() {
        let offset = ((row.indent.min(MINIMAP_COLUMNS) as f32) * scale) as usize;
        let filled = (row.density * BAR_WIDTH as f32).ceil() as usize;
        let bar = "▆".repeat(filled.min(BAR_WIDTH - offset.min(BAR_WIDTH)));
        println!(
            "{:>4} {}\x1b[{}m{bar}\x1b[0m",
            index + 1,
            " ".repeat(offset),
            row.style.ansi()
        );
    }
    Ok(ExitCode::SUCCESS)
}
