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

//! Formatting command

use clap::Args;
use eyre::{Context, Result};
use solide_common::Config;
use solide_engine::Formatter;
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::info;

use crate::utils::read_source;

/// Arguments for `solide fmt`
#[derive(Debug, Args)]
pub struct FmtArgs {
    /// Solidity source file
    pub file: PathBuf,

    /// Rewrite the file in place
    #[arg(long)]
    pub write: bool,

    /// Exit with status 1 if the file is not formatted
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Also rewrite counted loops to use an unchecked increment
    #[arg(long)]
    pub optimize: bool,
}

/// Format a file, printing the result unless `--write` or `--check` is given
pub fn fmt(config: &Config, args: &FmtArgs) -> Result<ExitCode> {
    let source = read_source(&args.file)?;
    let formatter = Formatter::new(config.editor.clone());
    let formatted =
        if args.optimize { formatter.optimize(&source) } else { formatter.format(&source) };
    let changed = formatted != source;

    if args.check {
        if changed {
            println!("{} would be reformatted", args.file.display());
            return Ok(ExitCode::FAILURE);
        }
        println!("{} is formatted", args.file.display());
        return Ok(ExitCode::SUCCESS);
    }

    if args.write {
        if changed {
            fs::write(&args.file, &formatted)
                .with_context(|| format!("Failed to write {}", args.file.display()))?;
            info!("Rewrote {}", args.file.display());
            println!("✨ Formatted {}", args.file.display());
        } else {
            println!("{} is already formatted", args.file.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    print!("{formatted}");
    Ok(ExitCode::SUCCESS)
}
