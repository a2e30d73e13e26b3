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

//! Gas estimate report

use eyre::Result;
use serde_json::json;
use solide_common::Config;
use solide_engine::GasEstimator;
use std::{path::Path, process::ExitCode};

use crate::{
    utils::{print_json, read_source},
    Cli,
};

/// Print the per-function estimate with its band, followed by the total
pub fn gas(cli: &Cli, config: &Config, file: &Path) -> Result<ExitCode> {
    let source = read_source(file)?;
    let estimate = GasEstimator::new(config.gas).estimate(&source);

    if cli.json {
        let functions: Vec<_> = estimate
            .iter()
            .map(|function| {
                json!({
                    "name": function.name,
                    "gas": function.gas,
                    "band": function.band(),
                    "line": function.line,
                    "breakdown": function.breakdown,
                })
            })
            .collect();
        print_json(&json!({ "functions": functions, "total": estimate.total() }))?;
        return Ok(ExitCode::SUCCESS);
    }

    if estimate.is_empty() {
        println!("No functions with a body in {}", file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let width = estimate.names().map(str::len).max().unwrap_or(0).max("total".len());
    println!("⛽ Gas estimates for {}", file.display());
    for function in &estimate {
        println!(
            "  {:<width$}  {:>10}  {:<9}  line {}",
            function.name,
            function.gas,
            function.band(),
            function.line
        );
    }
    println!("  {:<width$}  {:>10}", "total", estimate.total());
    Ok(ExitCode::SUCCESS)
}
