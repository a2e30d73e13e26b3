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

//! Contract templates

use eyre::{bail, eyre, Context, Result};
use serde_json::json;
use solide_common::{find_template, TEMPLATES};
use std::{fs, path::Path, process::ExitCode};
use tracing::info;

use crate::{utils::print_json, Cli};

/// Emit a template to stdout, or to `output` when given
pub fn new_contract(id: &str, output: Option<&Path>) -> Result<ExitCode> {
    let template = find_template(id)
        .ok_or_else(|| eyre!("Unknown template `{id}`; run `solide templates` to list them"))?;

    let Some(path) = output else {
        print!("{}", template.code);
        return Ok(ExitCode::SUCCESS);
    };

    if path.exists() {
        bail!("Refusing to overwrite existing file: {}", path.display());
    }
    fs::write(path, template.code)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(template = template.id, "Created {}", path.display());
    println!("✨ Created {} from the {} template", path.display(), template.name);
    Ok(ExitCode::SUCCESS)
}

/// List the built-in templates
pub fn list_templates(cli: &Cli) -> Result<ExitCode> {
    if cli.json {
        let templates: Vec<_> = TEMPLATES
            .iter()
            .map(|t| json!({ "id": t.id, "name": t.name, "description": t.description }))
            .collect();
        print_json(&templates)?;
        return Ok(ExitCode::SUCCESS);
    }

    for template in TEMPLATES {
        println!("{:<16} {:<18} {}", template.id, template.name, template.description);
    }
    Ok(ExitCode::SUCCESS)
}
