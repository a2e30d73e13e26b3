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

//! Solide - Solidity analysis toolkit
//!
//! Command-line front end for the Solide analysis engine.

use clap::{Parser, Subcommand};
use eyre::Result;
use solide_common::{logging, Config};
use std::{path::PathBuf, process::ExitCode};
use tracing::Level;

mod cmd;
mod utils;

/// Command-line interface for Solide
#[derive(Debug, Parser)]
#[command(name = "solide")]
#[command(
    about = "Solide - Static analysis for Solidity: highlighting, linting, gas estimation and formatting"
)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ~/.solide.toml, created on first use)
    #[arg(long, global = true, env = "SOLIDE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to a daily rolling file in the temp directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the token stream of a Solidity file
    Tokenize {
        /// Solidity source file
        file: PathBuf,
    },
    /// Print a Solidity file with syntax highlighting
    Highlight {
        /// Solidity source file
        file: PathBuf,
    },
    /// Print a per-line density minimap of a Solidity file
    Minimap {
        /// Solidity source file
        file: PathBuf,
    },
    /// Report lint issues; exits with status 1 when any error is found
    Lint {
        /// Solidity source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Estimate gas per function
    Gas {
        /// Solidity source file
        file: PathBuf,
    },
    /// Normalize indentation and trailing whitespace
    Fmt(cmd::FmtArgs),
    /// Show imports and circular dependencies between files
    Imports {
        /// Solidity source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Create a contract from a template
    New {
        /// Template identifier (see `solide templates`)
        template: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the built-in contract templates
    Templates,
}

fn main() -> Result<ExitCode> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    logging::init_logging("solide", level, cli.log_file)?;

    match &cli.command {
        Commands::Tokenize { file } => cmd::tokenize(&cli, file),
        Commands::Highlight { file } => cmd::highlight(&cli, file),
        Commands::Minimap { file } => cmd::minimap(&cli, file),
        Commands::Lint { files } => cmd::lint(&cli, &load_config(&cli)?, files),
        Commands::Gas { file } => cmd::gas(&cli, &load_config(&cli)?, file),
        Commands::Fmt(args) => cmd::fmt(&load_config(&cli)?, args),
        Commands::Imports { files } => cmd::imports(&cli, files),
        Commands::New { template, output } => cmd::new_contract(template, output.as_deref()),
        Commands::Templates => cmd::list_templates(&cli),
    }
}

/// Load the configuration named on the command line, or the default one
fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Using configuration from {}", path.display());
            Config::load_from(path)
        }
        None => Config::load(),
    }
}
