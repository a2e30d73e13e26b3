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

//! Configuration system for Solide
//!
//! Manages user preferences for the formatter, the linter and the gas
//! estimator. Values are plain immutable data handed to the engine; nothing
//! here is global or mutable at runtime.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor and formatter settings
    pub editor: EditorConfig,
    /// Lint engine settings
    pub lint: LintConfig,
    /// Gas estimation weights
    pub gas: GasCosts,
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of a tab character when measuring leading whitespace
    pub tab_size: usize,
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Strip trailing whitespace when formatting
    pub trim_trailing_whitespace: bool,
}

/// Lint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Rule codes that should not run
    pub disabled_rules: Vec<String>,
    /// How many leading lines are searched for the SPDX and pragma headers
    pub header_scan_lines: usize,
    /// Numeric literals that are never reported as magic numbers
    pub magic_number_allowlist: Vec<String>,
}

/// Weights used by the gas estimation heuristic
///
/// The numbers are rough per-operation costs, not exact EVM accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasCosts {
    /// Flat overhead of calling a state-changing function
    pub base: u64,
    /// Flat overhead of a `view` or `pure` function
    pub view_base: u64,
    /// Assignment to a state variable
    pub storage_write: u64,
    /// Assignment to a local or memory variable
    pub memory_write: u64,
    /// Each `for`, `while` or `do` loop
    pub loop_cost: u64,
    /// Extra cost for a loop without a literal bound
    pub unbounded_loop_penalty: u64,
    /// Low-level call, send or transfer
    pub external_call: u64,
    /// Each `emit`
    pub event: u64,
    /// Each `new Contract(...)`
    pub contract_creation: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { tab_size: 4, indent_width: 4, trim_trailing_whitespace: true }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            header_scan_lines: 10,
            magic_number_allowlist: vec!["0".to_string(), "1".to_string()],
        }
    }
}

impl Default for GasCosts {
    fn default() -> Self {
        Self {
            base: 21_000,
            view_base: 2_100,
            storage_write: 20_000,
            memory_write: 100,
            loop_cost: 5_000,
            unbounded_loop_penalty: 10_000,
            external_call: 10_000,
            event: 1_500,
            contract_creation: 32_000,
        }
    }
}

impl LintConfig {
    /// Whether the rule with the given code is enabled
    pub fn is_enabled(&self, code: &str) -> bool {
        !self.disabled_rules.iter().any(|rule| rule == code)
    }
}

impl Config {
    /// Get the default config file path (~/.solide.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".solide.toml"))
    }

    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found, creating default at {:?}", config_path);
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text; missing keys take their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file as TOML")
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved configuration to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[editor]\nindent_width = 2\n").unwrap();
        assert_eq!(config.editor.indent_width, 2);
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.lint, LintConfig::default());
        assert_eq!(config.gas, GasCosts::default());
    }

    #[test]
    fn test_disabled_rules() {
        let config =
            Config::from_toml("[lint]\ndisabled_rules = [\"magic-number\"]\n").unwrap();
        assert!(!config.lint.is_enabled("magic-number"));
        assert!(config.lint.is_enabled("reentrancy"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("[gas\nbase = ").is_err());
    }
}
