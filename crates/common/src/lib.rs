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

//! Solide Common - Shared functionality for Solide components
//!
//! This crate provides the pieces shared by the analysis engine and the
//! command-line front end: logging setup, user configuration and the
//! built-in contract templates.

/// User configuration (editor, lint and gas settings) persisted as TOML
pub mod config;
/// Logging setup and utilities for consistent logging across Solide components
pub mod logging;
/// Built-in Solidity contract templates
pub mod templates;

pub use config::*;
pub use templates::*;
