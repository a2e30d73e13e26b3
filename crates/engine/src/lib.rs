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

//! Solide analysis engine
//!
//! Pure, synchronous passes over Solidity source text:
//!
//! - [`tokenize`]: lossless classification of every byte of the input
//! - [`lint`]: independent heuristic detectors producing [`LintIssue`]s
//! - [`estimate_gas`]: weighted per-function cost estimates
//! - [`format`] and [`optimize`]: line-based re-indentation
//!
//! None of these fail or panic on any input, and none keep state between
//! calls. Callers that need caching key it on the source text.

pub mod error;
pub use error::*;

pub mod format;
pub use format::{format, optimize, Formatter};

pub mod gas;
pub use gas::{estimate_gas, FunctionGas, GasBand, GasBreakdown, GasEstimate, GasEstimator};

pub mod imports;
pub use imports::{parse_imports, DependencyGraph, FileNode, Import, ImportKind};

pub mod lint;
pub use lint::{lint, LintIssue, Linter, Severity};

pub mod outline;
pub use outline::Outline;

pub mod source;
pub use source::{LineIndex, Position};

pub mod syntax;
pub use syntax::{highlight_ansi, tokenize, Token, TokenKind, TokenStyle};
