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

use thiserror::Error;

/// Errors raised inside a single lint detector.
///
/// The lint engine never surfaces these to its caller: a failing detector is
/// logged and its contribution dropped.
#[derive(Debug, Error)]
pub enum LintError {
    /// A detector's regular expression failed to compile
    #[error("invalid detector pattern: {0}")]
    Pattern(regex::Error),

    /// A detector panicked while scanning
    #[error("detector `{code}` panicked: {message}")]
    Panicked {
        /// Code of the failing detector
        code: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },
}
