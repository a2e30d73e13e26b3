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

//! Command implementations for the Solide CLI

pub mod fmt;
pub mod gas;
pub mod highlight;
pub mod imports;
pub mod lint;
pub mod templates;
pub mod tokenize;

pub use fmt::{fmt, FmtArgs};
pub use gas::gas;
pub use highlight::{highlight, minimap};
pub use imports::imports;
pub use lint::lint;
pub use templates::{list_templates, new_contract};
pub use tokenize::tokenize;
