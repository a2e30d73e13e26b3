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

//! Gas estimation heuristic
//!
//! Every function with a body gets a flat base cost (reduced for `view` and
//! `pure`) plus fixed weights for each storage write, memory write, loop,
//! external call, event emission and contract creation found in its body.
//! The numbers are relative indicators, not EVM gas.

use crate::{
    outline::{find_matching, is_external_call, is_write, write_target, FunctionDecl, Outline},
    source::LineIndex,
    syntax::{tokenize, Token, TokenKind},
};
use itertools::Itertools;
use serde::Serialize;
use solide_common::GasCosts;
use std::{collections::HashSet, fmt};
use tracing::{debug, trace};

/// Display bands for an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GasBand {
    /// 30000 or less
    Low,
    /// Above 30000
    Medium,
    /// Above 50000
    High,
    /// Above 100000
    VeryHigh,
}

impl GasBand {
    /// Band thresholds, highest first
    pub const THRESHOLDS: [(u64, Self); 3] =
        [(100_000, Self::VeryHigh), (50_000, Self::High), (30_000, Self::Medium)];

    /// Band of a gas amount
    pub fn classify(gas: u64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(threshold, _)| gas > *threshold)
            .map_or(Self::Low, |(_, band)| *band)
    }

    /// Kebab-case name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for GasBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pattern counts found in one function body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GasBreakdown {
    /// `view`/`pure` functions get the reduced base
    pub read_only: bool,
    /// Writes whose target is a mutable state variable
    pub storage_writes: u64,
    /// All other writes, including local declarations with initialisers
    pub memory_writes: u64,
    /// `for` and `while` loops (a `do ... while` counts once)
    pub loops: u64,
    /// Loops whose header never compares against a numeric literal
    pub unbounded_loops: u64,
    /// `.call`, `.delegatecall`, `.staticcall`, `.send` and `.transfer`
    pub external_calls: u64,
    /// `emit` statements
    pub events: u64,
    /// `new Contract(...)` expressions
    pub contract_creations: u64,
}

impl GasBreakdown {
    /// Weighted sum under `costs`
    pub fn total(&self, costs: &GasCosts) -> u64 {
        let base = if self.read_only { costs.view_base } else { costs.base };
        [
            (self.storage_writes, costs.storage_write),
            (self.memory_writes, costs.memory_write),
            (self.loops, costs.loop_cost),
            (self.unbounded_loops, costs.unbounded_loop_penalty),
            (self.external_calls, costs.external_call),
            (self.events, costs.event),
            (self.contract_creations, costs.contract_creation),
        ]
        .into_iter()
        .fold(base, |acc, (count, weight)| acc.saturating_add(count.saturating_mul(weight)))
    }
}

/// Estimate for one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionGas {
    /// Mapping key: the function name, or its signature when the name is overloaded
    pub name: String,
    /// Estimated gas units
    pub gas: u64,
    /// 1-based line of the function name
    pub line: usize,
    /// Counts behind the estimate
    pub breakdown: GasBreakdown,
}

impl FunctionGas {
    /// Display band of this estimate
    pub fn band(&self) -> GasBand {
        GasBand::classify(self.gas)
    }
}

/// Per-function estimates with unique keys, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GasEstimate {
    functions: Vec<FunctionGas>,
}

impl GasEstimate {
    /// Estimate for the given key
    pub fn get(&self, name: &str) -> Option<u64> {
        self.functions.iter().find(|f| f.name == name).map(|f| f.gas)
    }

    /// Sum of all estimates
    pub fn total(&self) -> u64 {
        self.functions.iter().fold(0u64, |acc, f| acc.saturating_add(f.gas))
    }

    /// Number of estimated functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function was estimated
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Estimates in source order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionGas> {
        self.functions.iter()
    }

    /// Estimate keys in source order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|f| f.name.as_str())
    }

    fn insert(&mut self, entry: FunctionGas) {
        match self.functions.iter_mut().find(|f| f.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.functions.push(entry),
        }
    }
}

impl<'a> IntoIterator for &'a GasEstimate {
    type Item = &'a FunctionGas;
    type IntoIter = std::slice::Iter<'a, FunctionGas>;

    fn into_iter(self) -> Self::IntoIter {
        self.functions.iter()
    }
}

/// Applies the weight table to source text
#[derive(Debug, Clone, Default)]
pub struct GasEstimator {
    costs: GasCosts,
}

impl GasEstimator {
    /// Create an estimator with the given weights
    pub fn new(costs: GasCosts) -> Self {
        Self { costs }
    }

    /// Weights in use
    pub fn costs(&self) -> &GasCosts {
        &self.costs
    }

    /// Estimate every function with a body in `source`
    pub fn estimate(&self, source: &str) -> GasEstimate {
        let tokens = tokenize(source);
        let outline = Outline::scan(source, &tokens);
        let lines = LineIndex::new(source);
        let state = outline.mutable_state_names();

        let functions: Vec<&FunctionDecl<'_>> =
            outline.functions.iter().filter(|f| f.body.is_some()).collect();
        let overloaded: HashSet<&str> = functions
            .iter()
            .into_group_map_by(|f| f.name)
            .into_iter()
            .filter(|(_, group)| group.iter().map(|f| f.signature()).unique().count() > 1)
            .map(|(name, _)| name)
            .collect();

        let mut estimate = GasEstimate::default();
        for function in functions {
            let mut breakdown = scan_body(outline.body_tokens(function), &state);
            breakdown.read_only = function.mutability.is_read_only();
            let name = if overloaded.contains(function.name) {
                function.signature()
            } else {
                function.name.to_string()
            };
            let gas = breakdown.total(&self.costs);
            trace!(function = %name, gas, ?breakdown, "estimated function");
            estimate.insert(FunctionGas {
                name,
                gas,
                line: lines.position(function.offset).line,
                breakdown,
            });
        }

        debug!(functions = estimate.len(), total = estimate.total(), "gas estimation complete");
        estimate
    }
}

/// Count the weighted patterns in one body
fn scan_body(body: &[Token<'_>], state: &HashSet<&str>) -> GasBreakdown {
    let mut breakdown = GasBreakdown::default();

    for (idx, token) in body.iter().enumerate() {
        if is_write(token) {
            if write_target(body, idx).is_some_and(|target| state.contains(target.text)) {
                breakdown.storage_writes += 1;
            } else {
                breakdown.memory_writes += 1;
            }
        }

        if token.is_keyword("for") || token.is_keyword("while") {
            breakdown.loops += 1;
            if !has_literal_bound(body, idx + 1) {
                breakdown.unbounded_loops += 1;
            }
        } else if token.is_keyword("emit") {
            breakdown.events += 1;
        } else if token.is_keyword("new")
            && body.get(idx + 1).is_some_and(|next| {
                next.kind != TokenKind::Type && next.text.starts_with(|c: char| c.is_ascii_uppercase())
            })
        {
            breakdown.contract_creations += 1;
        } else if is_external_call(body, idx) {
            breakdown.external_calls += 1;
        }
    }

    breakdown
}

/// Whether the loop header opening at `open` compares against a number
fn has_literal_bound(body: &[Token<'_>], open: usize) -> bool {
    if !body.get(open).is_some_and(|t| t.is_op("(")) {
        return false;
    }
    let close = find_matching(body, open, "(", ")").unwrap_or(body.len());
    let header = &body[open..close];
    header.iter().tuple_windows().any(|(a, b)| {
        (is_comparison(a) && b.kind == TokenKind::Number)
            || (a.kind == TokenKind::Number && is_comparison(b))
    })
}

fn is_comparison(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Operator && matches!(token.text, "<" | ">" | "<=" | ">=" | "!=")
}

/// Estimate `source` with the default weights
pub fn estimate_gas(source: &str) -> GasEstimate {
    GasEstimator::default().estimate(source)
}
