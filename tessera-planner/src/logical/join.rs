// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::Arc;

use tessera_common::Datum;
use tessera_expr::{ColumnRef, Expr, ScalarFunction, SchemaRef};

use crate::logical::LogicalPlan;
use crate::statistics::StatsInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    Semi,
    AntiSemi,
    LeftOuterSemi,
    AntiLeftOuterSemi,
}

/// Join algorithm hints from the statement text. More than one flag can be
/// set when the user pinned different algorithms on different joins of the
/// same query block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinHints {
    pub merge_join: bool,
    pub hash_join: bool,
    /// Force an index join driven by the left child (right side looked up).
    pub left_as_index_outer: bool,
    /// Force an index join driven by the right child.
    pub right_as_index_outer: bool,
}

/// A logical join whose equality conjuncts have been split out upstream.
/// `equal_conditions[i]` is `left_join_keys()[i] = right_join_keys()[i]`.
#[derive(Debug, Clone)]
pub struct LogicalJoin {
    pub join_type: JoinType,
    pub equal_conditions: Vec<ScalarFunction>,
    pub left_conditions: Vec<Expr>,
    pub right_conditions: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
    /// Values emitted for the inner side of an outer join when no match
    /// exists.
    pub default_values: Vec<Datum>,
    pub hints: JoinHints,
    /// Orderings each child could plausibly deliver, precomputed by logical
    /// analysis.
    pub left_properties: Vec<Vec<ColumnRef>>,
    pub right_properties: Vec<Vec<ColumnRef>>,
    pub left: Arc<LogicalPlan>,
    pub right: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

impl LogicalJoin {
    pub fn left_join_keys(&self) -> Vec<ColumnRef> {
        self.equal_conditions
            .iter()
            .filter_map(|f| f.arg_column(0).cloned())
            .collect()
    }

    pub fn right_join_keys(&self) -> Vec<ColumnRef> {
        self.equal_conditions
            .iter()
            .filter_map(|f| f.arg_column(1).cloned())
            .collect()
    }

    pub fn child(&self, idx: usize) -> &LogicalPlan {
        if idx == 0 {
            &self.left
        } else {
            &self.right
        }
    }
}
