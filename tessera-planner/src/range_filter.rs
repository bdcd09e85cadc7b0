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

//! Deferred range construction for index lookups whose bounds depend on
//! the driving outer row.
//!
//! When an index join finds comparisons like `inner.c < outer.x + 1` on the
//! index column just past the equi-joined prefix, the range on that column
//! cannot be built at plan time. [ColumnWithComparisons] records the
//! comparisons unevaluated and re-materializes the ranges once an outer row
//! is known; it also exposes a row comparator so the executor can skip the
//! rebuild when consecutive outer rows bind the same values.

use std::cmp::Ordering;

use tessera_common::{Datum, Result};
use tessera_expr::{ColumnRef, Expr, Operator, Row};

use crate::ranger::{build_column_range, col_cmp_const, Range};
use crate::session::SessionContext;

/// The range-filter bundle for one index column. Kept as an explicit
/// struct, not a closure, so plans stay inspectable values.
#[derive(Debug, Clone, Default)]
pub struct ColumnWithComparisons {
    /// The index column being constrained.
    pub target_col: Option<ColumnRef>,
    /// Comparison operators, aligned with `op_args`.
    pub op_types: Vec<Operator>,
    /// Bound expressions over outer columns, evaluated per driving row.
    pub op_args: Vec<Expr>,
    /// Reusable constant slots the evaluated bounds are substituted into,
    /// one per comparison.
    pub tmp_constants: Vec<Datum>,
    /// Distinct outer columns read by any bound expression.
    pub affected_col_schema: Vec<ColumnRef>,
}

impl ColumnWithComparisons {
    pub fn new(target_col: ColumnRef) -> Self {
        ColumnWithComparisons {
            target_col: Some(target_col),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.op_types.is_empty()
    }

    /// Records one comparison `target_col op arg`. `affected_cols` are the
    /// outer columns `arg` reads; they extend the affected schema without
    /// duplicates.
    pub fn append_comparison(
        &mut self,
        op: Operator,
        arg: Expr,
        affected_cols: &[ColumnRef],
    ) {
        debug_assert!(op.is_range_comparison());
        self.op_types.push(op);
        self.op_args.push(arg);
        self.tmp_constants.push(Datum::Null);
        for col in affected_cols {
            if !self.affected_col_schema.contains(col) {
                self.affected_col_schema.push(col.clone());
            }
        }
    }

    /// Lexicographic comparison of two outer rows over the affected
    /// columns. Equal rows bind every bound expression to the same values,
    /// so the previous ranges can be reused.
    pub fn compare_row(&self, lhs: &Row, rhs: &Row) -> Ordering {
        for col in &self.affected_col_schema {
            let (l, r) = (lhs.value(col), rhs.value(col));
            match (l, r) {
                (Some(l), Some(r)) => match l.cmp(r) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
                // A column missing from either row sorts it first; the rows
                // then differ and the caller rebuilds.
                (None, None) => continue,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
            }
        }
        Ordering::Equal
    }

    /// Materializes the ranges on the target column for one outer row:
    /// every bound expression is evaluated, substituted into its constant
    /// slot, and the synthesized comparisons are handed to the range
    /// builder.
    pub fn build_ranges_by_row(
        &mut self,
        ctx: &SessionContext,
        outer_row: &Row,
    ) -> Result<Vec<Range>> {
        let Some(target) = &self.target_col else {
            return Ok(vec![]);
        };
        let mut conds = Vec::with_capacity(self.op_types.len());
        for (i, arg) in self.op_args.iter().enumerate() {
            self.tmp_constants[i] = arg.eval(outer_row)?;
            conds.push(col_cmp_const(
                self.op_types[i],
                target,
                self.tmp_constants[i].clone(),
            ));
        }
        build_column_range(ctx, &conds, target)
    }
}
