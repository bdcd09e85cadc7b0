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

//! Physical plan skeletons. A candidate returned by enumeration is a
//! value: operator-specific fields, output schema, scaled statistics, and
//! one required property per child. Children are attached by the caller
//! after it has costed and picked winners; the only exception is the
//! index-join inner pipeline, which enumeration commits to up front.

use std::sync::Arc;

use tessera_common::Datum;
use tessera_expr::{ColumnRef, Expr, ScalarFunction, SchemaRef};

use crate::logical::{
    AggFuncDesc, IndexInfo, JoinType, LockType, OrderItem, TableInfo,
};
use crate::property::PhysicalProperty;
use crate::range_filter::ColumnWithComparisons;
use crate::ranger::Range;
use crate::statistics::StatsInfo;

#[derive(Debug, Clone)]
pub struct PhysicalMergeJoin {
    pub join_type: JoinType,
    pub left_keys: Vec<ColumnRef>,
    pub right_keys: Vec<ColumnRef>,
    pub left_conditions: Vec<Expr>,
    pub right_conditions: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
    pub default_values: Vec<Datum>,
}

#[derive(Debug, Clone)]
pub struct PhysicalHashJoin {
    pub join_type: JoinType,
    pub equal_conditions: Vec<ScalarFunction>,
    pub left_conditions: Vec<Expr>,
    pub right_conditions: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
    pub default_values: Vec<Datum>,
    /// Which child is materialized as the build side.
    pub inner_idx: usize,
    pub concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct PhysicalIndexJoin {
    pub join_type: JoinType,
    /// Which child drives the lookups.
    pub outer_idx: usize,
    pub outer_join_keys: Vec<ColumnRef>,
    pub inner_join_keys: Vec<ColumnRef>,
    /// `key_off_to_idx_off[i]` is the index-column position matched by
    /// `inner_join_keys[i]`.
    pub key_off_to_idx_off: Vec<usize>,
    pub left_conditions: Vec<Expr>,
    pub right_conditions: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
    pub default_values: Vec<Datum>,
    /// Scan-range template; join-key point slots are placeholders filled
    /// per outer row.
    pub ranges: Vec<Range>,
    /// Outer-driven bounds on the next index column, when any.
    pub compare_filters: Option<ColumnWithComparisons>,
    /// The committed inner lookup pipeline.
    pub inner_plan: Box<PhysicalPlan>,
}

#[derive(Debug, Clone)]
pub struct PhysicalApply {
    pub join: PhysicalHashJoin,
    pub corr_cols: Vec<ColumnRef>,
}

#[derive(Debug, Clone)]
pub struct PhysicalTableScan {
    pub table: Arc<TableInfo>,
    pub ranges: Vec<Range>,
    pub filters: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct PhysicalIndexScan {
    pub table: Arc<TableInfo>,
    pub index: Arc<IndexInfo>,
    pub ranges: Vec<Range>,
    pub filters: Vec<Expr>,
    /// Whether the index alone produces every needed column; when false a
    /// companion table lookup is required.
    pub covering: bool,
}

#[derive(Debug, Clone)]
pub struct PhysicalAggregation {
    pub group_by_items: Vec<Expr>,
    pub agg_funcs: Vec<AggFuncDesc>,
}

/// Operator-specific payload of a [PhysicalPlan].
#[derive(Debug, Clone)]
pub enum PhysicalOperator {
    MergeJoin(PhysicalMergeJoin),
    HashJoin(PhysicalHashJoin),
    IndexJoin(PhysicalIndexJoin),
    Apply(PhysicalApply),
    Selection { conditions: Vec<Expr> },
    Projection { exprs: Vec<Expr> },
    Limit { offset: u64, count: u64 },
    TopN { by_items: Vec<OrderItem>, offset: u64, count: u64 },
    Sort { by_items: Vec<OrderItem> },
    /// A sort that is known to be satisfied by the child's ordering and
    /// performs no work.
    NominalSort,
    UnionAll,
    Lock { lock: LockType },
    MaxOneRow,
    UnionScan { conditions: Vec<Expr> },
    TableScan(PhysicalTableScan),
    IndexScan(PhysicalIndexScan),
    /// Pairs a non-covering index scan with the table lookup that fetches
    /// the remaining columns; children are `[index side, table side]`.
    IndexLookUp,
    HashAgg(PhysicalAggregation),
    StreamAgg(PhysicalAggregation),
}

impl PhysicalOperator {
    /// The number of children this operator takes, when fixed by the
    /// operator kind. Union is n-ary.
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            PhysicalOperator::MergeJoin(_)
            | PhysicalOperator::HashJoin(_)
            | PhysicalOperator::IndexJoin(_)
            | PhysicalOperator::Apply(_)
            | PhysicalOperator::IndexLookUp => Some(2),
            PhysicalOperator::TableScan(_) | PhysicalOperator::IndexScan(_) => Some(0),
            PhysicalOperator::UnionAll => None,
            _ => Some(1),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PhysicalOperator::MergeJoin(_) => "MergeJoin",
            PhysicalOperator::HashJoin(_) => "HashJoin",
            PhysicalOperator::IndexJoin(_) => "IndexJoin",
            PhysicalOperator::Apply(_) => "Apply",
            PhysicalOperator::Selection { .. } => "Selection",
            PhysicalOperator::Projection { .. } => "Projection",
            PhysicalOperator::Limit { .. } => "Limit",
            PhysicalOperator::TopN { .. } => "TopN",
            PhysicalOperator::Sort { .. } => "Sort",
            PhysicalOperator::NominalSort => "NominalSort",
            PhysicalOperator::UnionAll => "UnionAll",
            PhysicalOperator::Lock { .. } => "Lock",
            PhysicalOperator::MaxOneRow => "MaxOneRow",
            PhysicalOperator::UnionScan { .. } => "UnionScan",
            PhysicalOperator::TableScan(_) => "TableScan",
            PhysicalOperator::IndexScan(_) => "IndexScan",
            PhysicalOperator::IndexLookUp => "IndexLookUp",
            PhysicalOperator::HashAgg(_) => "HashAgg",
            PhysicalOperator::StreamAgg(_) => "StreamAgg",
        }
    }
}

/// One enumerated candidate.
#[derive(Debug, Clone)]
pub struct PhysicalPlan {
    pub op: PhysicalOperator,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
    /// What each child must guarantee, one entry per child.
    pub children_req_props: Vec<PhysicalProperty>,
    /// Filled by the caller once winners are picked; pre-filled only for
    /// committed inner lookup pipelines.
    pub children: Vec<PhysicalPlan>,
}

impl PhysicalPlan {
    pub fn new(
        op: PhysicalOperator,
        schema: SchemaRef,
        stats: StatsInfo,
        children_req_props: Vec<PhysicalProperty>,
    ) -> Self {
        debug_assert!(op
            .fixed_arity()
            .map_or(true, |n| n == children_req_props.len()));
        PhysicalPlan {
            op,
            schema,
            stats,
            children_req_props,
            children: vec![],
        }
    }

    pub fn with_child(mut self, child: PhysicalPlan) -> Self {
        self.children.push(child);
        self
    }

    pub fn arity(&self) -> usize {
        self.children_req_props.len()
    }
}
