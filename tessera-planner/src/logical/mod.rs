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

//! The normalized logical operator tree the planner consumes. Logical
//! nodes are read-only to the enumeration core; they are produced upstream
//! by resolution and logical rewrites.

mod datasource;
mod join;

pub use datasource::{AccessPath, IndexColumn, IndexInfo, LogicalDataSource, TableInfo};
pub use join::{JoinHints, JoinType, LogicalJoin};

use std::sync::Arc;

use tessera_expr::{ColumnRef, Expr, SchemaRef};

use crate::statistics::StatsInfo;

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub desc: bool,
}

impl OrderItem {
    pub fn new(expr: Expr, desc: bool) -> Self {
        OrderItem { expr, desc }
    }

    pub fn asc(expr: Expr) -> Self {
        OrderItem { expr, desc: false }
    }
}

/// Aggregate evaluation mode. Partial/final pairs arise when an
/// aggregation has been split across task boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggMode {
    Complete,
    Partial,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFuncKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    FirstRow,
}

/// One aggregate function call.
#[derive(Debug, Clone, PartialEq)]
pub struct AggFuncDesc {
    pub kind: AggFuncKind,
    pub args: Vec<Expr>,
    pub mode: AggMode,
}

/// Row-lock strength for SELECT ... FOR UPDATE / LOCK IN SHARE MODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockType {
    ForUpdate,
    InShareMode,
}

/// A logical operator. Every variant carries its output schema, derived
/// statistics, and its children.
#[derive(Debug, Clone)]
pub enum LogicalPlan {
    Join(LogicalJoin),
    Projection(LogicalProjection),
    Selection(LogicalSelection),
    Aggregation(LogicalAggregation),
    Sort(LogicalSort),
    TopN(LogicalTopN),
    Limit(LogicalLimit),
    UnionAll(LogicalUnionAll),
    Lock(LogicalLock),
    MaxOneRow(LogicalMaxOneRow),
    Apply(LogicalApply),
    UnionScan(LogicalUnionScan),
    DataSource(LogicalDataSource),
}

#[derive(Debug, Clone)]
pub struct LogicalProjection {
    pub exprs: Vec<Expr>,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalSelection {
    pub conditions: Vec<Expr>,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalAggregation {
    pub group_by_items: Vec<Expr>,
    pub agg_funcs: Vec<AggFuncDesc>,
    /// Orderings the child could plausibly produce, precomputed by logical
    /// analysis; stream aggregation picks from these.
    pub possible_properties: Vec<Vec<ColumnRef>>,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

impl LogicalAggregation {
    /// The GROUP BY columns when every item is a plain column.
    pub fn group_by_cols(&self) -> Option<Vec<ColumnRef>> {
        self.group_by_items
            .iter()
            .map(|e| e.as_column().cloned())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct LogicalSort {
    pub by_items: Vec<OrderItem>,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalTopN {
    pub by_items: Vec<OrderItem>,
    pub offset: u64,
    pub count: u64,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalLimit {
    pub offset: u64,
    pub count: u64,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalUnionAll {
    pub inputs: Vec<Arc<LogicalPlan>>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalLock {
    pub lock: LockType,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

#[derive(Debug, Clone)]
pub struct LogicalMaxOneRow {
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

/// A correlated subquery execution point. The embedded join describes the
/// rewritten inner/outer relationship; the correlated columns are the outer
/// columns the inner side reads per driving row.
#[derive(Debug, Clone)]
pub struct LogicalApply {
    pub join: LogicalJoin,
    pub corr_cols: Vec<ColumnRef>,
}

/// Merges uncommitted in-transaction changes over a base scan. Opaque to
/// the planner apart from wrapping.
#[derive(Debug, Clone)]
pub struct LogicalUnionScan {
    pub conditions: Vec<Expr>,
    pub input: Arc<LogicalPlan>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

impl LogicalPlan {
    pub fn schema(&self) -> &SchemaRef {
        match self {
            LogicalPlan::Join(p) => &p.schema,
            LogicalPlan::Projection(p) => &p.schema,
            LogicalPlan::Selection(p) => &p.schema,
            LogicalPlan::Aggregation(p) => &p.schema,
            LogicalPlan::Sort(p) => &p.schema,
            LogicalPlan::TopN(p) => &p.schema,
            LogicalPlan::Limit(p) => &p.schema,
            LogicalPlan::UnionAll(p) => &p.schema,
            LogicalPlan::Lock(p) => &p.schema,
            LogicalPlan::MaxOneRow(p) => &p.schema,
            LogicalPlan::Apply(p) => &p.join.schema,
            LogicalPlan::UnionScan(p) => &p.schema,
            LogicalPlan::DataSource(p) => &p.schema,
        }
    }

    pub fn stats(&self) -> &StatsInfo {
        match self {
            LogicalPlan::Join(p) => &p.stats,
            LogicalPlan::Projection(p) => &p.stats,
            LogicalPlan::Selection(p) => &p.stats,
            LogicalPlan::Aggregation(p) => &p.stats,
            LogicalPlan::Sort(p) => &p.stats,
            LogicalPlan::TopN(p) => &p.stats,
            LogicalPlan::Limit(p) => &p.stats,
            LogicalPlan::UnionAll(p) => &p.stats,
            LogicalPlan::Lock(p) => &p.stats,
            LogicalPlan::MaxOneRow(p) => &p.stats,
            LogicalPlan::Apply(p) => &p.join.stats,
            LogicalPlan::UnionScan(p) => &p.stats,
            LogicalPlan::DataSource(p) => &p.stats,
        }
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Join(p) => vec![&p.left, &p.right],
            LogicalPlan::Apply(p) => vec![&p.join.left, &p.join.right],
            LogicalPlan::UnionAll(p) => p.inputs.iter().map(Arc::as_ref).collect(),
            LogicalPlan::Projection(p) => vec![&p.input],
            LogicalPlan::Selection(p) => vec![&p.input],
            LogicalPlan::Aggregation(p) => vec![&p.input],
            LogicalPlan::Sort(p) => vec![&p.input],
            LogicalPlan::TopN(p) => vec![&p.input],
            LogicalPlan::Limit(p) => vec![&p.input],
            LogicalPlan::Lock(p) => vec![&p.input],
            LogicalPlan::MaxOneRow(p) => vec![&p.input],
            LogicalPlan::UnionScan(p) => vec![&p.input],
            LogicalPlan::DataSource(_) => vec![],
        }
    }
}
