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

//! Builders shared by the planner's unit tests.

use std::sync::Arc;

use tessera_common::{DataType, Datum};
use tessera_expr::{Column, ColumnRef, Expr, Operator, Row, ScalarFunction, Schema, SchemaRef};

use crate::logical::{
    AccessPath, IndexColumn, IndexInfo, JoinType, LogicalDataSource, LogicalJoin,
    LogicalPlan, TableInfo,
};
use crate::statistics::{StatsInfo, TableStats};

pub(crate) fn typed_col(id: i64, name: &str, data_type: DataType) -> ColumnRef {
    Arc::new(Column::new(id, name, data_type))
}

pub(crate) fn col(id: i64, name: &str) -> ColumnRef {
    typed_col(id, name, DataType::Int)
}

pub(crate) fn schema_of(cols: &[&ColumnRef]) -> Schema {
    Schema::new(cols.iter().map(|c| (*c).clone()).collect())
}

pub(crate) fn schema_ref_of(cols: &[&ColumnRef]) -> SchemaRef {
    Arc::new(schema_of(cols))
}

pub(crate) fn row_of(cols: &[&ColumnRef], values: Vec<Datum>) -> Row {
    Row::new(schema_ref_of(cols), values)
}

pub(crate) fn stats(row_count: f64) -> StatsInfo {
    StatsInfo::new(row_count, vec![])
}

/// `left = right` the way upstream splits equi-conjuncts.
pub(crate) fn eq_cond(left: &ColumnRef, right: &ColumnRef) -> ScalarFunction {
    ScalarFunction {
        op: Operator::Eq,
        args: vec![Expr::column(left.clone()), Expr::column(right.clone())],
        ret_type: DataType::Int,
    }
}

pub(crate) struct DataSourceBuilder {
    columns: Vec<ColumnRef>,
    paths: Vec<AccessPath>,
    pushed_down_conds: Vec<Expr>,
    pk_is_handle: bool,
    row_count: f64,
    table_stats: Option<TableStats>,
}

pub(crate) fn data_source_builder(columns: Vec<ColumnRef>) -> DataSourceBuilder {
    DataSourceBuilder {
        columns,
        paths: vec![AccessPath::table()],
        pushed_down_conds: vec![],
        pk_is_handle: false,
        row_count: 1000.0,
        table_stats: None,
    }
}

impl DataSourceBuilder {
    pub(crate) fn index(
        mut self,
        id: i64,
        name: &str,
        offsets: &[usize],
        length: Option<usize>,
    ) -> Self {
        let columns = offsets
            .iter()
            .map(|&offset| IndexColumn { offset, length })
            .collect();
        self.paths.push(AccessPath::via(Arc::new(IndexInfo {
            id,
            name: name.to_owned(),
            columns,
            unique: false,
        })));
        self
    }

    pub(crate) fn index_with_lengths(
        mut self,
        id: i64,
        name: &str,
        cols: &[(usize, Option<usize>)],
    ) -> Self {
        let columns = cols
            .iter()
            .map(|&(offset, length)| IndexColumn { offset, length })
            .collect();
        self.paths.push(AccessPath::via(Arc::new(IndexInfo {
            id,
            name: name.to_owned(),
            columns,
            unique: false,
        })));
        self
    }

    pub(crate) fn pk_is_handle(mut self) -> Self {
        self.pk_is_handle = true;
        self
    }

    pub(crate) fn pushed_cond(mut self, cond: Expr) -> Self {
        self.pushed_down_conds.push(cond);
        self
    }

    pub(crate) fn row_count(mut self, rows: f64) -> Self {
        self.row_count = rows;
        self
    }

    pub(crate) fn table_stats(mut self, table_stats: TableStats) -> Self {
        self.table_stats = Some(table_stats);
        self
    }

    pub(crate) fn build(self) -> LogicalDataSource {
        let schema = Arc::new(Schema::new(self.columns.clone()));
        let statistic_table = Arc::new(
            self.table_stats
                .unwrap_or_else(|| TableStats::pseudo_table(self.row_count)),
        );
        LogicalDataSource {
            table_info: Arc::new(TableInfo {
                id: 1,
                name: "t".to_owned(),
                pk_is_handle: self.pk_is_handle,
            }),
            columns: self.columns,
            possible_access_paths: self.paths,
            pushed_down_conds: self.pushed_down_conds,
            statistic_table,
            schema,
            stats: stats(self.row_count),
        }
    }
}

/// A leaf child plan with the given output columns and row count.
pub(crate) fn leaf(columns: Vec<ColumnRef>, row_count: f64) -> LogicalPlan {
    LogicalPlan::DataSource(data_source_builder(columns).row_count(row_count).build())
}

/// A join over two children with aligned equi-conditions and no hints.
pub(crate) fn logical_join(
    join_type: JoinType,
    left: LogicalPlan,
    right: LogicalPlan,
    keys: &[(&ColumnRef, &ColumnRef)],
) -> LogicalJoin {
    let schema = Arc::new(left.schema().merge(right.schema()));
    let row_count = left.stats().row_count.max(right.stats().row_count);
    LogicalJoin {
        join_type,
        equal_conditions: keys.iter().map(|(l, r)| eq_cond(l, r)).collect(),
        left_conditions: vec![],
        right_conditions: vec![],
        other_conditions: vec![],
        default_values: vec![],
        hints: Default::default(),
        left_properties: vec![],
        right_properties: vec![],
        left: Arc::new(left),
        right: Arc::new(right),
        schema,
        stats: stats(row_count),
    }
}
