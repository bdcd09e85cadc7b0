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

use tessera_common::DataType;
use tessera_expr::{ColumnRef, Expr, SchemaRef};

use crate::statistics::{StatsInfo, TableStats};

/// Table metadata the planner needs: identity plus whether the primary key
/// is the integer row handle.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub id: i64,
    pub name: String,
    /// When set, the table is clustered on a single integer primary key
    /// column and that column doubles as the row handle.
    pub pk_is_handle: bool,
}

/// One key column of an index: an offset into the owning table's column
/// list, plus the prefix length for prefix indexes.
#[derive(Debug, Clone)]
pub struct IndexColumn {
    pub offset: usize,
    /// `Some(n)` for a prefix index over the first `n` bytes; such a column
    /// cannot pin a point range.
    pub length: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub id: i64,
    pub name: String,
    pub columns: Vec<IndexColumn>,
    pub unique: bool,
}

/// One way to read the table: the table itself, or through an index.
#[derive(Debug, Clone)]
pub struct AccessPath {
    pub index: Option<Arc<IndexInfo>>,
}

impl AccessPath {
    pub fn table() -> Self {
        AccessPath { index: None }
    }

    pub fn via(index: Arc<IndexInfo>) -> Self {
        AccessPath { index: Some(index) }
    }

    pub fn is_table_path(&self) -> bool {
        self.index.is_none()
    }
}

/// A base table access, with the predicates already pushed to it.
#[derive(Debug, Clone)]
pub struct LogicalDataSource {
    pub table_info: Arc<TableInfo>,
    /// All table columns in table order; index column offsets point here.
    pub columns: Vec<ColumnRef>,
    pub possible_access_paths: Vec<AccessPath>,
    pub pushed_down_conds: Vec<Expr>,
    pub statistic_table: Arc<TableStats>,
    pub schema: SchemaRef,
    pub stats: StatsInfo,
}

impl LogicalDataSource {
    /// The clustered integer primary-key column when the table is keyed by
    /// its handle.
    pub fn pk_is_handle_col(&self) -> Option<ColumnRef> {
        if !self.table_info.pk_is_handle {
            return None;
        }
        self.columns
            .iter()
            .find(|c| matches!(c.data_type, DataType::Int | DataType::UInt))
            .cloned()
    }

    /// The key columns of `index` with their prefix lengths, resolved
    /// against this table.
    pub fn index_columns(&self, index: &IndexInfo) -> (Vec<ColumnRef>, Vec<Option<usize>>) {
        let cols = index
            .columns
            .iter()
            .map(|ic| self.columns[ic.offset].clone())
            .collect();
        let lengths = index.columns.iter().map(|ic| ic.length).collect();
        (cols, lengths)
    }

    /// Whether `index` alone can answer every column this scan must
    /// produce. Prefix columns never cover; the handle column is always
    /// recoverable from an index read.
    pub fn is_covering_index(&self, index: &IndexInfo) -> bool {
        let (idx_cols, lengths) = self.index_columns(index);
        let handle = self.pk_is_handle_col();
        self.schema.columns().iter().all(|col| {
            if handle.as_ref() == Some(col) {
                return true;
            }
            idx_cols
                .iter()
                .zip(lengths.iter())
                .any(|(ic, len)| ic == col && len.is_none())
        })
    }
}
