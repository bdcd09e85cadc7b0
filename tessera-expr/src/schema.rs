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

use crate::column::ColumnRef;

/// A shared handle to an ordered column set.
pub type SchemaRef = Arc<Schema>;

/// An ordered set of columns describing an operator's output.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<ColumnRef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnRef>) -> Self {
        Schema { columns }
    }

    pub fn empty() -> SchemaRef {
        Arc::new(Schema::default())
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of `col` in this schema, by column identity.
    pub fn column_index(&self, col: &ColumnRef) -> Option<usize> {
        self.columns.iter().position(|c| c == col)
    }

    pub fn contains(&self, col: &ColumnRef) -> bool {
        self.column_index(col).is_some()
    }

    /// The columns at `offsets`, in offset order. Offsets must be in bounds.
    pub fn columns_by_indices(&self, offsets: &[usize]) -> Vec<ColumnRef> {
        offsets.iter().map(|i| self.columns[*i].clone()).collect()
    }

    /// A new schema holding this schema's columns followed by `other`'s.
    pub fn merge(&self, other: &Schema) -> Schema {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema { columns }
    }
}

impl From<Vec<ColumnRef>> for Schema {
    fn from(columns: Vec<ColumnRef>) -> Self {
        Schema::new(columns)
    }
}
