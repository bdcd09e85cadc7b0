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

use tessera_common::Datum;

use crate::column::ColumnRef;
use crate::schema::SchemaRef;

/// One materialized row, positionally aligned with its schema. This is the
/// surface through which a driving outer row reaches deferred range
/// construction.
#[derive(Debug, Clone)]
pub struct Row {
    schema: SchemaRef,
    values: Vec<Datum>,
}

impl Row {
    /// `values` must align with `schema` one to one.
    pub fn new(schema: SchemaRef, values: Vec<Datum>) -> Row {
        debug_assert_eq!(schema.len(), values.len());
        Row { schema, values }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// The value of `col` in this row, by column identity.
    pub fn value(&self, col: &ColumnRef) -> Option<&Datum> {
        self.schema.column_index(col).map(|i| &self.values[i])
    }
}
