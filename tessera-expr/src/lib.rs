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

//! Columns, schemas and scalar expressions as the planner sees them.
//!
//! Columns carry a stable `unique_id` and compare by that identity alone;
//! two references to the same resolved column stay equal across projections
//! and aliases, which is what the planner's order-prefix and join-key
//! matching relies on.

mod column;
mod expr;
mod row;
mod schema;

pub use column::{Column, ColumnRef};
pub use expr::{
    column_slice_is_intersect, extract_columns, extract_columns_into, new_function, Expr,
    Operator, ScalarFunction,
};
pub use row::Row;
pub use schema::{Schema, SchemaRef};
