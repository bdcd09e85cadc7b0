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

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tessera_common::DataType;

/// A shared handle to a resolved column.
pub type ColumnRef = Arc<Column>;

/// A column resolved by name resolution upstream of the planner.
///
/// Equality and hashing use `unique_id` only. Structural equality of the
/// surrounding expression node is never what join-key or order matching
/// wants: the same column reached through different plan paths must compare
/// equal, and distinct columns that happen to share a name must not.
#[derive(Debug, Clone)]
pub struct Column {
    pub unique_id: i64,
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(unique_id: i64, name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            unique_id,
            name: name.into(),
            data_type,
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_id.hash(state);
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.unique_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_not_structure() {
        let a = Column::new(1, "a", DataType::Int);
        let also_a = Column::new(1, "a_alias", DataType::Int);
        let b = Column::new(2, "a", DataType::Int);
        assert_eq!(a, also_a);
        assert_ne!(a, b);
    }
}
