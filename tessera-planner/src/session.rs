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

//! Per-session configuration the planner consults while enumerating.

/// Session-scoped knobs. Threaded through enumeration and range
/// construction the same way statement context travels with a query.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Number of worker threads a hash join may use; stamped onto hash-join
    /// candidates for the cost model downstream.
    pub hash_join_concurrency: usize,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash_join_concurrency(mut self, n: usize) -> Self {
        self.hash_join_concurrency = n.max(1);
        self
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        SessionContext {
            hash_join_concurrency: num_cpus::get(),
        }
    }
}
