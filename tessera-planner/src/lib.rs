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

//! Physical plan enumeration for the Tessera query engine.
//!
//! Given a logical operator and a required [PhysicalProperty], the planner
//! core enumerates every candidate physical implementation of that operator
//! together with the property each candidate demands of its children. The
//! surrounding memoized top-down search combines those candidates with the
//! cheapest child plans and keeps the minimum-cost plan per
//! (operator, property) pair; that search, the cost model and task
//! finalization live outside this crate.

pub mod logical;
pub mod physical;
pub mod planner;
pub mod property;
pub mod range_filter;
pub mod ranger;
pub mod session;
pub mod statistics;

#[cfg(test)]
pub(crate) mod test_util;

pub use planner::exhaust_physical_plans;
pub use property::{PhysicalProperty, TaskType};
pub use session::SessionContext;
