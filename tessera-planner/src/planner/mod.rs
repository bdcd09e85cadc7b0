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

//! Property-directed enumeration: one function per logical operator kind,
//! dispatched from [exhaust_physical_plans].
//!
//! Enumeration is pure and deterministic. A candidate that cannot satisfy
//! the required property is simply not emitted; an empty result is not an
//! error. Candidate order is stable so the caller's cost tie-breaking is
//! reproducible.

pub mod aggregate;
pub mod index_join;
pub mod join;
pub mod simple;

use tessera_common::Result;

use crate::logical::LogicalPlan;
use crate::physical::PhysicalPlan;
use crate::property::PhysicalProperty;
use crate::session::SessionContext;

/// Enumerates every physical implementation of `plan` able to deliver
/// `prop`, each carrying the property it requires from each child.
pub fn exhaust_physical_plans(
    ctx: &SessionContext,
    plan: &LogicalPlan,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    match plan {
        LogicalPlan::Join(join) => join::exhaust_join_plans(ctx, join, prop),
        LogicalPlan::Apply(apply) => simple::apply_plans(ctx, apply, prop),
        LogicalPlan::Projection(proj) => simple::projection_plans(proj, prop),
        LogicalPlan::Selection(sel) => simple::selection_plans(sel, prop),
        LogicalPlan::Aggregation(agg) => aggregate::aggregation_plans(agg, prop),
        LogicalPlan::Sort(sort) => simple::sort_plans(sort, prop),
        LogicalPlan::TopN(top_n) => simple::top_n_plans(top_n, prop),
        LogicalPlan::Limit(limit) => simple::limit_plans(limit, prop),
        LogicalPlan::UnionAll(union) => simple::union_all_plans(union, prop),
        LogicalPlan::Lock(lock) => simple::lock_plans(lock, prop),
        LogicalPlan::MaxOneRow(m) => simple::max_one_row_plans(m, prop),
        LogicalPlan::UnionScan(us) => simple::union_scan_plans(us, prop),
        // Leaves generate their own scan tasks in the data-source planner;
        // reaching one here is a bug in the search driver.
        LogicalPlan::DataSource(_) => {
            unreachable!("data source reached property-directed enumeration")
        }
    }
}
