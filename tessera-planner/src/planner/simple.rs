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

//! Enumerators for the order-transparent and order-defining operators:
//! selection, projection, limit, top-n, sort, union, lock, max-one-row,
//! union-scan and apply.

use tessera_common::Result;
use tessera_expr::Expr;

use crate::physical::{PhysicalApply, PhysicalOperator, PhysicalPlan};
use crate::planner::join::make_hash_join;
use crate::property::{
    match_items, prop_from_order_items, PhysicalProperty, WHOLE_TASK_TYPES,
};
use crate::logical::{
    LogicalApply, LogicalLimit, LogicalLock, LogicalMaxOneRow, LogicalProjection,
    LogicalSelection, LogicalSort, LogicalTopN, LogicalUnionAll, LogicalUnionScan,
};
use crate::session::SessionContext;

/// Selection keeps whatever order its child has; the property passes
/// through untouched.
pub fn selection_plans(
    sel: &LogicalSelection,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::Selection {
            conditions: sel.conditions.clone(),
        },
        sel.schema.clone(),
        sel.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![prop.clone()],
    )])
}

/// Rewrites the required order through the projection list: a column maps
/// to its source column, a constant imposes nothing, and an expression
/// cannot be pushed as an order at all.
fn try_to_get_child_prop(
    proj: &LogicalProjection,
    prop: &PhysicalProperty,
) -> Option<PhysicalProperty> {
    let mut child_prop = PhysicalProperty::with_expected_cnt(prop.expected_cnt);
    child_prop.desc = prop.desc;
    for col in &prop.cols {
        let idx = proj.schema.column_index(col)?;
        match &proj.exprs[idx] {
            Expr::Column(source) => child_prop.cols.push(source.clone()),
            Expr::Constant(_) => {}
            Expr::ScalarFunction(_) => return None,
        }
    }
    Some(child_prop)
}

pub fn projection_plans(
    proj: &LogicalProjection,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    let Some(child_prop) = try_to_get_child_prop(proj, prop) else {
        return Ok(vec![]);
    };
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::Projection {
            exprs: proj.exprs.clone(),
        },
        proj.schema.clone(),
        proj.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![child_prop],
    )])
}

/// A bare limit imposes no order, so it only answers an order-free
/// request; one candidate per placement, each asking the child for
/// `offset + count` rows.
pub fn limit_plans(limit: &LogicalLimit, prop: &PhysicalProperty) -> Result<Vec<PhysicalPlan>> {
    if !prop.is_empty() {
        return Ok(vec![]);
    }
    let plans = WHOLE_TASK_TYPES
        .iter()
        .map(|&task_type| {
            let mut child_prop = PhysicalProperty::with_task_type(task_type);
            child_prop.expected_cnt = (limit.count + limit.offset) as f64;
            PhysicalPlan::new(
                PhysicalOperator::Limit {
                    offset: limit.offset,
                    count: limit.count,
                },
                limit.schema.clone(),
                limit.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![child_prop],
            )
        })
        .collect();
    Ok(plans)
}

/// Top-n variants: the sorting implementation per placement, plus plain
/// limits that rely on the child already producing the order.
pub fn top_n_plans(top_n: &LogicalTopN, prop: &PhysicalProperty) -> Result<Vec<PhysicalPlan>> {
    if !match_items(prop, &top_n.by_items) {
        return Ok(vec![]);
    }
    let mut plans: Vec<PhysicalPlan> = WHOLE_TASK_TYPES
        .iter()
        .map(|&task_type| {
            let mut child_prop = PhysicalProperty::with_task_type(task_type);
            child_prop.expected_cnt = f64::INFINITY;
            PhysicalPlan::new(
                PhysicalOperator::TopN {
                    by_items: top_n.by_items.clone(),
                    offset: top_n.offset,
                    count: top_n.count,
                },
                top_n.schema.clone(),
                top_n.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![child_prop],
            )
        })
        .collect();
    if let Some((cols, desc)) = prop_from_order_items(&top_n.by_items) {
        plans.extend(WHOLE_TASK_TYPES.iter().map(|&task_type| {
            let mut child_prop = PhysicalProperty::with_order(
                cols.clone(),
                desc,
                (top_n.count + top_n.offset) as f64,
            );
            child_prop.task_type = task_type;
            PhysicalPlan::new(
                PhysicalOperator::Limit {
                    offset: top_n.offset,
                    count: top_n.count,
                },
                top_n.schema.clone(),
                top_n.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![child_prop],
            )
        }));
    }
    Ok(plans)
}

/// A real sort, plus the nominal variant that just passes the order
/// requirement down when the order is expressible over plain columns.
pub fn sort_plans(sort: &LogicalSort, prop: &PhysicalProperty) -> Result<Vec<PhysicalPlan>> {
    if !match_items(prop, &sort.by_items) {
        return Ok(vec![]);
    }
    let mut plans = vec![PhysicalPlan::new(
        PhysicalOperator::Sort {
            by_items: sort.by_items.clone(),
        },
        sort.schema.clone(),
        sort.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![PhysicalProperty::unbounded()],
    )];
    if let Some((cols, desc)) = prop_from_order_items(&sort.by_items) {
        let child_prop = PhysicalProperty::with_order(cols, desc, prop.expected_cnt);
        plans.push(PhysicalPlan::new(
            PhysicalOperator::NominalSort,
            sort.schema.clone(),
            sort.stats.scale_by_expect_cnt(prop.expected_cnt),
            vec![child_prop],
        ));
    }
    Ok(plans)
}

/// Concatenation preserves no order across inputs.
pub fn union_all_plans(
    union: &LogicalUnionAll,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    if !prop.is_empty() {
        return Ok(vec![]);
    }
    let child_props = union
        .inputs
        .iter()
        .map(|_| PhysicalProperty::with_expected_cnt(prop.expected_cnt))
        .collect();
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::UnionAll,
        union.schema.clone(),
        union.stats.scale_by_expect_cnt(prop.expected_cnt),
        child_props,
    )])
}

pub fn lock_plans(lock: &LogicalLock, prop: &PhysicalProperty) -> Result<Vec<PhysicalPlan>> {
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::Lock { lock: lock.lock },
        lock.schema.clone(),
        lock.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![prop.clone()],
    )])
}

/// Asks the child for two rows: one to return, one to prove the subquery
/// did not produce more.
pub fn max_one_row_plans(
    m: &LogicalMaxOneRow,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    if !prop.is_empty() {
        return Ok(vec![]);
    }
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::MaxOneRow,
        m.schema.clone(),
        m.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![PhysicalProperty::with_expected_cnt(2.0)],
    )])
}

pub fn union_scan_plans(
    us: &LogicalUnionScan,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::UnionScan {
            conditions: us.conditions.clone(),
        },
        us.schema.clone(),
        us.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![prop.clone()],
    )])
}

/// Correlated execution: hash-join shaped with the subquery as the build
/// side, re-driven per outer row. Any required order must come from the
/// outer child.
pub fn apply_plans(
    ctx: &SessionContext,
    apply: &LogicalApply,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    if !prop.all_cols_from_schema(apply.join.left.schema()) {
        return Ok(vec![]);
    }
    let hash_plan = make_hash_join(ctx, &apply.join, prop, 1);
    let PhysicalOperator::HashJoin(join) = hash_plan.op else {
        unreachable!("apply derives from a hash join")
    };
    let outer_prop = PhysicalProperty::with_order(prop.cols.clone(), prop.desc, f64::INFINITY);
    Ok(vec![PhysicalPlan::new(
        PhysicalOperator::Apply(PhysicalApply {
            join,
            corr_cols: apply.corr_cols.clone(),
        }),
        apply.join.schema.clone(),
        apply.join.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![outer_prop, PhysicalProperty::unbounded()],
    )])
}
