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

//! Join enumeration: sort-merge, index and hash candidates for one logical
//! join, with user hints collapsing the candidate set.

use tessera_common::Result;
use tessera_expr::{ColumnRef, Expr};

use crate::logical::{JoinType, LogicalJoin};
use crate::physical::{PhysicalHashJoin, PhysicalMergeJoin, PhysicalOperator, PhysicalPlan};
use crate::planner::index_join::get_index_join_by_outer_idx;
use crate::property::{max_prefix_match, max_sort_prefix, reorder_by_offsets, PhysicalProperty};
use crate::session::SessionContext;

/// All candidates for `join` under `prop`.
///
/// Merge-join candidates come first; a merge-join hint with at least one
/// candidate short-circuits. Index joins follow, exclusively when a hint
/// forced the orientation. Hash joins close the list, exclusively under a
/// hash-join hint.
pub fn exhaust_join_plans(
    ctx: &SessionContext,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    let merge_joins = get_merge_joins(join, prop);
    if join.hints.merge_join && !merge_joins.is_empty() {
        return Ok(merge_joins);
    }
    let mut joins = merge_joins;

    let (index_joins, forced) = try_to_get_index_join(ctx, join, prop)?;
    if forced {
        return Ok(index_joins);
    }
    joins.extend(index_joins);

    let hash_joins = get_hash_joins(ctx, join, prop);
    if join.hints.hash_join && !hash_joins.is_empty() {
        return Ok(hash_joins);
    }
    joins.extend(hash_joins);
    Ok(joins)
}

/// Equal conditions whose key positions were not kept as merge keys turn
/// back into general predicates.
fn move_equal_to_other_conditions(join: &LogicalJoin, kept: &[usize]) -> Vec<Expr> {
    let mut others = join.other_conditions.clone();
    for (i, cond) in join.equal_conditions.iter().enumerate() {
        if !kept.contains(&i) {
            others.push(Expr::ScalarFunction(cond.clone()));
        }
    }
    others
}

/// Child requirements for a merge join over the given key lists, or `None`
/// when `prop` rules the merge join out.
fn try_to_get_child_req_prop(
    join_type: JoinType,
    left_keys: &[ColumnRef],
    right_keys: &[ColumnRef],
    prop: &PhysicalProperty,
) -> Option<[PhysicalProperty; 2]> {
    let l_prop = PhysicalProperty::with_order(left_keys.to_vec(), false, f64::INFINITY);
    let r_prop = PhysicalProperty::with_order(right_keys.to_vec(), false, f64::INFINITY);
    if !prop.is_empty() {
        // Merge join pays off on massive ordered inputs, where a backward
        // scan is always the expensive way to read them.
        if prop.desc {
            return None;
        }
        if !prop.is_prefix_of(&l_prop) && !prop.is_prefix_of(&r_prop) {
            return None;
        }
        // Outer-side nulls perturb the opposite side's ordering.
        if prop.is_prefix_of(&r_prop) && join_type == JoinType::LeftOuter {
            return None;
        }
        if prop.is_prefix_of(&l_prop) && join_type == JoinType::RightOuter {
            return None;
        }
    }
    Some([l_prop, r_prop])
}

/// Sort-merge candidates: one per left child ordering that lines up with a
/// usable prefix of the join keys on both sides.
fn get_merge_joins(join: &LogicalJoin, prop: &PhysicalProperty) -> Vec<PhysicalPlan> {
    let all_left_keys = join.left_join_keys();
    let all_right_keys = join.right_join_keys();
    let mut joins = Vec::with_capacity(join.left_properties.len() + 1);
    for lhs_order in &join.left_properties {
        let offsets = max_sort_prefix(lhs_order, &all_left_keys);
        if offsets.is_empty() {
            continue;
        }
        let right_keys: Vec<ColumnRef> =
            offsets.iter().map(|&o| all_right_keys[o].clone()).collect();
        let prefix_len = max_prefix_match(&join.right_properties, &right_keys);
        if prefix_len == 0 {
            continue;
        }
        let left_keys = lhs_order[..prefix_len].to_vec();
        let right_keys = right_keys[..prefix_len].to_vec();
        let offsets = &offsets[..prefix_len];
        let Some(child_props) =
            try_to_get_child_req_prop(join.join_type, &left_keys, &right_keys, prop)
        else {
            continue;
        };
        let op = PhysicalOperator::MergeJoin(PhysicalMergeJoin {
            join_type: join.join_type,
            left_keys,
            right_keys,
            left_conditions: join.left_conditions.clone(),
            right_conditions: join.right_conditions.clone(),
            other_conditions: move_equal_to_other_conditions(join, offsets),
            default_values: join.default_values.clone(),
        });
        joins.push(PhysicalPlan::new(
            op,
            join.schema.clone(),
            join.stats.scale_by_expect_cnt(prop.expected_cnt),
            child_props.to_vec(),
        ));
    }
    if join.hints.merge_join && joins.is_empty() {
        joins.extend(get_enforced_merge_join(join, prop));
    }
    joins
}

/// The hinted fallback: a merge join whose children are explicitly sorted.
/// Usable only when every property column claims a distinct join-key
/// position (on either side); both key lists are reordered to put the
/// claimed positions first.
fn get_enforced_merge_join(join: &LogicalJoin, prop: &PhysicalProperty) -> Option<PhysicalPlan> {
    let all_left_keys = join.left_join_keys();
    let all_right_keys = join.right_join_keys();
    let mut offsets: Vec<usize> = Vec::with_capacity(prop.cols.len());
    for col in &prop.cols {
        let pos = (0..all_left_keys.len()).find(|&j| {
            !offsets.contains(&j) && (all_left_keys[j] == *col || all_right_keys[j] == *col)
        })?;
        offsets.push(pos);
    }
    let left_keys = reorder_by_offsets(&all_left_keys, &offsets);
    let right_keys = reorder_by_offsets(&all_right_keys, &offsets);
    let mut l_prop =
        PhysicalProperty::with_order(left_keys.clone(), prop.desc, f64::INFINITY);
    l_prop.enforced = true;
    let mut r_prop =
        PhysicalProperty::with_order(right_keys.clone(), prop.desc, f64::INFINITY);
    r_prop.enforced = true;
    let op = PhysicalOperator::MergeJoin(PhysicalMergeJoin {
        join_type: join.join_type,
        left_keys,
        right_keys,
        left_conditions: join.left_conditions.clone(),
        right_conditions: join.right_conditions.clone(),
        other_conditions: join.other_conditions.clone(),
        default_values: join.default_values.clone(),
    });
    Some(PhysicalPlan::new(
        op,
        join.schema.clone(),
        join.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![l_prop, r_prop],
    ))
}

/// One hash join with the given build side. The build side must
/// materialize fully; the probe side inherits the parent's row budget.
pub(crate) fn make_hash_join(
    ctx: &SessionContext,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
    inner_idx: usize,
) -> PhysicalPlan {
    let mut req_props = vec![PhysicalProperty::unbounded(), PhysicalProperty::unbounded()];
    req_props[1 - inner_idx].expected_cnt = prop.expected_cnt;
    let op = PhysicalOperator::HashJoin(PhysicalHashJoin {
        join_type: join.join_type,
        equal_conditions: join.equal_conditions.clone(),
        left_conditions: join.left_conditions.clone(),
        right_conditions: join.right_conditions.clone(),
        other_conditions: join.other_conditions.clone(),
        default_values: join.default_values.clone(),
        inner_idx,
        concurrency: ctx.hash_join_concurrency,
    });
    PhysicalPlan::new(
        op,
        join.schema.clone(),
        join.stats.scale_by_expect_cnt(prop.expected_cnt),
        req_props,
    )
}

/// Hash joins destroy order, so candidates exist only under an empty
/// property. The build side follows the join type; an inner join tries
/// both orientations.
fn get_hash_joins(
    ctx: &SessionContext,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if !prop.is_empty() {
        return vec![];
    }
    match join.join_type {
        JoinType::RightOuter => vec![make_hash_join(ctx, join, prop, 0)],
        JoinType::Inner => vec![
            make_hash_join(ctx, join, prop, 1),
            make_hash_join(ctx, join, prop, 0),
        ],
        _ => vec![make_hash_join(ctx, join, prop, 1)],
    }
}

/// Index-join candidates plus whether a hint made the choice exclusive.
///
/// The lookup driver must be the row-preserving side, so only one
/// orientation exists outside inner joins. For inner joins with both
/// orientations feasible and no hint, the side with the smaller opposite
/// child wins: the smaller relation becomes the lookup target.
fn try_to_get_index_join(
    ctx: &SessionContext,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Result<(Vec<PhysicalPlan>, bool)> {
    if join.equal_conditions.is_empty() {
        return Ok((vec![], false));
    }
    match join.join_type {
        JoinType::RightOuter => {
            let plans = get_index_join_by_outer_idx(ctx, join, prop, 1)?;
            let forced = !plans.is_empty() && join.hints.right_as_index_outer;
            Ok((plans, forced))
        }
        JoinType::Inner => {
            let driven_by_left = get_index_join_by_outer_idx(ctx, join, prop, 0)?;
            if !driven_by_left.is_empty() && join.hints.left_as_index_outer {
                return Ok((driven_by_left, true));
            }
            let driven_by_right = get_index_join_by_outer_idx(ctx, join, prop, 1)?;
            if !driven_by_right.is_empty() && join.hints.right_as_index_outer {
                return Ok((driven_by_right, true));
            }
            let lhs_rows = join.left.stats().row_count;
            let rhs_rows = join.right.stats().row_count;
            if !driven_by_left.is_empty() && rhs_rows < lhs_rows {
                return Ok((driven_by_left, false));
            }
            if !driven_by_right.is_empty() && lhs_rows < rhs_rows {
                return Ok((driven_by_right, false));
            }
            let mut plans = driven_by_left;
            plans.extend(driven_by_right);
            Ok((plans, false))
        }
        _ => {
            let plans = get_index_join_by_outer_idx(ctx, join, prop, 0)?;
            let forced = !plans.is_empty() && join.hints.left_as_index_outer;
            Ok((plans, forced))
        }
    }
}
