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

//! Index-join feasibility: choose the best usable index on the inner side,
//! derive a scan-range template from join equalities and pushed-down
//! predicates, and commit the inner lookup pipeline.

use std::sync::Arc;

use itertools::{Either, Itertools};
use log::warn;

use tessera_common::{DataType, Datum, Result, TesseraError};
use tessera_expr::{
    column_slice_is_intersect, extract_columns, ColumnRef, Expr, Operator,
};

use crate::logical::{IndexInfo, LogicalDataSource, LogicalJoin, LogicalPlan, LogicalUnionScan};
use crate::physical::{
    PhysicalIndexJoin, PhysicalIndexScan, PhysicalOperator, PhysicalPlan, PhysicalTableScan,
};
use crate::property::PhysicalProperty;
use crate::range_filter::ColumnWithComparisons;
use crate::ranger::{
    access_values, build_column_range, detach_conds_for_column,
    extract_eq_and_in_condition, full_int_range, Range,
};
use crate::session::SessionContext;
use crate::statistics::StatsInfo;

/// Default selectivity applied to residual filters on the inner pipeline.
const SELECTION_FACTOR: f64 = 0.8;

/// What makes one index usable for a lookup join.
#[derive(Debug)]
pub struct LookUpAnalysis {
    /// The range template: point slots for the matched keys and pushed
    /// equal/in predicates, optionally one more bounded column. Key slots
    /// hold placeholders filled per driving row.
    pub ranges: Vec<Range>,
    /// For each index column, the matched join-key position if any.
    pub idx_off_to_key_off: Vec<Option<usize>>,
    /// Predicates the scan must still apply after the range read.
    pub residuals: Vec<Expr>,
    /// Outer-driven bounds on the column just past the point prefix.
    pub compare_filters: Option<ColumnWithComparisons>,
}

/// Decides whether `index` can serve lookups keyed by `inner_join_keys`.
///
/// `Ok(None)` means the index is simply not usable; an `Err` is an analysis
/// failure the caller downgrades to a warning.
pub(crate) fn analyze_lookup_filters(
    ctx: &SessionContext,
    index: &IndexInfo,
    ds: &LogicalDataSource,
    inner_join_keys: &[ColumnRef],
) -> Result<Option<LookUpAnalysis>> {
    let (idx_cols, col_lengths) = ds.index_columns(index);
    if idx_cols.is_empty() {
        return Ok(None);
    }
    // Prefix-length columns cannot pin a point, so they never match a key.
    let idx_off_to_key_off: Vec<Option<usize>> = idx_cols
        .iter()
        .zip(col_lengths.iter())
        .map(|(col, len)| {
            if len.is_some() {
                None
            } else {
                inner_join_keys.iter().position(|k| k == col)
            }
        })
        .collect();
    let matched_key_cnt = idx_off_to_key_off.iter().flatten().count();
    if matched_key_cnt == 0 {
        return Ok(None);
    }

    // Conditions touching a join key must stay as post-scan filters; the
    // rest may narrow the scan range.
    let (mut residuals, range_candidates): (Vec<Expr>, Vec<Expr>) = ds
        .pushed_down_conds
        .iter()
        .partition_map(|cond| {
            if column_slice_is_intersect(&extract_columns(cond), inner_join_keys) {
                Either::Left(cond.clone())
            } else {
                Either::Right(cond.clone())
            }
        });

    // The non-key index columns, in index order, up to the first prefix
    // column; equal/in predicates pinned to these fill the holes between
    // matched keys.
    let not_key_cols: Vec<ColumnRef> = idx_cols
        .iter()
        .enumerate()
        .filter(|(i, _)| idx_off_to_key_off[*i].is_none() && col_lengths[*i].is_none())
        .map(|(_, c)| c.clone())
        .collect();
    let extraction = extract_eq_and_in_condition(ctx, &range_candidates, &not_key_cols);
    let eq_and_in = extraction.eq_and_in();

    // Every unmatched index column at or before the rightmost matched key
    // must be pinned, or the keys past the hole are useless to the scan.
    let last_matched = idx_off_to_key_off
        .iter()
        .rposition(|k| k.is_some())
        .expect("at least one matched key");
    if eq_and_in.len() < (last_matched + 1) - matched_key_cnt {
        return Ok(None);
    }
    // The pinned predicates still get re-checked by the scan.
    residuals.extend(eq_and_in.iter().cloned());

    let next_col_pos = matched_key_cnt + eq_and_in.len();
    if next_col_pos >= idx_cols.len() {
        let ranges = build_template_range(matched_key_cnt, &eq_and_in, None, false)?;
        residuals.extend(extraction.remained.iter().cloned());
        return Ok(Some(LookUpAnalysis {
            ranges,
            idx_off_to_key_off,
            residuals,
            compare_filters: None,
        }));
    }

    let next_col = idx_cols[next_col_pos].clone();
    let next_col_usable = col_lengths[next_col_pos].is_none();

    // Comparisons on the next column whose bound is driven purely by outer
    // columns defer their range construction to execution time.
    let mut cwc = ColumnWithComparisons::new(next_col.clone());
    let mut unused = Vec::new();
    for cond in &extraction.remained {
        match next_col_usable
            .then(|| outer_driven_comparison(cond, &next_col, ds))
            .flatten()
        {
            Some((op, arg)) => {
                let affected = extract_columns(&arg);
                cwc.append_comparison(op, arg, &affected);
            }
            None => unused.push(cond.clone()),
        }
    }
    if !cwc.is_empty() {
        let ranges = build_template_range(matched_key_cnt, &eq_and_in, None, true)?;
        residuals.extend(unused);
        return Ok(Some(LookUpAnalysis {
            ranges,
            idx_off_to_key_off,
            residuals,
            compare_filters: Some(cwc),
        }));
    }

    // No outer-driven bound: fall back to a static range on the next
    // column when constant comparisons pin one.
    let mut next_col_range = None;
    if next_col_usable {
        let (accesses, remained) = detach_conds_for_column(ctx, &unused, &next_col);
        if !accesses.is_empty() {
            let ranges = build_column_range(ctx, &accesses, &next_col)?;
            if ranges.is_empty() {
                // The pushed conditions contradict each other; no lookup
                // through this index can return rows.
                return Ok(None);
            }
            next_col_range = Some(ranges);
            residuals.extend(accesses);
            unused = remained;
        }
    }
    let have_extra = next_col_range.is_some();
    let ranges = build_template_range(matched_key_cnt, &eq_and_in, next_col_range, false)?;
    residuals.extend(unused);
    debug_assert!(
        ranges[0].low.len() == matched_key_cnt + eq_and_in.len() + usize::from(have_extra)
    );
    Ok(Some(LookUpAnalysis {
        ranges,
        idx_off_to_key_off,
        residuals,
        compare_filters: None,
    }))
}

/// A comparison `next_col op expr` (either operand order) whose bound reads
/// outer columns only.
fn outer_driven_comparison(
    cond: &Expr,
    next_col: &ColumnRef,
    ds: &LogicalDataSource,
) -> Option<(Operator, Expr)> {
    let f = cond.as_scalar_function()?;
    if !f.op.is_range_comparison() {
        return None;
    }
    let (op, bound) = if f.arg_column(0) == Some(next_col) {
        (f.op, f.args[1].clone())
    } else if f.arg_column(1) == Some(next_col) {
        (f.op.swap()?, f.args[0].clone())
    } else {
        return None;
    };
    let bound_cols = extract_columns(&bound);
    if bound_cols.is_empty() {
        // A constant bound belongs in the static range, not here.
        return None;
    }
    if bound_cols.iter().any(|c| ds.schema.contains(c)) {
        return None;
    }
    Some((op, bound))
}

/// Assembles the range template. The first `matched_key_cnt` slots are
/// placeholders for the per-row join-key values; the equal/in predicates
/// contribute one slot each, multiplying out `IN` lists; one more slot is
/// added whenever the next column is bounded, statically or per row.
fn build_template_range(
    matched_key_cnt: usize,
    eq_and_in: &[Expr],
    next_col_range: Option<Vec<Range>>,
    have_cmp_manager: bool,
) -> Result<Vec<Range>> {
    let mut ranges = vec![Range {
        low: vec![Datum::Null; matched_key_cnt],
        high: vec![Datum::Null; matched_key_cnt],
        low_exclude: false,
        high_exclude: false,
    }];
    for access in eq_and_in {
        let values = access_values(access)?;
        if values.is_empty() {
            return Err(TesseraError::Plan(
                "IN access predicate with no values".to_string(),
            ));
        }
        let mut expanded = Vec::with_capacity(ranges.len() * values.len());
        for range in &ranges {
            for value in &values {
                let mut r = range.clone();
                r.low.push(value.clone());
                r.high.push(value.clone());
                expanded.push(r);
            }
        }
        ranges = expanded;
    }
    if let Some(next_ranges) = next_col_range {
        let mut expanded = Vec::with_capacity(ranges.len() * next_ranges.len());
        for range in &ranges {
            for next in &next_ranges {
                let mut r = range.clone();
                r.low.extend(next.low.iter().cloned());
                r.high.extend(next.high.iter().cloned());
                r.low_exclude = next.low_exclude;
                r.high_exclude = next.high_exclude;
                expanded.push(r);
            }
        }
        ranges = expanded;
    } else if have_cmp_manager {
        // Same shape either way: the slot exists, its bounds are rewritten
        // for every driving row.
        for r in &mut ranges {
            r.low.push(Datum::Null);
            r.high.push(Datum::Null);
        }
    }
    Ok(ranges)
}

/// Index-join candidates that drive lookups from child `outer_idx`.
pub(crate) fn get_index_join_by_outer_idx(
    ctx: &SessionContext,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
    outer_idx: usize,
) -> Result<Vec<PhysicalPlan>> {
    let outer_child = join.child(outer_idx);
    if !prop.all_cols_from_schema(outer_child.schema()) {
        return Ok(vec![]);
    }
    let inner_child = join.child(1 - outer_idx);
    let (ds, union_scan) = match inner_child {
        LogicalPlan::DataSource(ds) => (ds, None),
        LogicalPlan::UnionScan(us) => match us.input.as_ref() {
            LogicalPlan::DataSource(ds) => (ds, Some(us)),
            _ => return Ok(vec![]),
        },
        _ => return Ok(vec![]),
    };
    let (outer_keys, inner_keys) = if outer_idx == 0 {
        (join.left_join_keys(), join.right_join_keys())
    } else {
        (join.right_join_keys(), join.left_join_keys())
    };

    // A join key equal to the clustered handle beats any secondary index:
    // the lookup is a point read on the table itself.
    if let Some(pk_col) = ds.pk_is_handle_col() {
        if let Some(key_pos) = inner_keys.iter().position(|k| *k == pk_col) {
            let mut key_off_map = vec![None; inner_keys.len()];
            key_off_map[key_pos] = Some(0);
            let unsigned = pk_col.data_type == DataType::UInt;
            let ranges = full_int_range(unsigned);
            let inner_plan = construct_inner_table_scan(ds, ranges.clone(), union_scan);
            return Ok(construct_index_join(
                join,
                prop,
                outer_idx,
                &outer_keys,
                &inner_keys,
                inner_plan,
                ranges,
                key_off_map,
                None,
            ));
        }
    }

    let mut best: Option<(Arc<IndexInfo>, LookUpAnalysis)> = None;
    for path in &ds.possible_access_paths {
        let Some(index) = &path.index else {
            continue;
        };
        match analyze_lookup_filters(ctx, index, ds, &inner_keys) {
            Ok(Some(analysis)) => {
                // Keep the index using the most columns; first wins a tie.
                let better = best
                    .as_ref()
                    .map_or(true, |(_, b)| {
                        analysis.ranges[0].low.len() > b.ranges[0].low.len()
                    });
                if better {
                    best = Some((index.clone(), analysis));
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "skipping index {} for lookup join analysis: {}",
                    index.name, e
                );
            }
        }
    }
    let Some((index, analysis)) = best else {
        return Ok(vec![]);
    };

    let mut key_off_map = vec![None; inner_keys.len()];
    for (idx_off, key_off) in analysis.idx_off_to_key_off.iter().enumerate() {
        if let Some(key_off) = key_off {
            key_off_map[*key_off] = Some(idx_off);
        }
    }
    let inner_plan = construct_inner_index_scan(ds, &index, &analysis, union_scan);
    Ok(construct_index_join(
        join,
        prop,
        outer_idx,
        &outer_keys,
        &inner_keys,
        inner_plan,
        analysis.ranges,
        key_off_map,
        analysis.compare_filters,
    ))
}

/// Wraps the committed inner pipeline in the join record. Equalities whose
/// key matched an index column stay join keys; the rest go back to general
/// predicates.
#[allow(clippy::too_many_arguments)]
fn construct_index_join(
    join: &LogicalJoin,
    prop: &PhysicalProperty,
    outer_idx: usize,
    outer_keys: &[ColumnRef],
    inner_keys: &[ColumnRef],
    inner_plan: PhysicalPlan,
    ranges: Vec<Range>,
    key_off_map: Vec<Option<usize>>,
    compare_filters: Option<ColumnWithComparisons>,
) -> Vec<PhysicalPlan> {
    let mut outer_join_keys = Vec::new();
    let mut inner_join_keys = Vec::new();
    let mut key_off_to_idx_off = Vec::new();
    let mut other_conditions = join.other_conditions.clone();
    for (key_off, idx_off) in key_off_map.iter().enumerate() {
        match idx_off {
            Some(idx_off) => {
                outer_join_keys.push(outer_keys[key_off].clone());
                inner_join_keys.push(inner_keys[key_off].clone());
                key_off_to_idx_off.push(*idx_off);
            }
            None => {
                other_conditions
                    .push(Expr::ScalarFunction(join.equal_conditions[key_off].clone()));
            }
        }
    }
    let mut req_props = vec![PhysicalProperty::unbounded(), PhysicalProperty::unbounded()];
    req_props[outer_idx] = prop.clone();
    let op = PhysicalOperator::IndexJoin(PhysicalIndexJoin {
        join_type: join.join_type,
        outer_idx,
        outer_join_keys,
        inner_join_keys,
        key_off_to_idx_off,
        left_conditions: join.left_conditions.clone(),
        right_conditions: join.right_conditions.clone(),
        other_conditions,
        default_values: join.default_values.clone(),
        ranges,
        compare_filters,
        inner_plan: Box::new(inner_plan),
    });
    vec![PhysicalPlan::new(
        op,
        join.schema.clone(),
        join.stats.scale_by_expect_cnt(prop.expected_cnt),
        req_props,
    )]
}

/// The inner pipeline for a handle-keyed lookup: a table point read with
/// the pushed conditions kept as scan filters.
fn construct_inner_table_scan(
    ds: &LogicalDataSource,
    ranges: Vec<Range>,
    union_scan: Option<&LogicalUnionScan>,
) -> PhysicalPlan {
    // A clustered handle lookup matches at most one row.
    let scan_stats = StatsInfo::new(1.0, vec![]);
    let scan = PhysicalPlan::new(
        PhysicalOperator::TableScan(PhysicalTableScan {
            table: ds.table_info.clone(),
            ranges,
            filters: ds.pushed_down_conds.clone(),
        }),
        ds.schema.clone(),
        scan_stats,
        vec![],
    );
    wrap_union_scan(scan, union_scan)
}

/// The inner pipeline for a secondary-index lookup: the index scan, a
/// table lookup when the index does not cover, and the residual filters.
fn construct_inner_index_scan(
    ds: &LogicalDataSource,
    index: &Arc<IndexInfo>,
    analysis: &LookUpAnalysis,
    union_scan: Option<&LogicalUnionScan>,
) -> PhysicalPlan {
    let per_lookup = ds.statistic_table.avg_count_per_index_value(index.id);
    let scan_stats = StatsInfo::new(per_lookup, vec![]);
    let covering = ds.is_covering_index(index);
    let index_scan = PhysicalPlan::new(
        PhysicalOperator::IndexScan(PhysicalIndexScan {
            table: ds.table_info.clone(),
            index: index.clone(),
            ranges: analysis.ranges.clone(),
            filters: vec![],
            covering,
        }),
        ds.schema.clone(),
        scan_stats.clone(),
        vec![],
    );
    let mut plan = if covering {
        index_scan
    } else {
        let table_side = PhysicalPlan::new(
            PhysicalOperator::TableScan(PhysicalTableScan {
                table: ds.table_info.clone(),
                ranges: vec![],
                filters: vec![],
            }),
            ds.schema.clone(),
            scan_stats.clone(),
            vec![],
        );
        PhysicalPlan::new(
            PhysicalOperator::IndexLookUp,
            ds.schema.clone(),
            scan_stats,
            vec![PhysicalProperty::unbounded(), PhysicalProperty::unbounded()],
        )
        .with_child(index_scan)
        .with_child(table_side)
    };
    if !analysis.residuals.is_empty() {
        let filtered_stats = plan.stats.scale_by_expect_cnt(plan.stats.row_count * SELECTION_FACTOR);
        plan = PhysicalPlan::new(
            PhysicalOperator::Selection {
                conditions: analysis.residuals.clone(),
            },
            ds.schema.clone(),
            filtered_stats,
            vec![PhysicalProperty::unbounded()],
        )
        .with_child(plan);
    }
    wrap_union_scan(plan, union_scan)
}

fn wrap_union_scan(plan: PhysicalPlan, union_scan: Option<&LogicalUnionScan>) -> PhysicalPlan {
    match union_scan {
        Some(us) => PhysicalPlan::new(
            PhysicalOperator::UnionScan {
                conditions: us.conditions.clone(),
            },
            us.schema.clone(),
            plan.stats.clone(),
            vec![PhysicalProperty::unbounded()],
        )
        .with_child(plan),
        None => plan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical::JoinType;
    use crate::ranger::col_cmp_const;
    use crate::test_util::{col, data_source_builder, leaf, logical_join};
    use tessera_expr::new_function;

    fn ctx() -> SessionContext {
        SessionContext::new()
    }

    /// Inner table `t(a, b, c, d)` with a three-column index on (a, b, c).
    fn inner_source() -> (LogicalDataSource, Vec<ColumnRef>) {
        let cols = vec![col(11, "a"), col(12, "b"), col(13, "c"), col(14, "d")];
        let ds = data_source_builder(cols.clone())
            .index(30, "idx_abc", &[0, 1, 2], None)
            .build();
        (ds, cols)
    }

    #[test]
    fn key_only_template_has_point_slots() -> Result<()> {
        let (ds, cols) = inner_source();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let keys = vec![cols[0].clone(), cols[1].clone()];
        let analysis = analyze_lookup_filters(&ctx(), &index, &ds, &keys)?
            .expect("index should be usable");
        assert_eq!(analysis.ranges.len(), 1);
        assert_eq!(analysis.ranges[0].low.len(), 2);
        assert_eq!(analysis.idx_off_to_key_off, vec![Some(0), Some(1), None]);
        assert!(analysis.residuals.is_empty());
        assert!(analysis.compare_filters.is_none());
        Ok(())
    }

    #[test]
    fn unmatched_index_is_rejected() -> Result<()> {
        let (ds, cols) = inner_source();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let keys = vec![cols[3].clone()];
        assert!(analyze_lookup_filters(&ctx(), &index, &ds, &keys)?.is_none());
        Ok(())
    }

    #[test]
    fn eq_and_in_fill_the_hole_before_a_matched_key() -> Result<()> {
        // Key matches (a, c); b sits between them and must be pinned.
        let cols = vec![col(11, "a"), col(12, "b"), col(13, "c")];
        let pinned = data_source_builder(cols.clone())
            .index(30, "idx_abc", &[0, 1, 2], None)
            .pushed_cond(col_cmp_const(Operator::Eq, &cols[1], Datum::Int(7)))
            .build();
        let keys = vec![cols[0].clone(), cols[2].clone()];
        let index = pinned.possible_access_paths[1].index.clone().unwrap();
        let analysis = analyze_lookup_filters(&ctx(), &index, &pinned, &keys)?
            .expect("hole is pinned by b = 7");
        // Two key slots plus the pinned equality slot.
        assert_eq!(analysis.ranges[0].low.len(), 3);
        assert_eq!(analysis.ranges[0].low[2], Datum::Int(7));
        // The pinned predicate is re-checked after the scan.
        assert_eq!(analysis.residuals.len(), 1);

        // Without the pin the hole is fatal.
        let unpinned = data_source_builder(cols.clone())
            .index(30, "idx_abc", &[0, 1, 2], None)
            .build();
        assert!(analyze_lookup_filters(&ctx(), &index, &unpinned, &keys)?.is_none());
        Ok(())
    }

    #[test]
    fn in_lists_multiply_template_ranges() -> Result<()> {
        let cols = vec![col(11, "a"), col(12, "b")];
        let ds = data_source_builder(cols.clone())
            .index(30, "idx_ab", &[0, 1], None)
            .pushed_cond(new_function(
                Operator::In,
                DataType::Int,
                vec![
                    Expr::column(cols[1].clone()),
                    Expr::literal(1i64),
                    Expr::literal(2i64),
                    Expr::literal(3i64),
                ],
            ))
            .build();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let keys = vec![cols[0].clone()];
        let analysis = analyze_lookup_filters(&ctx(), &index, &ds, &keys)?.unwrap();
        assert_eq!(analysis.ranges.len(), 3);
        for (range, expected) in analysis.ranges.iter().zip([1i64, 2, 3]) {
            assert_eq!(range.low.len(), 2);
            assert_eq!(range.low[1], Datum::Int(expected));
            assert!(range.is_point());
        }
        Ok(())
    }

    #[test]
    fn outer_driven_bound_defers_range_building() -> Result<()> {
        let outer_x = col(1, "outer.x");
        let cols = vec![col(11, "a"), col(12, "b"), col(13, "c")];
        // b < outer.x: bound readable only once a driving row exists.
        let ds = data_source_builder(cols.clone())
            .index(30, "idx_ab", &[0, 1], None)
            .pushed_cond(new_function(
                Operator::Lt,
                DataType::Int,
                vec![Expr::column(cols[1].clone()), Expr::column(outer_x.clone())],
            ))
            .build();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let keys = vec![cols[0].clone()];
        let analysis = analyze_lookup_filters(&ctx(), &index, &ds, &keys)?.unwrap();
        let cwc = analysis.compare_filters.expect("deferred bound expected");
        assert_eq!(cwc.target_col.as_ref(), Some(&cols[1]));
        assert_eq!(cwc.op_types, vec![Operator::Lt]);
        assert_eq!(cwc.affected_col_schema, vec![outer_x]);
        // Uniform rule: the deferred column still owns a template slot.
        assert_eq!(analysis.ranges[0].low.len(), 2);
        Ok(())
    }

    #[test]
    fn reversed_comparison_normalizes_through_swap() -> Result<()> {
        let outer_x = col(1, "outer.x");
        let cols = vec![col(11, "a"), col(12, "b")];
        // outer.x >= b is b <= outer.x.
        let ds = data_source_builder(cols.clone())
            .index(30, "idx_ab", &[0, 1], None)
            .pushed_cond(new_function(
                Operator::Ge,
                DataType::Int,
                vec![Expr::column(outer_x.clone()), Expr::column(cols[1].clone())],
            ))
            .build();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let analysis =
            analyze_lookup_filters(&ctx(), &index, &ds, &[cols[0].clone()])?.unwrap();
        let cwc = analysis.compare_filters.unwrap();
        assert_eq!(cwc.op_types, vec![Operator::Le]);
        Ok(())
    }

    #[test]
    fn inner_referencing_bound_is_residual_only() -> Result<()> {
        let cols = vec![col(11, "a"), col(12, "b"), col(13, "c")];
        // b < c reads the inner schema, so it cannot drive the range.
        let ds = data_source_builder(cols.clone())
            .index(30, "idx_ab", &[0, 1], None)
            .pushed_cond(new_function(
                Operator::Lt,
                DataType::Int,
                vec![Expr::column(cols[1].clone()), Expr::column(cols[2].clone())],
            ))
            .build();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let analysis =
            analyze_lookup_filters(&ctx(), &index, &ds, &[cols[0].clone()])?.unwrap();
        assert!(analysis.compare_filters.is_none());
        assert_eq!(analysis.ranges[0].low.len(), 1);
        assert_eq!(analysis.residuals.len(), 1);
        Ok(())
    }

    #[test]
    fn static_next_column_range_extends_the_template() -> Result<()> {
        let cols = vec![col(11, "a"), col(12, "b")];
        let ds = data_source_builder(cols.clone())
            .index(30, "idx_ab", &[0, 1], None)
            .pushed_cond(col_cmp_const(Operator::Gt, &cols[1], Datum::Int(5)))
            .build();
        let index = ds.possible_access_paths[1].index.clone().unwrap();
        let analysis =
            analyze_lookup_filters(&ctx(), &index, &ds, &[cols[0].clone()])?.unwrap();
        assert!(analysis.compare_filters.is_none());
        assert_eq!(analysis.ranges[0].low.len(), 2);
        assert_eq!(analysis.ranges[0].low[1], Datum::Int(5));
        assert!(analysis.ranges[0].low_exclude);
        Ok(())
    }

    #[test]
    fn pk_fast_path_builds_a_table_lookup() -> Result<()> {
        let outer_id = col(1, "o.id");
        let outer_v = col(2, "o.v");
        let pk = col(11, "id");
        let inner_v = col(12, "v");
        let outer = leaf(vec![outer_id.clone(), outer_v.clone()], 500.0);
        let inner = LogicalPlan::DataSource(
            data_source_builder(vec![pk.clone(), inner_v.clone()])
                .pk_is_handle()
                .index(30, "idx_v", &[1], None)
                .build(),
        );
        let join = logical_join(JoinType::LeftOuter, outer, inner, &[(&outer_id, &pk)]);
        let plans =
            get_index_join_by_outer_idx(&ctx(), &join, &PhysicalProperty::unbounded(), 0)?;
        assert_eq!(plans.len(), 1);
        let PhysicalOperator::IndexJoin(ij) = &plans[0].op else {
            panic!("expected index join");
        };
        assert_eq!(ij.outer_idx, 0);
        assert_eq!(ij.inner_join_keys, vec![pk]);
        assert_eq!(ij.key_off_to_idx_off, vec![0]);
        let PhysicalOperator::TableScan(scan) = &ij.inner_plan.op else {
            panic!("pk lookup must be a table scan");
        };
        assert_eq!(scan.ranges, full_int_range(false));
        // Outer requirement inherits the property verbatim.
        assert_eq!(plans[0].children_req_props[0], PhysicalProperty::unbounded());
        Ok(())
    }

    #[test]
    fn best_index_maximizes_used_columns() -> Result<()> {
        let outer_a = col(1, "o.a");
        let outer_b = col(2, "o.b");
        let a = col(11, "a");
        let b = col(12, "b");
        let c = col(13, "c");
        let outer = leaf(vec![outer_a.clone(), outer_b.clone()], 500.0);
        let inner = LogicalPlan::DataSource(
            data_source_builder(vec![a.clone(), b.clone(), c.clone()])
                .index(30, "idx_a", &[0], None)
                .index(31, "idx_ab", &[0, 1], None)
                .build(),
        );
        let join = logical_join(
            JoinType::Inner,
            outer,
            inner,
            &[(&outer_a, &a), (&outer_b, &b)],
        );
        let plans =
            get_index_join_by_outer_idx(&ctx(), &join, &PhysicalProperty::unbounded(), 0)?;
        assert_eq!(plans.len(), 1);
        let PhysicalOperator::IndexJoin(ij) = &plans[0].op else {
            unreachable!()
        };
        assert_eq!(ij.ranges[0].low.len(), 2);
        fn find_index_scan(plan: &PhysicalPlan) -> Option<&PhysicalIndexScan> {
            if let PhysicalOperator::IndexScan(scan) = &plan.op {
                return Some(scan);
            }
            plan.children.iter().find_map(find_index_scan)
        }
        let scan = find_index_scan(&ij.inner_plan).expect("index scan in inner pipeline");
        assert_eq!(scan.index.name, "idx_ab");
        // idx_ab misses column c, so the pipeline double-reads.
        assert!(!scan.covering);
        assert!(matches!(ij.inner_plan.op, PhysicalOperator::IndexLookUp));
        Ok(())
    }

    #[test]
    fn order_from_the_inner_side_rejects_the_orientation() -> Result<()> {
        let outer_a = col(1, "o.a");
        let a = col(11, "a");
        let b = col(12, "b");
        let outer = leaf(vec![outer_a.clone()], 500.0);
        let inner = LogicalPlan::DataSource(
            data_source_builder(vec![a.clone(), b.clone()])
                .index(30, "idx_a", &[0], None)
                .build(),
        );
        let join = logical_join(JoinType::Inner, outer, inner, &[(&outer_a, &a)]);
        let prop = PhysicalProperty::with_order(vec![b.clone()], false, 10.0);
        assert!(get_index_join_by_outer_idx(&ctx(), &join, &prop, 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn unmatched_equalities_demote_to_other_conditions() -> Result<()> {
        let outer_a = col(1, "o.a");
        let outer_d = col(2, "o.d");
        let a = col(11, "a");
        let d = col(14, "d");
        let outer = leaf(vec![outer_a.clone(), outer_d.clone()], 500.0);
        let inner = LogicalPlan::DataSource(
            data_source_builder(vec![a.clone(), col(12, "b"), col(13, "c"), d.clone()])
                .index(30, "idx_a", &[0], None)
                .build(),
        );
        // Two equalities; only `a` is indexed, the `d` pair must fall back
        // to a general predicate.
        let join = logical_join(
            JoinType::Inner,
            outer,
            inner,
            &[(&outer_a, &a), (&outer_d, &d)],
        );
        let plans =
            get_index_join_by_outer_idx(&ctx(), &join, &PhysicalProperty::unbounded(), 0)?;
        let PhysicalOperator::IndexJoin(ij) = &plans[0].op else {
            unreachable!()
        };
        assert_eq!(ij.inner_join_keys, vec![a]);
        assert_eq!(ij.outer_join_keys, vec![outer_a]);
        assert_eq!(ij.other_conditions.len(), 1);
        Ok(())
    }

    #[test]
    fn inner_scan_size_comes_from_index_histograms() -> Result<()> {
        use crate::statistics::{Histogram, TableStats};
        let outer_a = col(1, "o.a");
        let a = col(11, "a");
        let b = col(12, "b");
        let mut table_stats = TableStats {
            row_count: 10_000.0,
            pseudo: false,
            index_histograms: Default::default(),
        };
        table_stats.index_histograms.insert(
            30,
            Histogram {
                distinct_count: 2_500.0,
                null_count: 0.0,
            },
        );
        let outer = leaf(vec![outer_a.clone()], 500.0);
        let inner = LogicalPlan::DataSource(
            data_source_builder(vec![a.clone(), b.clone()])
                .index(30, "idx_a", &[0], None)
                .row_count(10_000.0)
                .table_stats(table_stats)
                .build(),
        );
        let join = logical_join(JoinType::Inner, outer, inner, &[(&outer_a, &a)]);
        let plans =
            get_index_join_by_outer_idx(&ctx(), &join, &PhysicalProperty::unbounded(), 1)?;
        assert!(plans.is_empty(), "the left side has no index to look up");
        let plans =
            get_index_join_by_outer_idx(&ctx(), &join, &PhysicalProperty::unbounded(), 0)?;
        let PhysicalOperator::IndexJoin(ij) = &plans[0].op else {
            unreachable!()
        };
        // 10_000 rows over 2_500 distinct keys: four rows per lookup.
        assert_eq!(ij.inner_plan.stats.row_count, 4.0);
        Ok(())
    }

    #[test]
    fn union_scan_inner_child_is_rewrapped() -> Result<()> {
        let outer_id = col(1, "o.id");
        let pk = col(11, "id");
        let inner_v = col(12, "v");
        let ds = data_source_builder(vec![pk.clone(), inner_v.clone()])
            .pk_is_handle()
            .build();
        let ds_schema = ds.schema.clone();
        let outer = leaf(vec![outer_id.clone()], 500.0);
        let inner = LogicalPlan::UnionScan(crate::logical::LogicalUnionScan {
            conditions: vec![col_cmp_const(Operator::Gt, &inner_v, Datum::Int(0))],
            input: std::sync::Arc::new(LogicalPlan::DataSource(ds)),
            schema: ds_schema,
            stats: crate::statistics::StatsInfo::new(1000.0, vec![]),
        });
        let join = logical_join(JoinType::LeftOuter, outer, inner, &[(&outer_id, &pk)]);
        let plans =
            get_index_join_by_outer_idx(&ctx(), &join, &PhysicalProperty::unbounded(), 0)?;
        let PhysicalOperator::IndexJoin(ij) = &plans[0].op else {
            unreachable!()
        };
        let PhysicalOperator::UnionScan { conditions } = &ij.inner_plan.op else {
            panic!("inner pipeline must keep the union scan wrapper");
        };
        assert_eq!(conditions.len(), 1);
        assert!(matches!(
            ij.inner_plan.children[0].op,
            PhysicalOperator::TableScan(_)
        ));
        Ok(())
    }
}
