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

//! Physical properties: what a parent requires of a child plan, and the
//! prefix arithmetic used to decide whether an ordering can be reused.

use tessera_expr::{ColumnRef, Expr, Schema};

use crate::logical::OrderItem;

/// Where an operator must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// On the coordinator, over rows already shipped back.
    Root,
    /// Pushed to storage, single range read.
    CopSingleRead,
    /// Pushed to storage, index read followed by table lookup.
    CopDoubleRead,
}

/// Every task type an order-insensitive operator can be placed at. The
/// order is the enumeration order and must stay stable.
pub const WHOLE_TASK_TYPES: [TaskType; 3] = [
    TaskType::CopSingleRead,
    TaskType::CopDoubleRead,
    TaskType::Root,
];

/// A request made of (or an offer made by) a physical plan: placement, an
/// ordered column prefix with one direction, a row-count budget, and
/// whether the order is obtained by an explicit sort above the child.
///
/// Treated as immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalProperty {
    pub task_type: TaskType,
    pub cols: Vec<ColumnRef>,
    pub desc: bool,
    pub expected_cnt: f64,
    pub enforced: bool,
}

impl Default for PhysicalProperty {
    fn default() -> Self {
        PhysicalProperty {
            task_type: TaskType::Root,
            cols: vec![],
            desc: false,
            expected_cnt: f64::INFINITY,
            enforced: false,
        }
    }
}

impl PhysicalProperty {
    /// An order-free property with unbounded row budget.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_task_type(task_type: TaskType) -> Self {
        PhysicalProperty {
            task_type,
            ..Self::default()
        }
    }

    pub fn with_expected_cnt(expected_cnt: f64) -> Self {
        PhysicalProperty {
            expected_cnt,
            ..Self::default()
        }
    }

    pub fn with_order(cols: Vec<ColumnRef>, desc: bool, expected_cnt: f64) -> Self {
        PhysicalProperty {
            cols,
            desc,
            expected_cnt,
            ..Self::default()
        }
    }

    /// Whether no order is required.
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Whether this property's order is a prefix of `other`'s, same
    /// direction.
    pub fn is_prefix_of(&self, other: &PhysicalProperty) -> bool {
        if self.cols.len() > other.cols.len() || self.desc != other.desc {
            return false;
        }
        self.cols.iter().zip(other.cols.iter()).all(|(a, b)| a == b)
    }

    /// Whether every ordering column is available in `schema`.
    pub fn all_cols_from_schema(&self, schema: &Schema) -> bool {
        self.cols.iter().all(|c| schema.contains(c))
    }
}

/// Positions in `available` of the longest prefix of `wanted` whose every
/// column appears in `available`. Stops at the first miss; columns are
/// never skipped.
pub fn max_sort_prefix(wanted: &[ColumnRef], available: &[ColumnRef]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(wanted.len());
    for col in wanted {
        match available.iter().position(|a| a == col) {
            Some(pos) => offsets.push(pos),
            None => break,
        }
    }
    offsets
}

/// The largest `k` such that some candidate order's first `k` columns equal
/// `keys[0..k]` by identity.
pub fn max_prefix_match(candidate_orders: &[Vec<ColumnRef>], keys: &[ColumnRef]) -> usize {
    let mut best = 0;
    for candidate in candidate_orders {
        let len = candidate
            .iter()
            .zip(keys.iter())
            .take_while(|(c, k)| c == k)
            .count();
        best = best.max(len);
    }
    best
}

/// Keys at `offsets` first, then every remaining key in original order.
/// The result is always a permutation of `keys`.
pub fn reorder_by_offsets(keys: &[ColumnRef], offsets: &[usize]) -> Vec<ColumnRef> {
    let mut out = Vec::with_capacity(keys.len());
    for &off in offsets {
        out.push(keys[off].clone());
    }
    for (i, key) in keys.iter().enumerate() {
        if !offsets.contains(&i) {
            out.push(key.clone());
        }
    }
    out
}

/// When every order item is a plain column with one shared direction,
/// returns that column list and direction. Expressions cannot be passed
/// down as an order requirement.
pub fn prop_from_order_items(items: &[OrderItem]) -> Option<(Vec<ColumnRef>, bool)> {
    let mut cols = Vec::with_capacity(items.len());
    let desc = items.first().map(|item| item.desc).unwrap_or(false);
    for item in items {
        match &item.expr {
            Expr::Column(c) if item.desc == desc => cols.push(c.clone()),
            _ => return None,
        }
    }
    Some((cols, desc))
}

/// Whether `prop`'s order is satisfied by the leading `items`: each prop
/// column must equal the item's column with the prop's direction. An empty
/// property matches anything.
pub fn match_items(prop: &PhysicalProperty, items: &[OrderItem]) -> bool {
    if prop.is_empty() {
        return true;
    }
    if prop.cols.len() > items.len() {
        return false;
    }
    prop.cols.iter().zip(items.iter()).all(|(col, item)| {
        item.desc == prop.desc && item.expr.as_column().map_or(false, |c| c == col)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{col, schema_of};
    use tessera_expr::Expr;

    #[test]
    fn max_sort_prefix_identities() {
        let a = col(1, "a");
        let b = col(2, "b");
        let c = col(3, "c");
        let all = vec![a.clone(), b.clone(), c.clone()];
        assert_eq!(max_sort_prefix(&all, &all), vec![0, 1, 2]);
        assert_eq!(max_sort_prefix(&all, &[]), Vec::<usize>::new());
        // Stops at the first miss even when a later column is available.
        let wanted = vec![a.clone(), col(9, "x"), c.clone()];
        assert_eq!(max_sort_prefix(&wanted, &all), vec![0]);
        // Order of `available` does not matter, positions do.
        let shuffled = vec![c, b, a];
        assert_eq!(max_sort_prefix(&wanted, &shuffled), vec![2]);
    }

    #[test]
    fn max_prefix_match_picks_best_candidate() {
        let a = col(1, "a");
        let b = col(2, "b");
        let c = col(3, "c");
        let keys = vec![a.clone(), b.clone(), c.clone()];
        let candidates = vec![
            vec![a.clone()],
            vec![a.clone(), b.clone()],
            vec![b.clone(), a.clone(), c.clone()],
        ];
        assert_eq!(max_prefix_match(&candidates, &keys), 2);
        assert_eq!(max_prefix_match(&[], &keys), 0);
    }

    #[test]
    fn reorder_by_offsets_is_permutation() {
        let keys = vec![col(1, "a"), col(2, "b"), col(3, "c"), col(4, "d")];
        let reordered = reorder_by_offsets(&keys, &[2, 0]);
        let ids: Vec<i64> = reordered.iter().map(|c| c.unique_id).collect();
        assert_eq!(ids, vec![3, 1, 2, 4]);
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }

    #[test]
    fn prop_from_order_items_requires_plain_uniform_columns() {
        let a = col(1, "a");
        let b = col(2, "b");
        let items = vec![
            OrderItem::new(Expr::column(a.clone()), true),
            OrderItem::new(Expr::column(b.clone()), true),
        ];
        assert_eq!(prop_from_order_items(&items), Some((vec![a.clone(), b], true)));

        let mixed = vec![
            OrderItem::new(Expr::column(a.clone()), true),
            OrderItem::new(Expr::column(col(2, "b")), false),
        ];
        assert_eq!(prop_from_order_items(&mixed), None);

        let exprs = vec![OrderItem::new(Expr::literal(1i64), false)];
        assert_eq!(prop_from_order_items(&exprs), None);
        assert_eq!(prop_from_order_items(&[]), Some((vec![], false)));
    }

    #[test]
    fn prefix_and_schema_checks() {
        let a = col(1, "a");
        let b = col(2, "b");
        let short = PhysicalProperty::with_order(vec![a.clone()], false, 10.0);
        let long = PhysicalProperty::with_order(vec![a.clone(), b.clone()], false, 10.0);
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        let desc = PhysicalProperty::with_order(vec![a.clone()], true, 10.0);
        assert!(!desc.is_prefix_of(&long));
        assert!(long.all_cols_from_schema(&schema_of(&[&a, &b])));
        assert!(!long.all_cols_from_schema(&schema_of(&[&a])));
    }
}
