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

//! Scan ranges and the services that derive them from predicates: full
//! ranges, single-column range construction, and the equal/in extractor the
//! index-join analysis runs over non-key index columns.

use tessera_common::{DataType, Datum, Result, TesseraError};
use tessera_expr::{ColumnRef, Expr, Operator, ScalarFunction};

use crate::session::SessionContext;

/// One multi-column scan range. `low`/`high` hold one datum per bounded
/// index column; a range with equal low and high and inclusive ends is a
/// point.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub low: Vec<Datum>,
    pub high: Vec<Datum>,
    pub low_exclude: bool,
    pub high_exclude: bool,
}

impl Range {
    pub fn point(values: Vec<Datum>) -> Range {
        Range {
            low: values.clone(),
            high: values,
            low_exclude: false,
            high_exclude: false,
        }
    }

    pub fn is_point(&self) -> bool {
        !self.low_exclude && !self.high_exclude && self.low == self.high
    }

    /// Whether low/high describe a non-empty interval on the last bounded
    /// column.
    pub fn is_non_empty(&self) -> bool {
        match (self.low.last(), self.high.last()) {
            (Some(l), Some(h)) => match l.cmp(h) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => !self.low_exclude && !self.high_exclude,
                std::cmp::Ordering::Greater => false,
            },
            _ => true,
        }
    }
}

/// The unrestricted single-column range.
pub fn full_range() -> Vec<Range> {
    vec![Range {
        low: vec![Datum::Null],
        high: vec![Datum::MaxValue],
        low_exclude: false,
        high_exclude: false,
    }]
}

/// The unrestricted range over an integer handle column.
pub fn full_int_range(unsigned: bool) -> Vec<Range> {
    let (low, high) = if unsigned {
        (DataType::UInt.min_datum(), DataType::UInt.max_datum())
    } else {
        (DataType::Int.min_datum(), DataType::Int.max_datum())
    };
    vec![Range {
        low: vec![low],
        high: vec![high],
        low_exclude: false,
        high_exclude: false,
    }]
}

/// A comparison of `col` against a constant, normalized so the column is on
/// the left.
fn as_col_constant_cmp<'a>(
    expr: &'a Expr,
    col: &ColumnRef,
) -> Option<(Operator, &'a Datum)> {
    let f = expr.as_scalar_function()?;
    match f.op {
        Operator::Eq | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            match (&f.args[0], &f.args[1]) {
                (Expr::Column(c), Expr::Constant(d)) if c == col => Some((f.op, d)),
                (Expr::Constant(d), Expr::Column(c)) if c == col => {
                    f.op.swap().map(|op| (op, d))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// An `IN (consts...)` over `col`.
fn as_col_in_list<'a>(expr: &'a Expr, col: &ColumnRef) -> Option<Vec<&'a Datum>> {
    let f = expr.as_scalar_function()?;
    if f.op != Operator::In || f.arg_column(0) != Some(col) {
        return None;
    }
    f.args[1..]
        .iter()
        .map(Expr::as_constant)
        .collect::<Option<Vec<_>>>()
}

/// Builds the ranges over `col` implied by constant comparisons and `IN`
/// lists in `conds`. Conditions not constraining `col` are ignored; an
/// unsatisfiable conjunction yields an empty vector.
pub fn build_column_range(
    _ctx: &SessionContext,
    conds: &[Expr],
    col: &ColumnRef,
) -> Result<Vec<Range>> {
    let mut points: Option<Vec<Datum>> = None;
    let mut low = Datum::Null;
    let mut low_exclude = false;
    let mut high = Datum::MaxValue;
    let mut high_exclude = false;

    for cond in conds {
        if let Some(values) = as_col_in_list(cond, col) {
            let values: Vec<Datum> = values.into_iter().cloned().collect();
            points = Some(match points {
                None => values,
                Some(prev) => prev.into_iter().filter(|v| values.contains(v)).collect(),
            });
            continue;
        }
        let Some((op, value)) = as_col_constant_cmp(cond, col) else {
            continue;
        };
        if value.is_null() {
            // Comparison with NULL never matches.
            return Ok(vec![]);
        }
        match op {
            Operator::Eq => {
                points = Some(match points {
                    None => vec![value.clone()],
                    Some(prev) => prev.into_iter().filter(|v| v == value).collect(),
                });
            }
            Operator::Lt | Operator::Le => {
                let exclude = op == Operator::Lt;
                if value < &high || (value == &high && exclude && !high_exclude) {
                    high = value.clone();
                    high_exclude = exclude;
                }
            }
            Operator::Gt | Operator::Ge => {
                let exclude = op == Operator::Gt;
                if value > &low || (value == &low && exclude && !low_exclude) {
                    low = value.clone();
                    low_exclude = exclude;
                }
            }
            other => {
                return Err(TesseraError::Internal(format!(
                    "unexpected operator {other} in column range construction"
                )))
            }
        }
    }

    let within_bounds = |v: &Datum| {
        let above = match v.cmp(&low) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => !low_exclude && !matches!(low, Datum::Null),
            std::cmp::Ordering::Less => false,
        };
        let below = match v.cmp(&high) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => !high_exclude,
            std::cmp::Ordering::Greater => false,
        };
        above && below
    };

    if let Some(mut points) = points {
        points.sort();
        points.dedup();
        return Ok(points
            .into_iter()
            .filter(within_bounds)
            .map(|v| Range::point(vec![v]))
            .collect());
    }

    let range = Range {
        low: vec![low],
        high: vec![high],
        low_exclude,
        high_exclude,
    };
    Ok(if range.is_non_empty() { vec![range] } else { vec![] })
}

/// Result of [extract_eq_and_in_condition]: per-column equal/in predicates
/// forming a contiguous prefix over the probed columns, plus everything the
/// extraction could not consume.
#[derive(Debug, Default)]
pub struct EqAndInExtraction {
    /// `accesses[i]` is the equal/in predicate pinned to `cols[i]`, `None`
    /// once the prefix breaks.
    pub accesses: Vec<Option<Expr>>,
    /// Conditions not consumed as accesses.
    pub remained: Vec<Expr>,
}

impl EqAndInExtraction {
    /// The consumed predicates, in column order.
    pub fn eq_and_in(&self) -> Vec<Expr> {
        self.accesses.iter().flatten().cloned().collect()
    }
}

/// Pins equal/in predicates from `conds` onto `cols`, column by column,
/// stopping at the first column with no such predicate: accesses past a gap
/// cannot narrow an index scan. Every condition that is not pinned is
/// returned in `remained`, including equality predicates made redundant by
/// an earlier pin on the same column.
pub fn extract_eq_and_in_condition(
    _ctx: &SessionContext,
    conds: &[Expr],
    cols: &[ColumnRef],
) -> EqAndInExtraction {
    let mut used = vec![false; conds.len()];
    let mut accesses: Vec<Option<Expr>> = Vec::with_capacity(cols.len());
    for col in cols {
        let found = conds.iter().enumerate().find(|(i, cond)| {
            !used[*i] && is_eq_or_in_on_col(cond, col)
        });
        match found {
            Some((i, cond)) => {
                used[i] = true;
                accesses.push(Some(cond.clone()));
            }
            None => {
                accesses.push(None);
                break;
            }
        }
    }
    let remained = conds
        .iter()
        .enumerate()
        .filter(|(i, _)| !used[*i])
        .map(|(_, c)| c.clone())
        .collect();
    EqAndInExtraction { accesses, remained }
}

fn is_eq_or_in_on_col(cond: &Expr, col: &ColumnRef) -> bool {
    let Some(f) = cond.as_scalar_function() else {
        return false;
    };
    match f.op {
        Operator::Eq => match (&f.args[0], &f.args[1]) {
            (Expr::Column(c), Expr::Constant(_)) | (Expr::Constant(_), Expr::Column(c)) => {
                c == col
            }
            _ => false,
        },
        Operator::In => {
            f.arg_column(0) == Some(col)
                && f.args[1..].iter().all(|a| a.as_constant().is_some())
        }
        _ => false,
    }
}

/// Splits `conds` into the constant comparisons and `IN` lists that can
/// bound a range on `col` (`accesses`) and everything else (`remained`).
pub fn detach_conds_for_column(
    _ctx: &SessionContext,
    conds: &[Expr],
    col: &ColumnRef,
) -> (Vec<Expr>, Vec<Expr>) {
    let mut accesses = Vec::new();
    let mut remained = Vec::new();
    for cond in conds {
        let access = as_col_constant_cmp(cond, col).is_some()
            || as_col_in_list(cond, col).is_some();
        if access {
            accesses.push(cond.clone());
        } else {
            remained.push(cond.clone());
        }
    }
    (accesses, remained)
}

/// The constant values an equal/in access predicate pins its column to.
pub fn access_values(access: &Expr) -> Result<Vec<Datum>> {
    let f = access.as_scalar_function().ok_or_else(|| {
        TesseraError::Internal("access predicate is not a function".to_string())
    })?;
    match f.op {
        Operator::Eq => {
            let value = f.args.iter().find_map(Expr::as_constant).ok_or_else(|| {
                TesseraError::Internal("equal access without constant side".to_string())
            })?;
            Ok(vec![value.clone()])
        }
        Operator::In => f.args[1..]
            .iter()
            .map(|a| {
                a.as_constant().cloned().ok_or_else(|| {
                    TesseraError::Internal("IN access with non-constant item".to_string())
                })
            })
            .collect(),
        other => Err(TesseraError::Internal(format!(
            "access predicate with operator {other}"
        ))),
    }
}

/// Convenience for tests and analysis: `col op const` as an [Expr].
pub fn col_cmp_const(op: Operator, col: &ColumnRef, value: Datum) -> Expr {
    Expr::ScalarFunction(ScalarFunction {
        op,
        args: vec![Expr::column(col.clone()), Expr::Constant(value)],
        ret_type: DataType::Int,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::col;
    use tessera_expr::new_function;

    fn ctx() -> SessionContext {
        SessionContext::new()
    }

    #[test]
    fn full_ranges() {
        assert_eq!(full_range()[0].low, vec![Datum::Null]);
        assert_eq!(full_int_range(false)[0].low, vec![Datum::Int(i64::MIN)]);
        assert_eq!(full_int_range(true)[0].high, vec![Datum::UInt(u64::MAX)]);
    }

    #[test]
    fn column_range_from_bounds() -> Result<()> {
        let a = col(1, "a");
        let conds = vec![
            col_cmp_const(Operator::Ge, &a, Datum::Int(3)),
            col_cmp_const(Operator::Lt, &a, Datum::Int(10)),
            // Reversed operand order normalizes through the swap table.
            new_function(
                Operator::Ge,
                DataType::Int,
                vec![Expr::literal(8i64), Expr::column(a.clone())],
            ),
        ];
        let ranges = build_column_range(&ctx(), &conds, &a)?;
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].low, vec![Datum::Int(3)]);
        assert_eq!(ranges[0].high, vec![Datum::Int(8)]);
        assert!(!ranges[0].low_exclude);
        assert!(!ranges[0].high_exclude);
        Ok(())
    }

    #[test]
    fn column_range_from_points() -> Result<()> {
        let a = col(1, "a");
        let in_list = new_function(
            Operator::In,
            DataType::Int,
            vec![
                Expr::column(a.clone()),
                Expr::literal(5i64),
                Expr::literal(1i64),
                Expr::literal(9i64),
            ],
        );
        let conds = vec![in_list, col_cmp_const(Operator::Le, &a, Datum::Int(5))];
        let ranges = build_column_range(&ctx(), &conds, &a)?;
        assert_eq!(
            ranges,
            vec![
                Range::point(vec![Datum::Int(1)]),
                Range::point(vec![Datum::Int(5)]),
            ]
        );
        Ok(())
    }

    #[test]
    fn unsatisfiable_ranges_are_empty() -> Result<()> {
        let a = col(1, "a");
        let conds = vec![
            col_cmp_const(Operator::Gt, &a, Datum::Int(10)),
            col_cmp_const(Operator::Lt, &a, Datum::Int(10)),
        ];
        assert!(build_column_range(&ctx(), &conds, &a)?.is_empty());
        let with_null = vec![col_cmp_const(Operator::Eq, &a, Datum::Null)];
        assert!(build_column_range(&ctx(), &with_null, &a)?.is_empty());
        Ok(())
    }

    #[test]
    fn eq_and_in_extraction_stops_at_gap() {
        let a = col(1, "a");
        let b = col(2, "b");
        let c = col(3, "c");
        let conds = vec![
            col_cmp_const(Operator::Eq, &a, Datum::Int(1)),
            col_cmp_const(Operator::Gt, &b, Datum::Int(0)),
            col_cmp_const(Operator::Eq, &c, Datum::Int(3)),
        ];
        let extraction =
            extract_eq_and_in_condition(&ctx(), &conds, &[a, b, c]);
        // `b` has no equal/in predicate, so extraction stops there and the
        // predicate on `c` stays residual.
        assert_eq!(extraction.eq_and_in().len(), 1);
        assert_eq!(extraction.accesses[1], None);
        assert_eq!(extraction.remained.len(), 2);
    }

    #[test]
    fn access_values_expand_in_lists() -> Result<()> {
        let a = col(1, "a");
        let in_list = new_function(
            Operator::In,
            DataType::Int,
            vec![Expr::column(a.clone()), Expr::literal(2i64), Expr::literal(4i64)],
        );
        assert_eq!(access_values(&in_list)?, vec![Datum::Int(2), Datum::Int(4)]);
        let eq = col_cmp_const(Operator::Eq, &a, Datum::Int(7));
        assert_eq!(access_values(&eq)?, vec![Datum::Int(7)]);
        Ok(())
    }
}
