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

use tessera_common::{DataType, Datum, Result, TesseraError};

use crate::column::ColumnRef;
use crate::row::Row;

/// Operators a [ScalarFunction] can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Multiply,
    And,
    Or,
    In,
}

impl Operator {
    /// The operator obtained by swapping the operand sides, e.g. `a < b`
    /// is `b > a`.
    pub fn swap(&self) -> Option<Operator> {
        match self {
            Operator::Eq => Some(Operator::Eq),
            Operator::NotEq => Some(Operator::NotEq),
            Operator::Lt => Some(Operator::Gt),
            Operator::Le => Some(Operator::Ge),
            Operator::Gt => Some(Operator::Lt),
            Operator::Ge => Some(Operator::Le),
            _ => None,
        }
    }

    /// Whether this is one of the four range comparisons `< <= > >=`.
    pub fn is_range_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::In => "IN",
        };
        write!(f, "{s}")
    }
}

/// An applied function: operator plus argument expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFunction {
    pub op: Operator,
    pub args: Vec<Expr>,
    pub ret_type: DataType,
}

impl ScalarFunction {
    /// The `i`-th argument when it is a plain column.
    pub fn arg_column(&self, i: usize) -> Option<&ColumnRef> {
        self.args.get(i).and_then(Expr::as_column)
    }
}

/// A scalar expression over some operator's output row.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Constant(Datum),
    ScalarFunction(ScalarFunction),
}

/// Builds a [ScalarFunction] expression. Mirrors how upstream layers
/// construct predicates the planner later inspects.
pub fn new_function(op: Operator, ret_type: DataType, args: Vec<Expr>) -> Expr {
    Expr::ScalarFunction(ScalarFunction { op, args, ret_type })
}

impl Expr {
    pub fn column(col: ColumnRef) -> Expr {
        Expr::Column(col)
    }

    pub fn literal(datum: impl Into<Datum>) -> Expr {
        Expr::Constant(datum.into())
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Datum> {
        match self {
            Expr::Constant(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_scalar_function(&self) -> Option<&ScalarFunction> {
        match self {
            Expr::ScalarFunction(f) => Some(f),
            _ => None,
        }
    }

    /// Evaluates this expression against `row`. Comparison and logic
    /// operators yield `Int(1)`/`Int(0)`, NULL-propagating like SQL.
    pub fn eval(&self, row: &Row) -> Result<Datum> {
        match self {
            Expr::Constant(d) => Ok(d.clone()),
            Expr::Column(c) => row.value(c).cloned().ok_or_else(|| {
                TesseraError::Internal(format!("column {c} not found in row schema"))
            }),
            Expr::ScalarFunction(f) => eval_function(f, row),
        }
    }
}

fn eval_function(f: &ScalarFunction, row: &Row) -> Result<Datum> {
    let bool_datum = |b: bool| Datum::Int(b as i64);
    match f.op {
        Operator::And | Operator::Or => {
            let l = f.args[0].eval(row)?;
            let r = f.args[1].eval(row)?;
            if l.is_null() || r.is_null() {
                return Ok(Datum::Null);
            }
            let (l, r) = (l != Datum::Int(0), r != Datum::Int(0));
            Ok(bool_datum(if f.op == Operator::And {
                l && r
            } else {
                l || r
            }))
        }
        Operator::In => {
            let needle = f.args[0].eval(row)?;
            if needle.is_null() {
                return Ok(Datum::Null);
            }
            for arg in &f.args[1..] {
                if arg.eval(row)? == needle {
                    return Ok(bool_datum(true));
                }
            }
            Ok(bool_datum(false))
        }
        Operator::Plus | Operator::Minus | Operator::Multiply => {
            let l = f.args[0].eval(row)?;
            let r = f.args[1].eval(row)?;
            eval_arith(f.op, l, r)
        }
        cmp => {
            let l = f.args[0].eval(row)?;
            let r = f.args[1].eval(row)?;
            if l.is_null() || r.is_null() {
                return Ok(Datum::Null);
            }
            let ord = l.cmp(&r);
            Ok(bool_datum(match cmp {
                Operator::Eq => ord.is_eq(),
                Operator::NotEq => ord.is_ne(),
                Operator::Lt => ord.is_lt(),
                Operator::Le => ord.is_le(),
                Operator::Gt => ord.is_gt(),
                Operator::Ge => ord.is_ge(),
                _ => unreachable!(),
            }))
        }
    }
}

fn eval_arith(op: Operator, l: Datum, r: Datum) -> Result<Datum> {
    if l.is_null() || r.is_null() {
        return Ok(Datum::Null);
    }
    // Integers stay exact: widen to i128, where every i64/u64 embeds and no
    // intermediate overflows except a 64-bit by 64-bit product.
    if let (Some(wl), Some(wr)) = (l.as_i128(), r.as_i128()) {
        let v = match op {
            Operator::Plus => wl.checked_add(wr),
            Operator::Minus => wl.checked_sub(wr),
            Operator::Multiply => wl.checked_mul(wr),
            _ => unreachable!(),
        }
        .ok_or_else(|| TesseraError::Plan(format!("integer overflow in {l} {op} {r}")))?;
        if matches!((&l, &r), (Datum::UInt(_), Datum::UInt(_))) {
            if let Ok(v) = u64::try_from(v) {
                return Ok(Datum::UInt(v));
            }
        }
        return i64::try_from(v)
            .map(Datum::Int)
            .or_else(|_| u64::try_from(v).map(Datum::UInt))
            .map_err(|_| TesseraError::Plan(format!("integer overflow in {l} {op} {r}")));
    }
    // A genuine float operand is the only way here.
    let (Some(lf), Some(rf)) = (l.as_f64(), r.as_f64()) else {
        return Err(TesseraError::Plan(format!("cannot apply {op} to {l} and {r}")));
    };
    let v = match op {
        Operator::Plus => lf + rf,
        Operator::Minus => lf - rf,
        Operator::Multiply => lf * rf,
        _ => unreachable!(),
    };
    Ok(Datum::from(v))
}

/// Collects the distinct columns referenced by `expr`, in first-seen order.
pub fn extract_columns(expr: &Expr) -> Vec<ColumnRef> {
    let mut out = Vec::new();
    extract_columns_into(expr, &mut out);
    out
}

/// Accumulating form of [extract_columns]; skips columns already present.
pub fn extract_columns_into(expr: &Expr, out: &mut Vec<ColumnRef>) {
    match expr {
        Expr::Column(c) => {
            if !out.contains(c) {
                out.push(c.clone());
            }
        }
        Expr::Constant(_) => {}
        Expr::ScalarFunction(f) => {
            for arg in &f.args {
                extract_columns_into(arg, out);
            }
        }
    }
}

/// Whether the two column slices share any column, by identity.
pub fn column_slice_is_intersect(lhs: &[ColumnRef], rhs: &[ColumnRef]) -> bool {
    lhs.iter().any(|c| rhs.contains(c))
}
