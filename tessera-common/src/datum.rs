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

//! [Datum] is the single-value representation used by range construction
//! and by deferred filter evaluation. It carries the two sentinel values
//! (`MinNotNull`, `MaxValue`) that range endpoints need in addition to the
//! concrete scalar kinds.

use std::cmp::Ordering;
use std::fmt;

use ordered_float::OrderedFloat;

/// The set of scalar types the planner reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    UInt,
    Float,
    Str,
}

impl DataType {
    /// The smallest non-null datum of this type, used as an unbounded range
    /// low endpoint.
    pub fn min_datum(&self) -> Datum {
        match self {
            DataType::Int => Datum::Int(i64::MIN),
            DataType::UInt => Datum::UInt(0),
            DataType::Float => Datum::Float(OrderedFloat(f64::NEG_INFINITY)),
            DataType::Str => Datum::Str(String::new()),
        }
    }

    /// The largest datum of this type, used as an unbounded range high
    /// endpoint. Strings have no largest value so the sentinel is returned.
    pub fn max_datum(&self) -> Datum {
        match self {
            DataType::Int => Datum::Int(i64::MAX),
            DataType::UInt => Datum::UInt(u64::MAX),
            DataType::Float => Datum::Float(OrderedFloat(f64::INFINITY)),
            DataType::Str => Datum::MaxValue,
        }
    }
}

/// A single scalar value, or one of the sentinels that bound ranges.
///
/// The ordering is total: `Null < MinNotNull < concrete values < MaxValue`,
/// with integers, unsigned integers and floats comparing numerically across
/// kinds. The total order is what lets deferred range filters compare
/// consecutive driving rows without per-type comparator tables.
#[derive(Debug, Clone)]
pub enum Datum {
    /// The SQL NULL. Sorts before every value.
    Null,
    /// Sentinel strictly between NULL and all concrete values.
    MinNotNull,
    /// Sentinel after all concrete values.
    MaxValue,
    Int(i64),
    UInt(u64),
    Float(OrderedFloat<f64>),
    Str(String),
}

impl Datum {
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// The type of a concrete datum; sentinels and NULL have none.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Datum::Int(_) => Some(DataType::Int),
            Datum::UInt(_) => Some(DataType::UInt),
            Datum::Float(_) => Some(DataType::Float),
            Datum::Str(_) => Some(DataType::Str),
            Datum::Null | Datum::MinNotNull | Datum::MaxValue => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Datum::Null => 0,
            Datum::MinNotNull => 1,
            Datum::Int(_) | Datum::UInt(_) | Datum::Float(_) | Datum::Str(_) => 2,
            Datum::MaxValue => 3,
        }
    }

    /// The numeric value as `f64`; `None` for strings, sentinels and NULL.
    /// Lossy past 2^53, so integer-only comparisons and arithmetic must not
    /// go through this.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(v) => Some(*v as f64),
            Datum::UInt(v) => Some(*v as f64),
            Datum::Float(v) => Some(v.0),
            _ => None,
        }
    }

    /// The integer value widened to `i128`; `None` for everything that is
    /// not an integer. Both integer kinds embed exactly.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Datum::Int(v) => Some(*v as i128),
            Datum::UInt(v) => Some(*v as i128),
            _ => None,
        }
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match (self, other) {
            (Datum::Int(l), Datum::Int(r)) => l.cmp(r),
            (Datum::UInt(l), Datum::UInt(r)) => l.cmp(r),
            (Datum::Float(l), Datum::Float(r)) => l.cmp(r),
            (Datum::Str(l), Datum::Str(r)) => l.cmp(r),
            // Mixed-signedness integers widen and compare exactly; going
            // through f64 would collapse distinct values past 2^53.
            (Datum::Int(l), Datum::UInt(r)) => (*l as i128).cmp(&(*r as i128)),
            (Datum::UInt(l), Datum::Int(r)) => (*l as i128).cmp(&(*r as i128)),
            _ => match (self.as_f64(), other.as_f64()) {
                // Reached only when one side is a genuine float.
                (Some(l), Some(r)) => OrderedFloat(l).cmp(&OrderedFloat(r)),
                // Strings sort after numerics when kinds are mixed; the
                // planner never builds such a comparison but the order must
                // stay total.
                _ => matches!(self, Datum::Str(_)).cmp(&matches!(other, Datum::Str(_))),
            },
        }
    }
}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with the total order so that `Int(3)` and `UInt(3)`
// compare equal both ways.
impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Datum {}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "NULL"),
            Datum::MinNotNull => write!(f, "-inf"),
            Datum::MaxValue => write!(f, "+inf"),
            Datum::Int(v) => write!(f, "{v}"),
            Datum::UInt(v) => write!(f, "{v}"),
            Datum::Float(v) => write!(f, "{v}"),
            Datum::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<u64> for Datum {
    fn from(v: u64) -> Self {
        Datum::UInt(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Float(OrderedFloat(v))
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Str(v.to_owned())
    }
}
