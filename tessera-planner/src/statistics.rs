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

//! Row-count estimates attached to plans, and the table-level statistics
//! the index-join path consults to size an inner lookup.

use std::collections::HashMap;

/// Derived statistics for one operator's output.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsInfo {
    pub row_count: f64,
    /// Estimated distinct values per output column, aligned with the
    /// operator's schema.
    pub cardinality: Vec<f64>,
}

impl StatsInfo {
    pub fn new(row_count: f64, cardinality: Vec<f64>) -> Self {
        StatsInfo {
            row_count,
            cardinality,
        }
    }

    /// Statistics scaled down to the number of rows the parent will
    /// actually consume. A budget at or above the estimate changes nothing.
    pub fn scale_by_expect_cnt(&self, expected_cnt: f64) -> StatsInfo {
        if expected_cnt >= self.row_count {
            return self.clone();
        }
        let factor = expected_cnt / self.row_count;
        StatsInfo {
            row_count: expected_cnt,
            cardinality: self.cardinality.iter().map(|c| c * factor).collect(),
        }
    }
}

/// Histogram summary for one index, enough to answer "how many rows does
/// one distinct key match".
#[derive(Debug, Clone)]
pub struct Histogram {
    pub distinct_count: f64,
    pub null_count: f64,
}

impl Histogram {
    /// Average matching rows per distinct value given the table row count.
    pub fn avg_count_per_value(&self, table_count: f64) -> f64 {
        if self.distinct_count <= 0.0 {
            return pseudo_less_rate(table_count);
        }
        ((table_count - self.null_count) / self.distinct_count).max(1.0)
    }
}

const PSEUDO_EQUAL_RATE: f64 = 1000.0;

fn pseudo_less_rate(table_count: f64) -> f64 {
    (table_count / PSEUDO_EQUAL_RATE).max(1.0)
}

/// Collected statistics for one table. `pseudo` marks tables that have
/// never been analyzed; estimates then fall back to fixed rates.
#[derive(Debug, Clone)]
pub struct TableStats {
    pub row_count: f64,
    pub pseudo: bool,
    /// Keyed by index id.
    pub index_histograms: HashMap<i64, Histogram>,
}

impl TableStats {
    pub fn pseudo_table(row_count: f64) -> Self {
        TableStats {
            row_count,
            pseudo: true,
            index_histograms: HashMap::new(),
        }
    }

    /// Average matching rows per distinct value when no histogram exists.
    pub fn pseudo_avg_count_per_value(&self) -> f64 {
        pseudo_less_rate(self.row_count)
    }

    /// Estimated rows one point lookup on `index_id` returns.
    pub fn avg_count_per_index_value(&self, index_id: i64) -> f64 {
        if self.pseudo {
            return self.pseudo_avg_count_per_value();
        }
        match self.index_histograms.get(&index_id) {
            Some(hist) => hist.avg_count_per_value(self.row_count),
            None => self.pseudo_avg_count_per_value(),
        }
    }
}
