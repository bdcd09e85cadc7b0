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

//! Aggregation enumerators: the hash implementation for order-free
//! requests, and the stream implementation whenever a child ordering can
//! line the groups up.

use tessera_common::Result;

use crate::logical::{AggMode, LogicalAggregation};
use crate::physical::{PhysicalAggregation, PhysicalOperator, PhysicalPlan};
use crate::property::{max_sort_prefix, PhysicalProperty, TaskType, WHOLE_TASK_TYPES};

pub fn aggregation_plans(
    agg: &LogicalAggregation,
    prop: &PhysicalProperty,
) -> Result<Vec<PhysicalPlan>> {
    let mut plans = get_hash_aggs(agg, prop);
    plans.extend(get_stream_aggs(agg, prop));
    Ok(plans)
}

fn get_hash_aggs(agg: &LogicalAggregation, prop: &PhysicalProperty) -> Vec<PhysicalPlan> {
    if !prop.is_empty() {
        return vec![];
    }
    WHOLE_TASK_TYPES
        .iter()
        .map(|&task_type| {
            PhysicalPlan::new(
                PhysicalOperator::HashAgg(PhysicalAggregation {
                    group_by_items: agg.group_by_items.clone(),
                    agg_funcs: agg.agg_funcs.clone(),
                }),
                agg.schema.clone(),
                agg.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![PhysicalProperty::with_task_type(task_type)],
            )
        })
        .collect()
}

/// Stream aggregation needs plain-column grouping, no final-mode function,
/// and a child ordering whose prefix covers every group column. The child
/// keeps that prefix as its requirement and its row budget grows by the
/// input-to-output ratio, since each output group consumes several input
/// rows. A double read cannot keep its two halves aligned on the order, so
/// only the single-read and root placements are offered.
fn get_stream_aggs(agg: &LogicalAggregation, prop: &PhysicalProperty) -> Vec<PhysicalPlan> {
    let Some(group_by_cols) = agg.group_by_cols() else {
        return vec![];
    };
    if agg.agg_funcs.iter().any(|f| f.mode == AggMode::Final) {
        return vec![];
    }
    let input_rows = agg.input.stats().row_count;
    let child_cnt = if agg.stats.row_count > 0.0 {
        (prop.expected_cnt * input_rows / agg.stats.row_count).max(prop.expected_cnt)
    } else {
        prop.expected_cnt
    };
    let mut plans = Vec::new();
    for child_order in &agg.possible_properties {
        let offsets = max_sort_prefix(child_order, &group_by_cols);
        if offsets.len() != group_by_cols.len() {
            continue;
        }
        let order_prefix = child_order[..group_by_cols.len()].to_vec();
        let child_prop = PhysicalProperty::with_order(order_prefix, prop.desc, child_cnt);
        if !prop.is_empty() && !prop.is_prefix_of(&child_prop) {
            continue;
        }
        for task_type in [TaskType::CopSingleRead, TaskType::Root] {
            let mut child_prop = child_prop.clone();
            child_prop.task_type = task_type;
            plans.push(PhysicalPlan::new(
                PhysicalOperator::StreamAgg(PhysicalAggregation {
                    group_by_items: agg.group_by_items.clone(),
                    agg_funcs: agg.agg_funcs.clone(),
                }),
                agg.schema.clone(),
                agg.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![child_prop],
            ));
        }
    }
    plans
}
