// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request label aggregation and top-label selection

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::Detection;

/// Count and best confidence for one label within a request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelAggregate {
    pub count: u32,
    pub max_conf: f32,
}

impl LabelAggregate {
    /// Ordering key: more detections first, then higher confidence
    fn outranks(&self, other: &LabelAggregate) -> bool {
        self.count > other.count || (self.count == other.count && self.max_conf > other.max_conf)
    }
}

/// Summary of all detections in one response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Label with the highest (count, max_conf); `None` when nothing was detected
    pub top_label: Option<String>,
    /// Aggregate per label
    pub by_label: BTreeMap<String, LabelAggregate>,
}

impl Summary {
    pub fn from_detections(detections: &[Detection]) -> Self {
        summarize(detections.iter().map(|d| (d.label.as_str(), d.confidence)))
    }
}

/// Aggregate `(label, confidence)` pairs in a single pass
///
/// On a full tie (same count and same max confidence) the label seen first
/// in the input wins.
pub fn summarize<'a, I>(items: I) -> Summary
where
    I: IntoIterator<Item = (&'a str, f32)>,
{
    let mut order: Vec<(&'a str, LabelAggregate)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for (label, confidence) in items {
        let slot = *index.entry(label).or_insert_with(|| {
            order.push((
                label,
                LabelAggregate {
                    count: 0,
                    max_conf: 0.0,
                },
            ));
            order.len() - 1
        });
        let agg = &mut order[slot].1;
        agg.count += 1;
        agg.max_conf = agg.max_conf.max(confidence);
    }

    let mut top: Option<&(&str, LabelAggregate)> = None;
    for entry in &order {
        match top {
            Some((_, best)) if !entry.1.outranks(best) => {}
            _ => top = Some(entry),
        }
    }

    Summary {
        top_label: top.map(|(label, _)| label.to_string()),
        by_label: order
            .iter()
            .map(|(label, agg)| (label.to_string(), *agg))
            .collect(),
    }
}
