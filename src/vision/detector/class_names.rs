// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class index to label table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from model class index to human-readable label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassNames(BTreeMap<u32, String>);

impl ClassNames {
    pub fn new(names: BTreeMap<u32, String>) -> Self {
        Self(names)
    }

    /// Label for a class index; unknown indices fall back to the decimal index
    pub fn label_for(&self, class_id: u32) -> String {
        self.0
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| class_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<u32, String> {
        &self.0
    }

    /// Parse the `names` entry Ultralytics writes into ONNX metadata
    ///
    /// The value is a Python dict literal such as
    /// `{0: 'Durian Leaf Rust Disease', 1: "Rambutan's blight"}`, which is
    /// also a YAML flow mapping. Returns `None` when it does not map
    /// integer indices to labels.
    pub fn parse_metadata(raw: &str) -> Option<Self> {
        serde_yaml::from_str::<BTreeMap<u32, String>>(raw)
            .ok()
            .map(Self::new)
    }
}

impl FromIterator<(u32, String)> for ClassNames {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
