// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turns raw model boxes into labelled, disease-classified detections

pub mod aggregate;
pub mod bbox;

use serde::{Deserialize, Serialize};

use crate::catalog::{Advice, DiseaseCatalog};
use crate::vision::{ClassNames, RawDetection};

pub use aggregate::{summarize, LabelAggregate, Summary};
pub use bbox::BoundingBox;

/// One labelled detection returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub class_id: u32,
    pub label: String,
    pub is_disease: bool,
    /// Present only for disease labels with a registered advisory
    pub advice: Option<Advice>,
}

impl Detection {
    pub fn from_raw(raw: &RawDetection, names: &ClassNames, catalog: &DiseaseCatalog) -> Self {
        let label = names.label_for(raw.class_id);
        let is_disease = catalog.is_disease(&label);
        let advice = if is_disease {
            catalog.advice_for(&label).cloned()
        } else {
            None
        };

        Self {
            bbox: BoundingBox::clamped(raw.xyxy),
            confidence: raw.confidence,
            class_id: raw.class_id,
            label,
            is_disease,
            advice,
        }
    }
}

/// Label, classify and clamp every raw detection, preserving model order
pub fn diagnose(raw: &[RawDetection], names: &ClassNames, catalog: &DiseaseCatalog) -> Vec<Detection> {
    raw.iter()
        .map(|r| Detection::from_raw(r, names, catalog))
        .collect()
}
