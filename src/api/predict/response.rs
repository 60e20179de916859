// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};

use crate::diagnosis::{Detection, Summary};

/// Decoded image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Response from `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Size of the uploaded image
    pub image: ImageSize,
    /// Detections in model output order
    pub predictions: Vec<Detection>,
    /// Per-label aggregation and top label
    pub summary: Summary,
    /// Inference plus aggregation time in milliseconds
    pub elapsed_ms: u64,
}

impl PredictResponse {
    pub fn new(width: u32, height: u32, predictions: Vec<Detection>, elapsed_ms: u64) -> Self {
        let summary = Summary::from_detections(&predictions);
        Self {
            image: ImageSize { width, height },
            predictions,
            summary,
            elapsed_ms,
        }
    }
}
