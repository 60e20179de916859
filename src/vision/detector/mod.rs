// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Leaf disease detector
//!
//! Components:
//! - `class_names` - Class index to label table (model metadata or catalog)
//! - `preprocessing` - Letterbox resize and NCHW tensor conversion
//! - `postprocessing` - YOLO output decoding and per-class NMS
//! - `yolo` - ONNX Runtime backed detector

pub mod class_names;
pub mod postprocessing;
pub mod preprocessing;
pub mod yolo;

use image::DynamicImage;
use thiserror::Error;

pub use class_names::ClassNames;
pub use yolo::YoloDetector;

/// Default confidence threshold for `/predict`
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Default IoU threshold for `/predict`
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Upper bound on detections returned for one image
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

/// Thresholds applied to one detection call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Minimum class score for a candidate box
    pub confidence_threshold: f32,
    /// Overlap above which a lower scoring box of the same class is suppressed
    pub iou_threshold: f32,
    /// Maximum number of boxes kept after NMS
    pub max_detections: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
        }
    }
}

/// One box reported by the model, in original image pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Corner coordinates `[x1, y1, x2, y2]`, not yet clamped
    pub xyxy: [f32; 4],
    /// Class score (0.0-1.0)
    pub confidence: f32,
    /// Index into the model's class table
    pub class_id: u32,
}

/// Errors raised while running the detector
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Unexpected model output shape: {0:?}")]
    UnexpectedOutput(Vec<usize>),

    #[error("Detector session lock poisoned")]
    Poisoned,
}

/// Object detector consumed by the HTTP layer
///
/// Implementations must be safe to share across request handlers. Calls may
/// block for the duration of inference and are run on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait Detector: Send + Sync {
    /// Detect objects in a decoded RGB image
    fn detect(
        &self,
        image: &DynamicImage,
        params: &DetectionParams,
    ) -> Result<Vec<RawDetection>, DetectorError>;

    /// Class index to label table
    fn class_names(&self) -> &ClassNames;
}
