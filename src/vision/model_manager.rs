// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager owning the once-loaded leaf detector

use std::path::PathBuf;
use std::sync::Arc;

use crate::vision::detector::preprocessing::DEFAULT_INPUT_SIZE;
use crate::vision::detector::{ClassNames, Detector, YoloDetector};

/// Configuration for loading the detection model
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// Path to the exported ONNX model
    pub model_path: PathBuf,
    /// Square input resolution of the model
    pub input_size: u32,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/best.onnx"),
            input_size: DEFAULT_INPUT_SIZE,
            intra_threads: 4,
        }
    }
}

/// Manager for the leaf detection model
///
/// The detector is loaded once at startup and shared read-only by every
/// request handler.
#[derive(Clone)]
pub struct VisionModelManager {
    detector: Arc<dyn Detector>,
    model_path: String,
}

impl VisionModelManager {
    /// Load the YOLO detector described by `config`
    ///
    /// `fallback_names` is used when the model carries no class metadata.
    pub fn load(config: &VisionModelConfig, fallback_names: &ClassNames) -> anyhow::Result<Self> {
        let detector = YoloDetector::load(
            &config.model_path,
            config.input_size,
            config.intra_threads,
            fallback_names,
        )?;
        tracing::info!(
            "✅ Leaf detector ready from {}",
            config.model_path.display()
        );

        Ok(Self::with_detector(
            Arc::new(detector),
            config.model_path.display().to_string(),
        ))
    }

    /// Wrap an already constructed detector
    pub fn with_detector(detector: Arc<dyn Detector>, model_path: impl Into<String>) -> Self {
        Self {
            detector,
            model_path: model_path.into(),
        }
    }

    /// Shared handle to the detector
    pub fn detector(&self) -> Arc<dyn Detector> {
        self.detector.clone()
    }

    /// Path the model was loaded from, as reported by `/health`
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Class index to label table of the loaded model
    pub fn class_names(&self) -> &ClassNames {
        self.detector.class_names()
    }
}
