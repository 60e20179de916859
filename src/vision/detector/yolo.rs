// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO leaf-disease detector backed by ONNX Runtime

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::postprocessing::decode_output;
use super::preprocessing::preprocess_for_detection;
use super::{ClassNames, DetectionParams, Detector, DetectorError, RawDetection};

/// ONNX metadata key under which Ultralytics stores the class table
const NAMES_METADATA_KEY: &str = "names";

/// Exported YOLO detector
///
/// The ONNX session is not shared across concurrent `run` calls; each
/// inference takes the session lock.
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Square model input size in pixels
    input_size: u32,
    /// Class index to label table
    class_names: ClassNames,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("classes", &self.class_names.len())
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from an ONNX file
    ///
    /// # Arguments
    /// - `model_path`: Path to the exported model (best.onnx)
    /// - `input_size`: Square input resolution the model was exported with
    /// - `intra_threads`: ONNX Runtime intra-op thread count
    /// - `fallback_names`: Class table used when the model has no `names` metadata
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
        intra_threads: usize,
        fallback_names: &ClassNames,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let class_names = match Self::metadata_class_names(&session) {
            Some(names) => names,
            None => {
                warn!(
                    "Model has no usable '{}' metadata, using catalog class table ({} classes)",
                    NAMES_METADATA_KEY,
                    fallback_names.len()
                );
                fallback_names.clone()
            }
        };

        debug!("Detection model input: {}, size: {}", input_name, input_size);
        info!(
            "✅ Detection model loaded (CPU-only, {} classes)",
            class_names.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size,
            class_names,
        })
    }

    fn metadata_class_names(session: &Session) -> Option<ClassNames> {
        let metadata = session.metadata().ok()?;
        let raw = metadata.custom(NAMES_METADATA_KEY).ok().flatten()?;
        ClassNames::parse_metadata(&raw).filter(|names| !names.is_empty())
    }
}

impl Detector for YoloDetector {
    fn detect(
        &self,
        image: &DynamicImage,
        params: &DetectionParams,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        let (tensor, letterbox) = preprocess_for_detection(image, self.input_size);
        let input_value = Value::from_array(tensor)?;

        let output = {
            let mut session = self.session.lock().map_err(|_| DetectorError::Poisoned)?;
            let outputs = session.run(ort::inputs![&self.input_name => input_value])?;
            outputs[0].try_extract_array::<f32>()?.to_owned()
        };

        debug!("Detection output shape: {:?}", output.shape());

        let detections = decode_output(
            output.view(),
            params,
            &letterbox,
            image.width(),
            image.height(),
        )?;

        debug!("Detected {} boxes", detections.len());
        Ok(detections)
    }

    fn class_names(&self) -> &ClassNames {
        &self.class_names
    }
}
