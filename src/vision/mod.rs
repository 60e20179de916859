// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for leaf disease detection
//!
//! This module provides:
//! - Upload decoding (`image_utils`)
//! - YOLO detection via ONNX Runtime (`detector`)
//! - Ownership of the once-loaded model (`model_manager`)
//!
//! Inference runs on CPU only.

pub mod detector;
pub mod image_utils;
pub mod model_manager;

pub use detector::{ClassNames, DetectionParams, Detector, DetectorError, RawDetection};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo, MAX_IMAGE_BYTES};
pub use model_manager::{VisionModelConfig, VisionModelManager};
