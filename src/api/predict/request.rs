// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction request parameters and upload validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::detector::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};
use crate::vision::{DetectionParams, MAX_IMAGE_BYTES};

/// Name of the multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

fn default_conf() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_iou() -> f32 {
    DEFAULT_IOU_THRESHOLD
}

/// Query string of `POST /predict`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictQuery {
    /// Minimum confidence for a detection (0.0-1.0)
    #[serde(default = "default_conf")]
    pub conf: f32,

    /// IoU threshold for non-maximum suppression (0.0-1.0)
    #[serde(default = "default_iou")]
    pub iou: f32,
}

impl Default for PredictQuery {
    fn default() -> Self {
        Self {
            conf: default_conf(),
            iou: default_iou(),
        }
    }
}

impl PredictQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        check_unit_interval("conf", self.conf)?;
        check_unit_interval("iou", self.iou)
    }

    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            confidence_threshold: self.conf,
            iou_threshold: self.iou,
            ..DetectionParams::default()
        }
    }
}

fn check_unit_interval(field: &str, value: f32) -> Result<(), ApiError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::validation(
            field,
            format!("{} must be within [0, 1], got {}", field, value),
        ))
    }
}

/// Reject uploads whose declared content type is not `image/*`
///
/// Runs before any byte of the field is read.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    match content_type {
        Some(ct) if ct.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        _ => Err(ApiError::InvalidRequest(
            "Please upload an image file".to_string(),
        )),
    }
}

/// Reject uploads strictly larger than [`MAX_IMAGE_BYTES`]
pub fn validate_payload_size(size: usize) -> Result<(), ApiError> {
    if size > MAX_IMAGE_BYTES {
        tracing::warn!("Upload of {} bytes exceeds {} bytes", size, MAX_IMAGE_BYTES);
        return Err(ApiError::PayloadTooLarge {
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}
