// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handler

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartError};
use image::DynamicImage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::request::{validate_content_type, validate_payload_size, PredictQuery, IMAGE_FIELD};
use super::response::PredictResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::diagnosis::diagnose;
use crate::vision::{
    decode_image_bytes, DetectionParams, Detector, ImageError, RawDetection, MAX_IMAGE_BYTES,
};

/// POST /predict - Detect leaf diseases in an uploaded photo
///
/// # Request
/// - multipart field `image`: the photo, with an `image/*` content type
/// - query `conf`: minimum confidence, defaults to 0.25
/// - query `iou`: NMS IoU threshold, defaults to 0.45
///
/// # Response
/// - `image`: decoded width and height
/// - `predictions`: labelled detections with clamped boxes and advice
/// - `summary`: per-label counts, best confidence and the top label
/// - `elapsed_ms`: inference plus aggregation time
///
/// # Errors
/// - 400 Bad Request: missing field, non-image content type, undecodable image, bad thresholds
/// - 413 Payload Too Large: upload above 8 MiB
/// - 500 Internal Server Error: inference failed
/// - 504 Gateway Timeout: inference exceeded the configured timeout
pub async fn predict_handler(
    State(state): State<AppState>,
    query: Result<Query<PredictQuery>, QueryRejection>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::InvalidRequest(format!("Invalid query string: {}", rejection.body_text()))
    })?;
    debug!("Predict request received (conf={}, iou={})", query.conf, query.iou);

    query.validate()?;

    let bytes = read_image_field(&mut multipart).await?;
    validate_payload_size(bytes.len())?;

    let (image, image_info) = decode_image_bytes(&bytes).map_err(|e| match e {
        ImageError::TooLarge(_, limit) => ApiError::PayloadTooLarge { limit },
        other => ApiError::InvalidRequest(format!("Invalid image: {}", other)),
    })?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let started = Instant::now();
    let raw = detect_with_timeout(
        state.vision.detector(),
        image,
        query.detection_params(),
        state.inference_timeout,
    )
    .await?;

    let predictions = diagnose(&raw, state.vision.class_names(), &state.catalog);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let response = PredictResponse::new(image_info.width, image_info.height, predictions, elapsed_ms);

    info!(
        "Prediction complete: {} detections, top label {:?}, {}ms",
        response.predictions.len(),
        response.summary.top_label,
        elapsed_ms
    );

    Ok(Json(response))
}

/// Find the `image` field and read it, checking its content type first
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        validate_content_type(field.content_type())?;
        return field.bytes().await.map_err(multipart_error);
    }

    Err(ApiError::validation(IMAGE_FIELD, "image field is required"))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            limit: MAX_IMAGE_BYTES,
        }
    } else {
        ApiError::InvalidRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

/// Run the detector on the blocking pool, bounded by `timeout`
pub async fn detect_with_timeout(
    detector: Arc<dyn Detector>,
    image: DynamicImage,
    params: DetectionParams,
    timeout: Duration,
) -> Result<Vec<RawDetection>, ApiError> {
    let task = tokio::task::spawn_blocking(move || detector.detect(&image, &params));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(raw))) => Ok(raw),
        Ok(Ok(Err(e))) => {
            error!("Inference failed: {}", e);
            Err(ApiError::InternalError(e.to_string()))
        }
        Ok(Err(join_err)) => {
            error!("Inference task aborted: {}", join_err);
            Err(ApiError::InternalError(join_err.to_string()))
        }
        Err(_) => Err(ApiError::Timeout),
    }
}
