// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-maximum suppression

use ndarray::{ArrayViewD, IxDyn};
use std::collections::HashMap;

use super::preprocessing::Letterbox;
use super::{DetectionParams, DetectorError, RawDetection};

/// Decode a YOLOv8-style output tensor into detections
///
/// Accepts `[1, 4 + nc, N]` (the default export) and the transposed
/// `[1, N, 4 + nc]` layout. Each candidate carries `cx, cy, w, h` in model
/// pixels followed by one score per class. Boxes are mapped back through the
/// letterbox and clipped to the original image bounds.
pub fn decode_output(
    output: ArrayViewD<f32>,
    params: &DetectionParams,
    letterbox: &Letterbox,
    img_width: u32,
    img_height: u32,
) -> Result<Vec<RawDetection>, DetectorError> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(DetectorError::UnexpectedOutput(shape));
    }

    let channels_first = shape[1] <= shape[2];
    let (num_attrs, num_boxes) = if channels_first {
        (shape[1], shape[2])
    } else {
        (shape[2], shape[1])
    };
    if num_attrs <= 4 {
        return Err(DetectorError::UnexpectedOutput(shape));
    }
    let num_classes = num_attrs - 4;

    let at = |attr: usize, i: usize| {
        if channels_first {
            output[IxDyn(&[0, attr, i])]
        } else {
            output[IxDyn(&[0, i, attr])]
        }
    };

    let max_x = img_width as f32;
    let max_y = img_height as f32;
    let mut candidates = Vec::new();

    for i in 0..num_boxes {
        let mut best_score = 0.0;
        let mut best_class = 0u32;
        for class_idx in 0..num_classes {
            let score = at(4 + class_idx, i);
            if score > best_score {
                best_score = score;
                best_class = class_idx as u32;
            }
        }

        if best_score < params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);

        candidates.push(RawDetection {
            xyxy: [x1.min(max_x), y1.min(max_y), x2.min(max_x), y2.min(max_y)],
            confidence: best_score,
            class_id: best_class,
        });
    }

    let mut detections = nms(candidates, params.iou_threshold);
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    detections.truncate(params.max_detections);

    Ok(detections)
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - inter;

    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Class-aware non-maximum suppression
pub fn nms(detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    if detections.is_empty() {
        return detections;
    }

    let mut class_groups: HashMap<u32, Vec<RawDetection>> = HashMap::new();
    for detection in detections {
        class_groups
            .entry(detection.class_id)
            .or_default()
            .push(detection);
    }

    let mut kept = Vec::new();
    for (_, mut group) in class_groups {
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut suppressed = vec![false; group.len()];
        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if !suppressed[j] && iou(&group[i].xyxy, &group[j].xyxy) > iou_threshold {
                    suppressed[j] = true;
                }
            }
            kept.push(group[i].clone());
        }
    }

    kept
}
