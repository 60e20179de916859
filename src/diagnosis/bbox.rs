// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Integer bounding boxes reported to clients

use serde::{Deserialize, Serialize};

/// Pixel bounding box with non-negative integer corners
///
/// Corners are clamped independently; `x2 > x1` and `y2 > y1` are not
/// enforced, so a degenerate model box stays degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    /// Build from raw model coordinates `[x1, y1, x2, y2]`
    ///
    /// Each coordinate becomes `max(0, floor(v))`. NaN maps to 0 and values
    /// beyond `u32::MAX` saturate.
    pub fn clamped(xyxy: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = xyxy.map(clamp_coord);
        Self { x1, y1, x2, y2 }
    }
}

fn clamp_coord(v: f32) -> u32 {
    // `as` saturates and maps NaN to 0
    v.floor().max(0.0) as u32
}
