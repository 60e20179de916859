// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the YOLO detector

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size of exported YOLO models
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Letterbox padding colour used by Ultralytics
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox transform, used to map boxes back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale applied to the original image
    pub scale: f32,
    /// Horizontal padding on the left edge (model pixels)
    pub pad_x: f32,
    /// Vertical padding on the top edge (model pixels)
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a model-space point back to original image coordinates
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Preprocess an image for detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to fit `input_size`
/// 2. Centre on a square canvas padded with gray (114)
/// 3. Scale pixels to 0.0-1.0
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage, input_size: u32) -> (Array4<f32>, Letterbox) {
    let (canvas, letterbox) = letterbox(image, input_size);
    let size = input_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}

/// Resize into a padded square canvas, preserving aspect ratio
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    if orig_w == 0 || orig_h == 0 {
        let identity = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
        };
        return (canvas, identity);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();

    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;
    imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    (
        canvas,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    )
}
