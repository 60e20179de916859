// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Leaf disease prediction endpoint
//!
//! Provides POST /predict for detecting diseases on an uploaded leaf photo.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::predict_handler;
pub use request::PredictQuery;
pub use response::{ImageSize, PredictResponse};
