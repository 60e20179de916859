// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod catalog;
pub mod config;
pub mod diagnosis;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, ApiError, AppState};
pub use catalog::{Advice, CatalogError, DiseaseCatalog};
pub use config::{ConfigError, CorsPolicy, NodeConfig};
pub use diagnosis::{diagnose, summarize, BoundingBox, Detection, LabelAggregate, Summary};
pub use vision::{
    ClassNames, DetectionParams, Detector, DetectorError, RawDetection, VisionModelConfig,
    VisionModelManager,
};
