// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::http_server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesResponse {
    /// Class index to label, keys serialized as decimal strings
    pub classes: BTreeMap<u32, String>,
    /// Labels with a registered advisory, sorted
    pub advice_keys: Vec<String>,
}

/// GET /health - Liveness plus the loaded model path
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_path: state.vision.model_path().to_string(),
    })
}

/// GET /classes - Label table of the loaded model and the advisory keys
pub async fn classes_handler(State(state): State<AppState>) -> Json<ClassesResponse> {
    Json(ClassesResponse {
        classes: state.vision.class_names().as_map().clone(),
        advice_keys: state.catalog.advice_keys(),
    })
}
