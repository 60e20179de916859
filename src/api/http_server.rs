// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowHeaders, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{classes_handler, health_handler};
use super::predict::predict_handler;
use crate::catalog::DiseaseCatalog;
use crate::config::CorsPolicy;
use crate::vision::{VisionModelManager, MAX_IMAGE_BYTES};

/// Room for multipart boundaries and part headers on top of the image itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub vision: Arc<VisionModelManager>,
    pub catalog: Arc<DiseaseCatalog>,
    pub inference_timeout: Duration,
    pub cors: CorsPolicy,
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors);

    Router::new()
        .route("/health", get(health_handler))
        .route("/classes", get(classes_handler))
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_OVERHEAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    match policy {
        // Browsers refuse credentials with a wildcard origin
        CorsPolicy::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsPolicy::List(origins) => CorsLayer::new()
            .allow_origin(origins.clone())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    }
}

/// Bind `addr` and serve `app` until Ctrl-C
pub async fn start_server(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
