// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use leaf_scan_node::{
    api::{create_app, start_server, AppState},
    catalog::DiseaseCatalog,
    config::NodeConfig,
    vision::VisionModelManager,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("🚀 Starting Leaf Scan Node");
    info!("📦 BUILD VERSION: {}", leaf_scan_node::version::VERSION);
    info!("📅 {}", leaf_scan_node::version::get_version_string());

    let config = NodeConfig::parse();
    let addr = config.listen_addr()?;
    let cors = config.cors_policy()?;
    let inference_timeout = config.inference_timeout()?;

    let catalog = match &config.catalog_path {
        Some(path) => DiseaseCatalog::load(path)
            .with_context(|| format!("loading disease catalog {}", path.display()))?,
        None => DiseaseCatalog::builtin().context("parsing built-in disease catalog")?,
    };
    info!(
        "📚 Disease catalog: {} classes, {} advisories",
        catalog.class_names().len(),
        catalog.advice_keys().len()
    );

    info!("🧠 Loading detector from {}", config.model_path.display());
    let vision = VisionModelManager::load(&config.vision_config(), catalog.class_names())?;
    info!("✅ Detector serves {} classes", vision.class_names().len());

    let state = AppState {
        vision: Arc::new(vision),
        catalog: Arc::new(catalog),
        inference_timeout,
        cors,
    };

    start_server(addr, create_app(state)).await?;

    info!("👋 Goodbye!");
    Ok(())
}
