// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration from command line flags and environment variables

use axum::http::HeaderValue;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::vision::detector::preprocessing::DEFAULT_INPUT_SIZE;
use crate::vision::VisionModelConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),

    #[error("ALLOWED_ORIGINS must name at least one origin or '*'")]
    NoOrigins,

    #[error("Invalid listen address {0}")]
    InvalidListenAddr(String),

    #[error("Inference timeout must be greater than zero")]
    ZeroTimeout,
}

/// Leaf Scan Node
#[derive(Parser, Debug, Clone)]
#[command(name = "leaf-scan-node")]
#[command(about = "Serve a YOLO leaf-disease detector over HTTP", long_about = None)]
pub struct NodeConfig {
    /// Path to the exported ONNX detection model
    #[arg(long, env = "MODEL_PATH", default_value = "./models/best.onnx")]
    pub model_path: PathBuf,

    /// Allowed CORS origins, comma separated, or `*` for any
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*")]
    pub allowed_origins: String,

    /// Interface to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Disease catalog TOML; the built-in catalog is used when unset
    #[arg(long, env = "DISEASE_CATALOG_PATH")]
    pub catalog_path: Option<PathBuf>,

    /// Upper bound on a single inference call, in seconds
    #[arg(long, env = "INFERENCE_TIMEOUT_SECS", default_value_t = 30)]
    pub inference_timeout_secs: u64,

    /// Square input size the model was exported with
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = DEFAULT_INPUT_SIZE)]
    pub input_size: u32,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl NodeConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ConfigError::InvalidListenAddr(addr))
    }

    pub fn cors_policy(&self) -> Result<CorsPolicy, ConfigError> {
        CorsPolicy::parse(&self.allowed_origins)
    }

    pub fn inference_timeout(&self) -> Result<Duration, ConfigError> {
        if self.inference_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Duration::from_secs(self.inference_timeout_secs))
    }

    pub fn vision_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            model_path: self.model_path.clone(),
            input_size: self.input_size,
            intra_threads: self.intra_threads,
        }
    }
}

/// Which origins may call the API from a browser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsPolicy {
    /// `*`: any origin
    #[default]
    Any,
    /// Explicit origin list
    List(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// Parse a comma separated origin list; any `*` entry allows every origin
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let origins: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .collect();

        if origins.is_empty() {
            return Err(ConfigError::NoOrigins);
        }
        if origins.contains(&"*") {
            return Ok(CorsPolicy::Any);
        }

        origins
            .into_iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(CorsPolicy::List)
    }
}
