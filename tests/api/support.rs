// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for the HTTP tests: a scripted detector, uploads and body helpers
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use image::{DynamicImage, ImageFormat};
use leaf_scan_node::{
    api::{create_app, AppState},
    catalog::DiseaseCatalog,
    config::CorsPolicy,
    vision::{ClassNames, DetectionParams, Detector, DetectorError, RawDetection, VisionModelManager},
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MODEL_PATH: &str = "models/test-leaf.onnx";
pub const BOUNDARY: &str = "leafscanboundary";

/// What the scripted detector does when called
pub enum Behaviour {
    Return(Vec<RawDetection>),
    Fail,
    Sleep(Duration),
}

pub struct StubDetector {
    names: ClassNames,
    behaviour: Behaviour,
    calls: AtomicUsize,
    last_params: Mutex<Option<DetectionParams>>,
}

impl StubDetector {
    pub fn new(behaviour: Behaviour) -> Arc<Self> {
        let names = DiseaseCatalog::builtin().unwrap().class_names().clone();
        Arc::new(Self {
            names,
            behaviour,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        })
    }

    pub fn returning(detections: Vec<RawDetection>) -> Arc<Self> {
        Self::new(Behaviour::Return(detections))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<DetectionParams> {
        *self.last_params.lock().unwrap()
    }
}

impl Detector for StubDetector {
    fn detect(
        &self,
        _image: &DynamicImage,
        params: &DetectionParams,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(*params);

        match &self.behaviour {
            Behaviour::Return(detections) => Ok(detections.clone()),
            Behaviour::Fail => Err(DetectorError::UnexpectedOutput(vec![1, 0, 8400])),
            Behaviour::Sleep(delay) => {
                std::thread::sleep(*delay);
                Ok(vec![])
            }
        }
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }
}

pub fn raw(class_id: u32, confidence: f32, xyxy: [f32; 4]) -> RawDetection {
    RawDetection {
        xyxy,
        confidence,
        class_id,
    }
}

pub fn state_with(detector: Arc<StubDetector>, timeout: Duration, cors: CorsPolicy) -> AppState {
    AppState {
        vision: Arc::new(VisionModelManager::with_detector(detector, MODEL_PATH)),
        catalog: Arc::new(DiseaseCatalog::builtin().unwrap()),
        inference_timeout: timeout,
        cors,
    }
}

pub fn app_with(detector: Arc<StubDetector>) -> Router {
    create_app(state_with(detector, Duration::from_secs(5), CorsPolicy::Any))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::new_rgb8(width, height);
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Build a `multipart/form-data` body with a single part
pub fn multipart_body(field: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"leaf.png\"\r\n",
            field
        )
        .as_bytes(),
    );
    if let Some(ct) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn predict_request(uri: &str, field: &str, content_type: Option<&str>, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, content_type, data)))
        .unwrap()
}

pub fn upload_png(uri: &str, width: u32, height: u32) -> Request<Body> {
    predict_request(uri, "image", Some("image/png"), &png_bytes(width, height))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
