// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end tests for POST /predict with a scripted detector

use axum::http::StatusCode;
use leaf_scan_node::api::create_app;
use leaf_scan_node::config::CorsPolicy;
use std::time::Duration;
use tower::util::ServiceExt;

use super::support::{
    app_with, body_json, raw, state_with, upload_png, Behaviour, StubDetector,
};

#[tokio::test]
async fn test_predict_labels_clamps_and_summarizes() {
    let detector = StubDetector::returning(vec![
        raw(8, 0.91, [-3.2, 4.7, 30.5, 20.1]),
        raw(0, 0.95, [10.0, 10.0, 40.0, 40.0]),
        raw(8, 0.55, [1.0, 1.0, 5.0, 5.0]),
    ]);
    let app = app_with(detector.clone());

    let response = app.oneshot(upload_png("/predict", 64, 48)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(detector.calls(), 1);

    let json = body_json(response).await;
    assert_eq!(json["image"], serde_json::json!({"width": 64, "height": 48}));
    assert!(json["elapsed_ms"].is_u64());

    let predictions = json["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 3);

    let first = &predictions[0];
    assert_eq!(first["label"], "Mealybug");
    assert_eq!(first["class_id"], 8);
    assert_eq!(first["is_disease"], true);
    assert_eq!(first["box"], serde_json::json!({"x1": 0, "y1": 4, "x2": 30, "y2": 20}));
    assert!(first["advice"]["thai_name"].is_string());
    assert!(first["advice"]["treatment"].is_array());
    assert!(first["advice"]["control"].is_array());

    assert_eq!(predictions[1]["label"], "Durian Leaf Blight Disease");

    // Two Mealybug boxes outrank one higher-confidence blight box
    let summary = &json["summary"];
    assert_eq!(summary["top_label"], "Mealybug");
    assert_eq!(summary["by_label"]["Mealybug"]["count"], 2);
    assert!((summary["by_label"]["Mealybug"]["max_conf"].as_f64().unwrap() - 0.91).abs() < 1e-6);
    assert_eq!(summary["by_label"]["Durian Leaf Blight Disease"]["count"], 1);
}

#[tokio::test]
async fn test_predict_non_disease_has_no_advice() {
    let detector = StubDetector::returning(vec![raw(12, 0.8, [0.0, 0.0, 10.0, 10.0])]);
    let app = app_with(detector);

    let response = app.oneshot(upload_png("/predict", 16, 16)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let prediction = &json["predictions"][0];
    assert_eq!(prediction["label"], "non-disease");
    assert_eq!(prediction["is_disease"], false);
    assert!(prediction["advice"].is_null());
    assert_eq!(json["summary"]["top_label"], "non-disease");
}

#[tokio::test]
async fn test_predict_unknown_class_uses_index_label() {
    let detector = StubDetector::returning(vec![raw(99, 0.4, [0.0, 0.0, 2.0, 2.0])]);
    let app = app_with(detector);

    let json = body_json(app.oneshot(upload_png("/predict", 8, 8)).await.unwrap()).await;
    let prediction = &json["predictions"][0];
    assert_eq!(prediction["label"], "99");
    assert_eq!(prediction["is_disease"], true);
    assert!(prediction["advice"].is_null());
}

#[tokio::test]
async fn test_predict_without_detections() {
    let app = app_with(StubDetector::returning(vec![]));

    let response = app.oneshot(upload_png("/predict", 20, 10)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["predictions"], serde_json::json!([]));
    assert!(json["summary"]["top_label"].is_null());
    assert_eq!(json["summary"]["by_label"], serde_json::json!({}));
}

#[tokio::test]
async fn test_predict_default_thresholds() {
    let detector = StubDetector::returning(vec![]);
    let app = app_with(detector.clone());

    app.oneshot(upload_png("/predict", 8, 8)).await.unwrap();

    let params = detector.last_params().unwrap();
    assert_eq!(params.confidence_threshold, 0.25);
    assert_eq!(params.iou_threshold, 0.45);
}

#[tokio::test]
async fn test_predict_forwards_query_thresholds() {
    let detector = StubDetector::returning(vec![]);
    let app = app_with(detector.clone());

    let response = app
        .oneshot(upload_png("/predict?conf=0.6&iou=0.3", 8, 8))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let params = detector.last_params().unwrap();
    assert_eq!(params.confidence_threshold, 0.6);
    assert_eq!(params.iou_threshold, 0.3);
}

#[tokio::test]
async fn test_predict_detector_failure_is_500() {
    let app = app_with(StubDetector::new(Behaviour::Fail));

    let response = app.oneshot(upload_png("/predict", 8, 8)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error_type"], "internal_error");
    assert_eq!(json["message"], "Internal server error");
    assert!(!json.to_string().contains("8400"));
}

#[tokio::test]
async fn test_predict_slow_detector_is_504() {
    let detector = StubDetector::new(Behaviour::Sleep(Duration::from_millis(300)));
    let app = create_app(state_with(
        detector,
        Duration::from_millis(20),
        CorsPolicy::Any,
    ));

    let response = app.oneshot(upload_png("/predict", 8, 8)).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let json = body_json(response).await;
    assert_eq!(json["error_type"], "timeout");
}
