//! End-to-end pipeline tests against a mocked Leap API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leap_client::{LeapClient, LeapClientConfig, LeapError};
use leap_pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineRequest, PollConfig, Stage};

// =============================================================================
// Test Helpers
// =============================================================================

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        training_poll: PollConfig::new(Duration::from_millis(10), 5),
        inference_poll: PollConfig::new(Duration::from_millis(10), 5),
    }
}

fn pipeline_for(server: &MockServer) -> Pipeline<LeapClient> {
    let client = LeapClient::new(LeapClientConfig::new(server.uri(), "test-key")).unwrap();
    Pipeline::new(client, fast_config())
}

fn request() -> PipelineRequest {
    PipelineRequest::new(vec![
        "https://img.test/1.jpg".to_string(),
        "https://img.test/2.jpg".to_string(),
    ])
}

async fn mount_create_model(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/images/models"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "m1" })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/images/models/m1/samples/url"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_training(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/images/models/m1/queue"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "v1", "status": "running" })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/versions/v1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "v1", "status": "running" })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/versions/v1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "v1", "status": "finished" })),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_inference(server: &MockServer, images: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/images/models/m1/inferences"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "i1", "status": "running" })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/inferences/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "i1",
            "state": "finished",
            "images": images
        })))
        .expect(1)
        .mount(server)
        .await;
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_end_to_end_returns_generated_image() {
    let server = MockServer::start().await;
    mount_create_model(&server).await;
    mount_upload(&server).await;
    mount_training(&server).await;
    mount_inference(&server, json!([{ "uri": "https://x/img.png" }])).await;

    let output = pipeline_for(&server).run(&request()).await.unwrap();

    assert_eq!(output.model_id.as_str(), "m1");
    assert_eq!(output.version_id.as_str(), "v1");
    assert_eq!(output.inference_id.as_str(), "i1");
    assert_eq!(output.image.as_deref(), Some("https://x/img.png"));
}

#[tokio::test]
async fn test_empty_image_list_is_completed_without_image() {
    let server = MockServer::start().await;
    mount_create_model(&server).await;
    mount_upload(&server).await;
    mount_training(&server).await;
    mount_inference(&server, json!([])).await;

    let output = pipeline_for(&server).run(&request()).await.unwrap();

    assert!(output.image.is_none());
}

#[tokio::test]
async fn test_failed_model_creation_stops_pipeline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/images/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    // No later stage may reach the server.
    Mock::given(path_regex(r"^/images/models/.+"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline_for(&server).run(&request()).await.unwrap_err();

    assert_eq!(err.stage(), Some(Stage::CreateModel));
    assert!(err.to_string().contains("create_model"));
    assert!(matches!(err, PipelineError::Request { .. }));
}

#[tokio::test]
async fn test_failed_upload_stops_pipeline() {
    let server = MockServer::start().await;
    mount_create_model(&server).await;

    Mock::given(method("POST"))
        .and(path("/images/models/m1/samples/url"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad image url"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/images/models/m1/queue"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline_for(&server).run(&request()).await.unwrap_err();

    assert_eq!(err.stage(), Some(Stage::UploadSamples));
    assert!(err.to_string().contains("model m1"));
}

#[tokio::test]
async fn test_transient_poll_errors_are_retried() {
    let server = MockServer::start().await;
    mount_create_model(&server).await;
    mount_upload(&server).await;

    Mock::given(method("POST"))
        .and(path("/images/models/m1/queue"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "v1", "status": "queued" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/versions/v1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/versions/v1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "v1", "status": "finished" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_inference(&server, json!([{ "uri": "https://x/img.png" }])).await;

    let output = pipeline_for(&server).run(&request()).await.unwrap();
    assert_eq!(output.image.as_deref(), Some("https://x/img.png"));
}

#[tokio::test]
async fn test_missing_version_stops_polling() {
    let server = MockServer::start().await;
    mount_create_model(&server).await;
    mount_upload(&server).await;

    Mock::given(method("POST"))
        .and(path("/images/models/m1/queue"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "v1", "status": "queued" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/versions/v1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("version not found"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/images/models/m1/inferences"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline_for(&server).run(&request()).await.unwrap_err();

    match err {
        PipelineError::Request {
            stage,
            target,
            source,
        } => {
            assert_eq!(stage, Stage::AwaitTraining);
            assert_eq!(target, "model m1 version v1");
            assert!(matches!(source, LeapError::NotFound(_)));
        }
        other => panic!("expected request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_inference_that_never_finishes_times_out() {
    let server = MockServer::start().await;
    mount_create_model(&server).await;
    mount_upload(&server).await;
    mount_training(&server).await;

    Mock::given(method("POST"))
        .and(path("/images/models/m1/inferences"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "i1", "status": "queued" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/models/m1/inferences/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "i1",
            "state": "processing",
            "images": []
        })))
        .expect(5)
        .mount(&server)
        .await;

    let err = pipeline_for(&server).run(&request()).await.unwrap_err();

    match err {
        PipelineError::Timeout {
            stage,
            attempts,
            target,
            ..
        } => {
            assert_eq!(stage, Stage::AwaitInference);
            assert_eq!(attempts, 5);
            assert!(target.contains("inference i1"));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}
