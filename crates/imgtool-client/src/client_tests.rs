//! Tests for processing client behavior against a mock backend.

use imgtool_models::{
    Capability, CompressParams, CountObjectsParams, DetectObjectsParams, DetectionModel,
    FilterParams, ImageFile, ImageFilter, PoseParams, QueryParams, ResizeParams,
    SegmentObjectsParams, SegmentationModel,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::ProcessingClient;
use crate::config::ClientConfig;
use crate::types::{ProcessingResult, UploadRequest};

// =============================================================================
// Test Helpers
// =============================================================================

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn client_for(server: &MockServer) -> ProcessingClient {
    ProcessingClient::new(ClientConfig::default().with_base_url(server.uri())).unwrap()
}

fn png(name: &str) -> ImageFile {
    ImageFile::new(name, PNG_BYTES.to_vec())
}

fn image_reply() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(b"processed-image".to_vec(), "image/jpeg")
}

async fn only_request_body(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    String::from_utf8_lossy(&requests[0].body).into_owned()
}

// =============================================================================
// Binary Capabilities
// =============================================================================

#[tokio::test]
async fn test_detect_objects_posts_documented_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/detect_objects"))
        .and(query_param("model", "yolo11"))
        .and(query_param("confidence_threshold", "0.35"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = DetectObjectsParams {
        model: DetectionModel::Yolo11,
        confidence_threshold: 0.35,
    };
    let url = client.detect_objects(png("street.png"), &params).await.unwrap();

    let blob = client.objects().get(&url).unwrap();
    assert_eq!(blob.bytes.as_ref(), b"processed-image");
    assert_eq!(blob.content_type, "image/jpeg");

    let body = only_request_body(&server).await;
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"street.png\""));
    assert!(body.to_lowercase().contains("content-type: image/png"));
}

#[tokio::test]
async fn test_segment_objects_sends_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/segment_objects"))
        .and(query_param("model", "yolo11_seg"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let params = SegmentObjectsParams {
        model: SegmentationModel::Yolo11Seg,
    };
    client_for(&server)
        .segment_objects(png("a.png"), &params)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_resize_sends_dimensions_and_lock() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/resize_image"))
        .and(query_param("width", "640"))
        .and(query_param("height", "480"))
        .and(query_param("isAspectRatioLocked", "false"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let params = ResizeParams {
        width: 640,
        height: 480,
        aspect_ratio_locked: false,
    };
    client_for(&server)
        .resize_image(png("a.png"), &params)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_filter_and_compress_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply_filter"))
        .and(query_param("filter", "edge_enhance"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/compress_image"))
        .and(query_param("quality", "0"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .apply_filter(
            png("a.png"),
            &FilterParams {
                filter: ImageFilter::EdgeEnhance,
            },
        )
        .await
        .unwrap();

    // Zero quality is forwarded, not rejected locally.
    client
        .compress_image(png("a.png"), &CompressParams { quality: 0 })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_detect_poses_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/detect_open_poses"))
        .and(query_param("showSkeleton", "false"))
        .and(query_param("showJointConfidence", "true"))
        .and(query_param("confidence_threshold", "0.5"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;

    let params = PoseParams {
        show_skeleton: false,
        ..PoseParams::default()
    };
    client_for(&server)
        .detect_poses(png("pose.png"), &params)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_binary_results_get_fresh_urls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compress_image"))
        .respond_with(image_reply())
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = CompressParams::default();
    let first = client.compress_image(png("a.png"), &params).await.unwrap();
    let second = client.compress_image(png("a.png"), &params).await.unwrap();

    assert_ne!(first, second);
    assert_eq!(client.objects().len(), 2);

    assert!(client.release(&first));
    assert!(client.objects().get(&first).is_none());
    assert!(client.objects().get(&second).is_some());
}

#[tokio::test]
async fn test_missing_content_type_falls_back_to_octet_stream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply_filter"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"raw".to_vec()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let url = client
        .apply_filter(
            png("a.png"),
            &FilterParams {
                filter: ImageFilter::Blur,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        client.objects().get(&url).unwrap().content_type,
        "application/octet-stream"
    );
}

// =============================================================================
// Structured Capabilities
// =============================================================================

#[tokio::test]
async fn test_extract_text_has_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract_text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "STOP" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client.extract_text(png("sign.png")).await.unwrap();
    assert_eq!(text.text, "STOP");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query().is_none());
    assert!(client.objects().is_empty());
}

#[tokio::test]
async fn test_count_objects_returns_mapping_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/count_objects"))
        .and(query_param("model", "yolov8"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "person": 2, "car": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let counts = client_for(&server)
        .count_objects(png("street.png"), &CountObjectsParams::default())
        .await
        .unwrap();

    assert_eq!(counts.get("person"), Some(2));
    assert_eq!(counts.get("car"), Some(1));
    assert_eq!(counts.total(), 3);
}

#[tokio::test]
async fn test_compare_sends_files_positionally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compare_images"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "similarity_score": 0.42 })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let score = client
        .compare_images(png("a.png"), png("b.png"))
        .await
        .unwrap();
    assert_eq!(score.similarity_score, 0.42);

    client
        .compare_images(png("b.png"), png("a.png"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let first = String::from_utf8_lossy(&requests[0].body).into_owned();
    let second = String::from_utf8_lossy(&requests[1].body).into_owned();

    let pos = |body: &str, needle: &str| body.find(needle).unwrap();
    assert!(pos(&first, "name=\"file1\"") < pos(&first, "name=\"file2\""));
    assert!(pos(&first, "filename=\"a.png\"") < pos(&first, "filename=\"b.png\""));
    assert!(pos(&second, "filename=\"b.png\"") < pos(&second, "filename=\"a.png\""));
}

#[tokio::test]
async fn test_detect_and_count_concurrently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/detect_objects"))
        .respond_with(image_reply())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/count_objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "dog": 4 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let file = png("park.png");
    let detect_params = DetectObjectsParams::default();
    let count_params = CountObjectsParams::default();
    let (detected, counted) = tokio::join!(
        client.detect_objects(file.clone(), &detect_params),
        client.count_objects(file, &count_params),
    );

    assert!(client.objects().get(&detected.unwrap()).is_some());
    assert_eq!(counted.unwrap().total(), 4);
}

// =============================================================================
// Generic Submission
// =============================================================================

#[tokio::test]
async fn test_submit_dispatches_on_response_kind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply_filter"))
        .and(query_param("filter", "sepia"))
        .respond_with(image_reply())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/extract_text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "" })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let binary = client
        .submit(
            UploadRequest::new(Capability::ApplyFilter, png("a.png"))
                .with_params(QueryParams::new().with("filter", "sepia")),
        )
        .await
        .unwrap();
    assert!(matches!(binary, ProcessingResult::Binary(_)));

    let structured = client
        .submit(UploadRequest::new(Capability::ExtractText, png("a.png")))
        .await
        .unwrap();
    assert_eq!(
        structured,
        ProcessingResult::Structured(serde_json::json!({ "text": "" }))
    );
}

#[tokio::test]
async fn test_every_capability_uses_documented_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(Capability::ALL.len() as u64)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for capability in Capability::ALL {
        let request = match capability {
            Capability::CompareImages => UploadRequest::comparison(png("a.png"), png("b.png")),
            _ => UploadRequest::new(*capability, png("a.png")),
        };
        client.submit(request).await.unwrap();
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), Capability::ALL.len());

    for (capability, request) in Capability::ALL.iter().zip(&requests) {
        assert_eq!(request.url.path(), capability.path());

        let body = String::from_utf8_lossy(&request.body);
        for field in capability.file_fields() {
            assert!(
                body.contains(&format!("name=\"{}\"", field)),
                "{} request is missing field {}",
                capability,
                field
            );
        }
        if *capability != Capability::CompareImages {
            assert!(!body.contains("name=\"file1\""));
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/detect_objects"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "bad model" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .detect_objects(png("a.png"), &DetectObjectsParams::default())
        .await
        .unwrap_err();

    assert!(err.is_server());
    assert_eq!(err.status(), Some(500));
    let message = err.to_string();
    assert!(message.contains("500"));
    assert!(message.contains("bad model"));
    assert!(client.objects().is_empty());
}

#[tokio::test]
async fn test_server_error_on_structured_capability() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/count_objects"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported model"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .count_objects(png("a.png"), &CountObjectsParams::default())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Server error: 400 - unsupported model");
}

#[tokio::test]
async fn test_malformed_json_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compare_images"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .compare_images(png("a.png"), png("b.png"))
        .await
        .unwrap_err();

    assert!(err.is_server());
    assert_eq!(err.status(), Some(200));
    assert!(err.to_string().contains("malformed response"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on port 1.
    let client =
        ProcessingClient::new(ClientConfig::default().with_base_url("http://127.0.0.1:1")).unwrap();

    let err = client
        .resize_image(png("a.png"), &ResizeParams::default())
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(!err.is_server());
    assert_eq!(err.status(), None);
    assert!(err
        .to_string()
        .starts_with("Network error: No response received from server"));
}

#[tokio::test]
async fn test_request_error_is_raised_before_sending() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .submit(UploadRequest::new(Capability::CompareImages, png("a.png")))
        .await
        .unwrap_err();
    assert!(err.is_request());

    let err = client
        .extract_text(png("a.png").with_content_type("definitely not a mime"))
        .await
        .unwrap_err();
    assert!(err.is_request());

    assert!(server.received_requests().await.unwrap().is_empty());
}
