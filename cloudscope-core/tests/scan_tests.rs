// Tests for end-to-end scans against directories, gateways and remote services

use cloudscope_core::error::CoreError;
use cloudscope_core::remote::RemoteScanClient;
use cloudscope_core::scan::{ScanOptions, ScanSource, execute_scan};
use cloudscope_core::{Category, Credentials};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tracing::Span;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn credentials() -> Credentials {
    Credentials::new("AKIDEXAMPLE", "secret", "us-west-2")
}

fn options(source: ScanSource, credentials: Credentials) -> ScanOptions {
    ScanOptions {
        source,
        credentials,
        timeout_secs: 5,
        show_progress: false,
    }
}

// ============================================================================
// Remote Scan Client Tests
// ============================================================================

#[tokio::test]
async fn test_remote_scan_returns_graph() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .and(body_json(json!({
            "access_key": "AKIDEXAMPLE",
            "secret_key": "secret",
            "region": "us-west-2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [
                {"id": "i-1", "type": "EC2", "name": "web"},
                {"id": "fn", "type": "Lambda", "name": "f", "details": {"runtime": "java21", "memory": 1024, "timeout": 900}}
            ],
            "links": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RemoteScanClient::new(&server.uri(), 5).unwrap();
    let result = client.scan(&credentials()).await.unwrap();

    assert_eq!(result.nodes.len(), 2);
    assert_eq!(result.nodes[0].category, Category::Compute);
    assert_eq!(result.nodes[1].category, Category::Function);
    assert!(result.nodes[1].detail.is_some());
}

#[tokio::test]
async fn test_remote_scan_surfaces_error_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "The security token included in the request is invalid."})),
        )
        .mount(&server)
        .await;

    let client = RemoteScanClient::new(&server.uri(), 5).unwrap();
    match client.scan(&credentials()).await {
        Err(CoreError::Remote { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "The security token included in the request is invalid.");
        }
        other => panic!("expected remote error, got {:?}", other.map(|r| r.nodes.len())),
    }
}

#[tokio::test]
async fn test_remote_scan_plain_text_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = RemoteScanClient::new(&server.uri(), 5).unwrap();
    let err = client.scan(&credentials()).await.unwrap_err();
    assert_eq!(err.to_string(), "Remote scan failed (502): bad gateway");
}

#[tokio::test]
async fn test_remote_scan_keeps_foreign_categories() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{"id": "q-1", "type": "SQS", "name": "jobs"}]
        })))
        .mount(&server)
        .await;

    let client = RemoteScanClient::new(&format!("{}/api", server.uri()), 5).unwrap();
    let result = client.scan(&credentials()).await.unwrap();
    assert_eq!(result.nodes[0].category, Category::Unrecognized);
    assert!(result.links.is_empty());
}

#[tokio::test]
async fn test_remote_scan_rejects_incomplete_credentials() {
    let client = RemoteScanClient::new("http://127.0.0.1:9", 1).unwrap();
    let err = client
        .scan(&Credentials::new("", "secret", "us-west-2"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Scan(_)));
}

// ============================================================================
// Execute Scan Tests
// ============================================================================

#[tokio::test]
async fn test_directory_scan_without_credentials() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("s3.json"),
        json!({"Buckets": [{"Name": "my-bucket"}]}).to_string(),
    )
    .unwrap();

    let output = execute_scan(
        options(
            ScanSource::Directory(dir.path().to_path_buf()),
            Credentials::new("", "", "eu-north-1"),
        ),
        Span::none(),
    )
    .await
    .unwrap();

    assert_eq!(output.result.nodes.len(), 1);
    assert_eq!(output.result.nodes[0].id, "my-bucket");
    assert_eq!(output.summary.region, "eu-north-1");
    // ec2, rds and lambda exports are missing
    assert_eq!(output.summary.failures.len(), 3);
}

#[tokio::test]
async fn test_gateway_scan_isolates_failed_category() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ec2"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/s3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Buckets": [{"Name": "my-bucket"}]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"DBInstances": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/lambda"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Functions": [{"FunctionName": "f", "FunctionArn": "arn:f", "Runtime": "python3.12"}]
        })))
        .mount(&server)
        .await;

    let output = execute_scan(
        options(ScanSource::Gateway(server.uri()), credentials()),
        Span::none(),
    )
    .await
    .unwrap();

    let ids: Vec<&str> = output.result.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["my-bucket", "arn:f"]);
    assert_eq!(output.summary.failures.len(), 1);
    assert_eq!(output.summary.failures[0].category, Category::Compute);
}

#[tokio::test]
async fn test_gateway_scan_requires_credentials() {
    let server = MockServer::start().await;
    let result = execute_scan(
        options(
            ScanSource::Gateway(server.uri()),
            Credentials::new("AKIDEXAMPLE", "", "us-west-2"),
        ),
        Span::none(),
    )
    .await;
    assert!(matches!(result, Err(CoreError::Scan(_))));
}

#[tokio::test]
async fn test_remote_source_builds_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{"id": "b", "type": "S3", "name": "b"}],
            "links": []
        })))
        .mount(&server)
        .await;

    let output = execute_scan(
        options(ScanSource::Remote(server.uri()), credentials()),
        Span::none(),
    )
    .await
    .unwrap();
    assert_eq!(output.summary.total(), 1);
    assert_eq!(output.summary.region, "us-west-2");
}
