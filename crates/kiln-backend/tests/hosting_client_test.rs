//! Integration tests for the hosting service client.

use kiln_backend::{EndpointHandle, HostingClient, HostingError};
use kiln_core::config::HostingConfig;
use std::time::Duration;

fn client_for(server: &mockito::Server) -> HostingClient {
    HostingClient::new(&HostingConfig {
        base_url: server.url(),
        instance_type: "standard.medium".to_string(),
        initial_instance_count: 1,
    })
    .with_poll_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn test_register_model_and_create_endpoint() {
    let mut server = mockito::Server::new_async().await;

    let register_mock = server
        .mock("POST", "/models")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"name": "digits-classifier", "artifact_location": "bucket/digits/output/model.tar"}"#
                .to_string(),
        ))
        .with_header("content-type", "application/json")
        .with_body(r#"{"name": "digits-classifier"}"#)
        .create_async()
        .await;

    let create_mock = server
        .mock("POST", "/endpoints")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"model": "digits-classifier", "initial_instance_count": 1}"#.to_string(),
        ))
        .with_header("content-type", "application/json")
        .with_body(r#"{"name": "digits-classifier-20240101000000"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let model = client
        .register_model("digits-classifier", "bucket/digits/output/model.tar", "linear-learner:latest")
        .await
        .unwrap();
    assert_eq!(model.name, "digits-classifier");

    let endpoint = client.create_endpoint(&model).await.unwrap();
    assert_eq!(endpoint.name, "digits-classifier-20240101000000");

    register_mock.assert_async().await;
    create_mock.assert_async().await;
}

#[tokio::test]
async fn test_wait_in_service_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/endpoints/digits-ep")
        .with_header("content-type", "application/json")
        .with_body(r#"{"state": "in_service"}"#)
        .create_async()
        .await;

    client_for(&server)
        .wait_in_service(&EndpointHandle { name: "digits-ep".to_string() })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_wait_in_service_surfaces_failure_reason() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/endpoints/digits-ep")
        .with_header("content-type", "application/json")
        .with_body(r#"{"state": "failed", "reason": "no capacity"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .wait_in_service(&EndpointHandle { name: "digits-ep".to_string() })
        .await
        .unwrap_err();
    match err {
        HostingError::EndpointFailed { name, reason } => {
            assert_eq!(name, "digits-ep");
            assert_eq!(reason, "no capacity");
        }
        other => panic!("expected endpoint failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("DELETE", "/endpoints/digits-ep").with_status(200).create_async().await;

    client_for(&server)
        .delete_endpoint(&EndpointHandle { name: "digits-ep".to_string() })
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_missing_endpoint_is_not_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server.mock("DELETE", "/endpoints/gone").with_status(404).create_async().await;

    client_for(&server)
        .delete_endpoint(&EndpointHandle { name: "gone".to_string() })
        .await
        .unwrap();
}
