//! Channel construction against addresses where nothing listens.

use petclinic_transport_grpc::{GrpcClientConfig, connect_lazy, connect_once, connect_with_retry};
use std::time::Duration;
use tonic::transport::Channel;

#[derive(Clone)]
struct FakeClient {
    _channel: Channel,
}

impl From<Channel> for FakeClient {
    fn from(channel: Channel) -> Self {
        Self { _channel: channel }
    }
}

#[test]
fn default_config_is_sane() {
    let cfg = GrpcClientConfig::default();

    assert!(cfg.connect_timeout > Duration::ZERO);
    assert!(cfg.rpc_timeout > Duration::ZERO);
    assert!(cfg.base_backoff > Duration::ZERO);
    assert!(
        cfg.max_backoff >= cfg.base_backoff,
        "max_backoff should be >= base_backoff"
    );
    assert!(!cfg.service_name.is_empty());
}

#[tokio::test]
async fn connect_once_fails_without_server() {
    let cfg = GrpcClientConfig::new("test")
        .with_connect_timeout(Duration::from_millis(100))
        .with_rpc_timeout(Duration::from_millis(200));

    // Non-routable address (TEST-NET-1).
    let result = connect_once::<FakeClient>("http://192.0.2.1:50051", &cfg).await;
    assert!(
        result.is_err(),
        "Should fail to connect to non-existent server"
    );
}

#[tokio::test]
async fn connect_once_rejects_invalid_uri() {
    let cfg = GrpcClientConfig::default();
    let result = connect_once::<FakeClient>("not a uri", &cfg).await;
    assert!(result.is_err(), "Should fail with invalid URI");
}

#[tokio::test]
async fn connect_with_retry_gives_up_after_max_retries() {
    let cfg = GrpcClientConfig::new("customers")
        .with_connect_timeout(Duration::from_millis(50))
        .with_max_retries(2)
        .with_backoff(Duration::from_millis(1), Duration::from_millis(2));

    let err = connect_with_retry::<FakeClient>("http://127.0.0.1:1", &cfg)
        .await
        .err()
        .map(|e| e.to_string())
        .unwrap_or_default();

    assert!(
        err.contains("failed to connect to customers at http://127.0.0.1:1 after 3 attempts"),
        "unexpected error message: {err}"
    );
}

#[tokio::test]
async fn connect_with_retry_without_retries_tries_once() {
    let cfg = GrpcClientConfig::new("visits")
        .with_connect_timeout(Duration::from_millis(50))
        .with_max_retries(0);

    let err = connect_with_retry::<FakeClient>("http://127.0.0.1:1", &cfg)
        .await
        .err()
        .map(|e| e.to_string())
        .unwrap_or_default();

    assert!(err.contains("after 1 attempts"), "unexpected error message: {err}");
}

#[tokio::test]
async fn connect_lazy_succeeds_without_server() {
    let cfg = GrpcClientConfig::new("visits").with_connect_timeout(Duration::from_millis(50));

    // Nothing listens here; the channel only connects on first use.
    let result = connect_lazy::<FakeClient>("http://127.0.0.1:1", &cfg);
    assert!(result.is_ok());
}

#[tokio::test]
async fn connect_lazy_rejects_invalid_uri() {
    let cfg = GrpcClientConfig::default();
    assert!(connect_lazy::<FakeClient>("not a uri", &cfg).is_err());
}
