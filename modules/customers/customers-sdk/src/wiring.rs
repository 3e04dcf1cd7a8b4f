//! Wiring for Customers SDK
//!
//! Builds the gRPC client and hands it out as `Arc<dyn CustomersClientV1>`.

use std::sync::Arc;

use anyhow::{Context, Result};
use petclinic_transport_grpc::GrpcClientConfig;

use crate::SERVICE_NAME;
use crate::api::CustomersClientV1;
use crate::client::CustomersGrpcClient;

/// Connect to the customers service now, retrying per `cfg`.
///
/// # Errors
/// Returns an error if the service cannot be reached after all retries.
pub async fn wire_client(uri: &str, cfg: &GrpcClientConfig) -> Result<Arc<dyn CustomersClientV1>> {
    let client = CustomersGrpcClient::connect(uri, cfg)
        .await
        .with_context(|| format!("connecting to {SERVICE_NAME} at {uri}"))?;
    tracing::info!(service = SERVICE_NAME, uri, "CustomersClientV1 client wired");
    Ok(Arc::new(client))
}

/// Build a customers client that connects on first use.
///
/// # Errors
/// Returns an error if `uri` is not a valid endpoint URI.
pub fn wire_lazy_client(uri: &str, cfg: &GrpcClientConfig) -> Result<Arc<dyn CustomersClientV1>> {
    let client = CustomersGrpcClient::connect_lazy(uri, cfg)
        .with_context(|| format!("invalid {SERVICE_NAME} endpoint {uri}"))?;
    tracing::info!(service = SERVICE_NAME, uri, "CustomersClientV1 client wired (lazy)");
    Ok(Arc::new(client))
}
