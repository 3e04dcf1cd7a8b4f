//! Wiring for Visits SDK

use std::sync::Arc;

use anyhow::{Context, Result};
use petclinic_transport_grpc::GrpcClientConfig;

use crate::SERVICE_NAME;
use crate::api::VisitsClientV1;
use crate::client::VisitsGrpcClient;

/// Connect to the visits service now, retrying per `cfg`.
///
/// # Errors
/// Returns an error if the service cannot be reached after all retries.
pub async fn wire_client(uri: &str, cfg: &GrpcClientConfig) -> Result<Arc<dyn VisitsClientV1>> {
    let client = VisitsGrpcClient::connect(uri, cfg)
        .await
        .with_context(|| format!("connecting to {SERVICE_NAME} at {uri}"))?;
    tracing::info!(service = SERVICE_NAME, uri, "VisitsClientV1 client wired");
    Ok(Arc::new(client))
}

/// Build a visits client that connects on first use.
///
/// # Errors
/// Returns an error if `uri` is not a valid endpoint URI.
pub fn wire_lazy_client(uri: &str, cfg: &GrpcClientConfig) -> Result<Arc<dyn VisitsClientV1>> {
    let client = VisitsGrpcClient::connect_lazy(uri, cfg)
        .with_context(|| format!("invalid {SERVICE_NAME} endpoint {uri}"))?;
    tracing::info!(service = SERVICE_NAME, uri, "VisitsClientV1 client wired (lazy)");
    Ok(Arc::new(client))
}
