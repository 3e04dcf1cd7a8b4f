//! gRPC client implementation of `VisitsClientV1`

use anyhow::Result;
use async_trait::async_trait;
use petclinic_transport_grpc::{GrpcClientConfig, connect_lazy, connect_with_retry};
use tonic::transport::Channel;

use crate::api::{VisitsClientV1, VisitsError};
use crate::models::{NewVisit, Visit};
use crate::proto;
use crate::proto::visits_service_client::VisitsServiceClient;

pub(crate) struct VisitsGrpcClient {
    inner: VisitsServiceClient<Channel>,
}

impl VisitsGrpcClient {
    pub(crate) async fn connect(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel: Channel = connect_with_retry(uri, cfg).await?;
        Ok(Self {
            inner: VisitsServiceClient::new(channel),
        })
    }

    pub(crate) fn connect_lazy(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel: Channel = connect_lazy(uri, cfg)?;
        Ok(Self {
            inner: VisitsServiceClient::new(channel),
        })
    }
}

#[async_trait]
impl VisitsClientV1 for VisitsGrpcClient {
    async fn find_visits_by_pet_ids(&self, pet_ids: &[i32]) -> Result<Vec<Visit>, VisitsError> {
        let mut client = self.inner.clone();

        // a NOT_FOUND can only be attributed when a single pet was asked for
        let response = client
            .find_visits(proto::VisitsRequest {
                pet_ids: pet_ids.to_vec(),
            })
            .await
            .map_err(|s| VisitsError::from_status(&s, single_pet(pet_ids)))?;

        response
            .into_inner()
            .visits
            .into_iter()
            .map(Visit::try_from)
            .collect()
    }

    async fn create_visit(&self, visit: NewVisit) -> Result<Visit, VisitsError> {
        let mut client = self.inner.clone();

        let pet_id = visit.pet_id;
        let response = client
            .create_visit(proto::Visit::from(visit))
            .await
            .map_err(|s| VisitsError::from_status(&s, pet_id))?;

        Visit::try_from(response.into_inner())
    }
}

fn single_pet(pet_ids: &[i32]) -> i32 {
    match pet_ids {
        [pet_id] => *pet_id,
        _ => 0,
    }
}
