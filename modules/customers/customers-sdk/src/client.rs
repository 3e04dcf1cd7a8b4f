//! gRPC client implementation of `CustomersClientV1`
//!
//! Internal client used by the wiring functions. Not exported from SDK.

use anyhow::Result;
use async_trait::async_trait;
use petclinic_transport_grpc::{GrpcClientConfig, connect_lazy, connect_with_retry};
use tonic::transport::Channel;

use crate::api::CustomersClientV1;
use crate::convert::{owner_message, pet_message};
use crate::error::CustomersError;
use crate::models::{NewOwner, NewPet, Owner, Pet, PetType};
use crate::proto;
use crate::proto::customers_service_client::CustomersServiceClient;

/// gRPC client implementation of `CustomersClientV1`
pub(crate) struct CustomersGrpcClient {
    inner: CustomersServiceClient<Channel>,
}

impl CustomersGrpcClient {
    /// Connect eagerly, retrying per `cfg`.
    pub(crate) async fn connect(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel: Channel = connect_with_retry(uri, cfg).await?;
        Ok(Self::from_channel(channel))
    }

    /// Build a client whose channel connects on first call.
    pub(crate) fn connect_lazy(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel: Channel = connect_lazy(uri, cfg)?;
        Ok(Self::from_channel(channel))
    }

    fn from_channel(channel: Channel) -> Self {
        Self {
            inner: CustomersServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl CustomersClientV1 for CustomersGrpcClient {
    async fn find_owner(&self, owner_id: i32) -> Result<Option<Owner>, CustomersError> {
        let mut client = self.inner.clone();

        match client.find_owner(proto::OwnerId { owner_id }).await {
            Ok(response) => Owner::try_from(response.into_inner()).map(Some),
            Err(status) if status.code() == tonic::Code::NotFound => Ok(None),
            Err(status) => Err(CustomersError::from_status(&status, "owner", owner_id)),
        }
    }

    async fn find_all_owners(&self) -> Result<Vec<Owner>, CustomersError> {
        let mut client = self.inner.clone();

        let response = client
            .find_all(proto::Empty {})
            .await
            .map_err(|status| CustomersError::from_status(&status, "owner", 0))?;

        response
            .into_inner()
            .owners
            .into_iter()
            .map(Owner::try_from)
            .collect()
    }

    async fn create_owner(&self, owner: NewOwner) -> Result<Owner, CustomersError> {
        let mut client = self.inner.clone();

        let response = client
            .create_owner(owner_message(0, owner))
            .await
            .map_err(|status| CustomersError::from_status(&status, "owner", 0))?;

        Owner::try_from(response.into_inner())
    }

    async fn update_owner(&self, owner_id: i32, owner: NewOwner) -> Result<(), CustomersError> {
        let mut client = self.inner.clone();

        client
            .update_owner(owner_message(owner_id, owner))
            .await
            .map_err(|status| CustomersError::from_status(&status, "owner", owner_id))?;

        Ok(())
    }

    async fn get_pet_types(&self) -> Result<Vec<PetType>, CustomersError> {
        let mut client = self.inner.clone();

        let response = client
            .get_pet_types(proto::Empty {})
            .await
            .map_err(|status| CustomersError::from_status(&status, "pet type", 0))?;

        Ok(response
            .into_inner()
            .pet_types
            .into_iter()
            .map(PetType::from)
            .collect())
    }

    async fn create_pet(&self, owner_id: i32, pet: NewPet) -> Result<Pet, CustomersError> {
        let mut client = self.inner.clone();

        let response = client
            .create_pet(pet_message(0, Some(owner_id), pet))
            .await
            .map_err(|status| CustomersError::from_status(&status, "owner", owner_id))?;

        Pet::try_from(response.into_inner())
    }

    async fn update_pet(&self, pet_id: i32, pet: NewPet) -> Result<(), CustomersError> {
        let mut client = self.inner.clone();

        client
            .update_pet(pet_message(pet_id, None, pet))
            .await
            .map_err(|status| CustomersError::from_status(&status, "pet", pet_id))?;

        Ok(())
    }

    async fn find_pet(&self, pet_id: i32) -> Result<Pet, CustomersError> {
        let mut client = self.inner.clone();

        let response = client
            .find_pet(proto::PetId { pet_id })
            .await
            .map_err(|status| CustomersError::from_status(&status, "pet", pet_id))?;

        Pet::try_from(response.into_inner())
    }
}
