use std::collections::HashMap;
use std::sync::Arc;

use customers_sdk::{CustomersClientV1, NewOwner, NewPet, Owner, PetType};
use petclinic_transport_grpc::{BreakerSnapshot, CircuitBreaker, Guarded};
use tracing::instrument;
use visits_sdk::{NewVisit, Visit, VisitsClientV1};

use super::error::DomainError;
use super::models::{OwnerDetails, PetDetails};

/// Gateway domain service.
///
/// Owns the composition policy: owner records come from the directory service,
/// visits from the visit-history service behind `visits_breaker`.
pub struct Service {
    customers: Arc<dyn CustomersClientV1>,
    visits: Arc<dyn VisitsClientV1>,
    visits_breaker: Arc<CircuitBreaker>,
}

impl Service {
    #[must_use]
    pub fn new(
        customers: Arc<dyn CustomersClientV1>,
        visits: Arc<dyn VisitsClientV1>,
        visits_breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            customers,
            visits,
            visits_breaker,
        }
    }

    /// Composite read: the owner, its pets, and each pet's visits.
    ///
    /// A failing or unhealthy visits service never fails this call; pets then
    /// carry empty visit lists.
    ///
    /// # Errors
    /// [`DomainError::OwnerNotFound`] for an unknown owner, or a customers
    /// service failure.
    #[instrument(skip(self))]
    pub async fn get_owner_with_visits(&self, owner_id: i32) -> Result<OwnerDetails, DomainError> {
        let owner = self
            .customers
            .find_owner(owner_id)
            .await?
            .ok_or(DomainError::OwnerNotFound(owner_id))?;

        let pet_ids = owner.pet_ids();
        let visits = match self
            .visits_breaker
            .call(|| self.visits.find_visits_by_pet_ids(&pet_ids), Vec::new)
            .await
        {
            Guarded::Value(visits) => visits,
            Guarded::Fallback { value, reason } => {
                tracing::warn!(
                    owner_id,
                    breaker = self.visits_breaker.name(),
                    %reason,
                    "visits unavailable, returning owner without visits"
                );
                value
            }
        };

        Ok(merge_visits(owner, &visits))
    }

    /// All owners; pets carry no visits.
    ///
    /// # Errors
    /// Customers service failure.
    #[instrument(skip(self))]
    pub async fn list_owners(&self) -> Result<Vec<OwnerDetails>, DomainError> {
        let owners = self.customers.find_all_owners().await?;
        Ok(owners.into_iter().map(OwnerDetails::from).collect())
    }

    /// # Errors
    /// Customers service failure.
    #[instrument(skip(self, owner), fields(last_name = %owner.last_name))]
    pub async fn create_owner(&self, owner: NewOwner) -> Result<OwnerDetails, DomainError> {
        let created = self.customers.create_owner(owner).await?;
        tracing::info!(owner_id = created.id, "owner created");
        Ok(created.into())
    }

    /// # Errors
    /// [`DomainError::OwnerNotFound`] or a customers service failure.
    #[instrument(skip(self, owner))]
    pub async fn update_owner(&self, owner_id: i32, owner: NewOwner) -> Result<(), DomainError> {
        self.customers.update_owner(owner_id, owner).await?;
        Ok(())
    }

    /// # Errors
    /// Customers service failure.
    #[instrument(skip(self))]
    pub async fn list_pet_types(&self) -> Result<Vec<PetType>, DomainError> {
        Ok(self.customers.get_pet_types().await?)
    }

    /// # Errors
    /// [`DomainError::OwnerNotFound`] or a customers service failure.
    #[instrument(skip(self, pet))]
    pub async fn create_pet(&self, owner_id: i32, pet: NewPet) -> Result<PetDetails, DomainError> {
        let created = self.customers.create_pet(owner_id, pet).await?;
        tracing::info!(pet_id = created.id, "pet created");
        Ok(created.into())
    }

    /// # Errors
    /// [`DomainError::PetNotFound`] or a customers service failure.
    #[instrument(skip(self, pet))]
    pub async fn update_pet(&self, pet_id: i32, pet: NewPet) -> Result<(), DomainError> {
        self.customers.update_pet(pet_id, pet).await?;
        Ok(())
    }

    /// # Errors
    /// [`DomainError::PetNotFound`] or a customers service failure.
    #[instrument(skip(self))]
    pub async fn find_pet(&self, pet_id: i32) -> Result<PetDetails, DomainError> {
        Ok(self.customers.find_pet(pet_id).await?.into())
    }

    /// Visits of one pet. Not guarded: failures are reported to the caller.
    ///
    /// # Errors
    /// [`DomainError::PetNotFound`] when the visits service does not know the
    /// pet, or a visits service failure.
    #[instrument(skip(self))]
    pub async fn list_visits_for_pet(&self, pet_id: i32) -> Result<Vec<Visit>, DomainError> {
        Ok(self.visits.find_visits_by_pet_ids(&[pet_id]).await?)
    }

    /// Store a visit for `pet_id` and return the record the service stored.
    ///
    /// # Errors
    /// [`DomainError::Validation`] for a non-positive pet id,
    /// [`DomainError::PetNotFound`] for a pet the visits service does not
    /// know, or a visits service failure.
    #[instrument(skip(self, visit))]
    pub async fn create_visit(&self, pet_id: i32, visit: NewVisit) -> Result<Visit, DomainError> {
        if pet_id <= 0 {
            return Err(DomainError::validation("petId", "must be a positive integer"));
        }
        let visit = NewVisit { pet_id, ..visit };
        let created = self.visits.create_visit(visit).await?;
        tracing::info!(visit_id = created.id, "visit created");
        Ok(created)
    }

    /// State of the visits fault boundary.
    #[must_use]
    pub fn visits_breaker_snapshot(&self) -> BreakerSnapshot {
        self.visits_breaker.snapshot()
    }
}

/// Attach to every pet the visits carrying its id, in the order given.
///
/// Pet order is preserved; visits of pets the owner does not have are dropped.
pub(crate) fn merge_visits(owner: Owner, visits: &[Visit]) -> OwnerDetails {
    let mut by_pet: HashMap<i32, Vec<Visit>> = HashMap::new();
    for visit in visits {
        by_pet.entry(visit.pet_id).or_default().push(visit.clone());
    }

    let mut details = OwnerDetails::from(owner);
    for pet in &mut details.pets {
        if let Some(pet_visits) = by_pet.get(&pet.id) {
            pet.visits.clone_from(pet_visits);
        }
    }
    details
}
