//! Customers API trait
//!
//! Contract for the owner/pet directory service.

use async_trait::async_trait;

use crate::error::CustomersError;
use crate::models::{NewOwner, NewPet, Owner, Pet, PetType};

/// Owner/pet directory client.
///
/// Every method is a single remote call; nothing is cached or retried.
#[async_trait]
pub trait CustomersClientV1: Send + Sync {
    /// Fetch one owner with its pets. `Ok(None)` when the owner does not exist.
    async fn find_owner(&self, owner_id: i32) -> Result<Option<Owner>, CustomersError>;

    async fn find_all_owners(&self) -> Result<Vec<Owner>, CustomersError>;

    /// Create an owner and return the stored record.
    async fn create_owner(&self, owner: NewOwner) -> Result<Owner, CustomersError>;

    async fn update_owner(&self, owner_id: i32, owner: NewOwner) -> Result<(), CustomersError>;

    async fn get_pet_types(&self) -> Result<Vec<PetType>, CustomersError>;

    /// Create a pet for an existing owner and return the stored record.
    async fn create_pet(&self, owner_id: i32, pet: NewPet) -> Result<Pet, CustomersError>;

    async fn update_pet(&self, pet_id: i32, pet: NewPet) -> Result<(), CustomersError>;

    async fn find_pet(&self, pet_id: i32) -> Result<Pet, CustomersError>;
}
