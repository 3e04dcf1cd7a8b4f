use customers_sdk::CustomersError;
use thiserror::Error;
use visits_sdk::VisitsError;

/// Domain-specific errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Owner {0} not found")]
    OwnerNotFound(i32),

    #[error("Pet {0} not found")]
    PetNotFound(i32),

    #[error("Validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("customers service call failed: {0}")]
    Customers(#[source] CustomersError),

    #[error("visits service call failed: {0}")]
    Visits(#[source] VisitsError),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<CustomersError> for DomainError {
    fn from(e: CustomersError) -> Self {
        match e {
            CustomersError::NotFound {
                resource: "owner",
                id,
            } => Self::OwnerNotFound(id),
            CustomersError::NotFound { resource: "pet", id } => Self::PetNotFound(id),
            other => Self::Customers(other),
        }
    }
}

impl From<VisitsError> for DomainError {
    fn from(e: VisitsError) -> Self {
        match e {
            VisitsError::NotFound { pet_id } => Self::PetNotFound(pet_id),
            other => Self::Visits(other),
        }
    }
}
