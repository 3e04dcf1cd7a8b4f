pub mod error;
pub mod models;
pub mod service;

pub use error::DomainError;
pub use models::{OwnerDetails, PetDetails};
pub use service::Service;

#[cfg(test)]
mod service_test;
