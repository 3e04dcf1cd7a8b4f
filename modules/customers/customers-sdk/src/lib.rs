//! Customers SDK
//!
//! This crate provides everything needed to consume the owner/pet directory service:
//! - API trait (`CustomersClientV1`)
//! - Models (`Owner`, `Pet`, `PetType`, `NewOwner`, `NewPet`)
//! - Error types (`CustomersError`)
//! - Wiring functions (`wire_client`, `wire_lazy_client`)
//! - Proto stubs for server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use customers_sdk::{CustomersClientV1, wire_lazy_client};
//! use petclinic_transport_grpc::GrpcClientConfig;
//!
//! let client = wire_lazy_client("http://customers:9090", &GrpcClientConfig::new("customers"))?;
//! let owner = client.find_owner(1).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
mod error;
mod models;
pub use api::CustomersClientV1;
pub use error::CustomersError;
pub use models::{NewOwner, NewPet, Owner, OwnerName, Pet, PetType};

// === WIRING ===
mod client;
mod convert;
mod wiring;
pub use wiring::{wire_client, wire_lazy_client};

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for `CustomersService`
#[allow(clippy::pedantic, clippy::derive_partial_eq_without_eq)]
pub mod proto {
    tonic::include_proto!("petclinic.customers.v1");
}

pub use proto::customers_service_server::{CustomersService, CustomersServiceServer};

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "petclinic.customers.v1.CustomersService";

/// Calendar date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
