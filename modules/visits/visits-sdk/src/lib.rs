//! Visits SDK
//!
//! This crate provides everything needed to consume the visit-history service:
//! - API trait (`VisitsClientV1`)
//! - Models (`Visit`, `NewVisit`)
//! - Error types (`VisitsError`)
//! - Wiring functions (`wire_client`, `wire_lazy_client`)
//! - Proto stubs for server implementation

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
mod models;
pub use api::{VisitsClientV1, VisitsError};
pub use models::{NewVisit, Visit};

// === WIRING ===
mod client;
mod wiring;
pub use wiring::{wire_client, wire_lazy_client};

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for `VisitsService`
#[allow(clippy::pedantic, clippy::derive_partial_eq_without_eq)]
pub mod proto {
    tonic::include_proto!("petclinic.visits.v1");
}

pub use proto::visits_service_server::{VisitsService, VisitsServiceServer};

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "petclinic.visits.v1.VisitsService";
