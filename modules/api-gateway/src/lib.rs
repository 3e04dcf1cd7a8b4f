//! Petclinic API gateway.
//!
//! Aggregates the owner/pet directory service and the visit-history service
//! behind one REST surface:
//! - [`domain::Service`] composes owners with their pets' visits and degrades to
//!   empty visit lists when the visits service is unhealthy
//! - [`api::rest`] maps HTTP requests onto the service and errors onto RFC 9457
//!   problem documents

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod config;
pub mod domain;

pub use api::rest::routes::router;
pub use config::{BreakerSettings, GatewayConfig};
pub use domain::{DomainError, OwnerDetails, PetDetails, Service};
