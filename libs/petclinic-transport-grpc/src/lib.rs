//! gRPC transport helpers shared by the petclinic service SDKs.
//!
//! - [`client`]: endpoint configuration, eager and lazy channel construction
//! - [`breaker`]: closed/open/half-open fault boundary for remote calls

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod breaker;
pub mod client;

pub use breaker::{
    BreakerSnapshot, BreakerState, CircuitBreaker, CircuitBreakerConfig, FallbackReason, Guarded,
};
pub use client::{GrpcClientConfig, connect_lazy, connect_once, connect_with_retry};
