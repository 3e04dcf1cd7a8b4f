//! Error responses of the petclinic gateway.
//!
//! - [`Problem`]: RFC 9457 body, an axum response with the `axum` feature
//! - [`ErrDef`]: static catalog entry a handler turns into a [`Problem`]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};
