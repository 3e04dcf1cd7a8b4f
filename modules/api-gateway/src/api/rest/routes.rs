use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::domain::Service;

use super::handlers;

/// Prefix of every gateway route.
pub const BASE_PATH: &str = "/api/gateway";

fn path(suffix: &str) -> String {
    format!("{BASE_PATH}{suffix}")
}

/// Build the gateway REST router.
///
/// Routes are registered with their full path so handlers see the request
/// path unchanged (used for problem `instance` and `Location`).
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            &path("/owners"),
            get(handlers::list_owners).post(handlers::create_owner),
        )
        .route(
            &path("/owners/{ownerId}"),
            get(handlers::get_owner).put(handlers::update_owner),
        )
        .route(&path("/petTypes"), get(handlers::list_pet_types))
        .route(&path("/owners/{ownerId}/pets"), post(handlers::create_pet))
        .route(
            &path("/owners/{ownerId}/pets/{petId}"),
            get(handlers::find_pet).put(handlers::update_pet),
        )
        .route(
            &path("/owners/{ownerId}/pets/{petId}/visits"),
            get(handlers::list_visits).post(handlers::create_visit),
        )
        .route(&path("/health"), get(handlers::health))
        .fallback(handlers::not_found)
        .layer(Extension(service))
}
