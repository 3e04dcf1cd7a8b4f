//! REST handlers for the gateway

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::Uri;
use axum::response::IntoResponse;
use petclinic_errors::Problem;
use serde::de::DeserializeOwned;

use crate::domain::Service;

use super::dto::{
    HealthDto, OwnerDto, OwnerRequest, PetDto, PetRequest, PetTypeDto, VisitDto, VisitRequest,
};
use super::error::{
    catalog, current_trace_id, domain_error_to_problem, malformed_request, validation_problem,
};
use super::response::{ApiResult, created, created_json, no_content};

/// Parse a path identifier; only positive integers are accepted.
fn parse_id(field: &str, raw: &str, uri: &Uri) -> ApiResult<i32> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(malformed_request(
            format!("{field} must be a positive integer, got '{raw}'"),
            uri.path(),
        )),
    }
}

fn json_body<T: DeserializeOwned>(body: Result<Json<T>, JsonRejection>, uri: &Uri) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| malformed_request(rejection.body_text(), uri.path()))
}

/// GET /api/gateway/owners
pub async fn list_owners(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> ApiResult<Json<Vec<OwnerDto>>> {
    let owners = svc
        .list_owners()
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(owners.into_iter().map(OwnerDto::from).collect()))
}

/// POST /api/gateway/owners
pub async fn create_owner(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    body: Result<Json<OwnerRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let owner = json_body(body, &uri)?
        .validate()
        .map_err(|v| validation_problem(v, uri.path()))?;

    let created = svc
        .create_owner(owner)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    let id = created.id.to_string();
    Ok(created_json(OwnerDto::from(created), &uri, &id))
}

/// GET /api/gateway/owners/{ownerId}
///
/// Owner with pets and their visits. Visits are empty when the visits service
/// is unavailable.
pub async fn get_owner(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<OwnerDto>> {
    let owner_id = parse_id("ownerId", &owner_id, &uri)?;
    let owner = svc
        .get_owner_with_visits(owner_id)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(owner.into()))
}

/// PUT /api/gateway/owners/{ownerId}
pub async fn update_owner(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(owner_id): Path<String>,
    body: Result<Json<OwnerRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let owner_id = parse_id("ownerId", &owner_id, &uri)?;
    let owner = json_body(body, &uri)?
        .validate()
        .map_err(|v| validation_problem(v, uri.path()))?;

    svc.update_owner(owner_id, owner)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(no_content())
}

/// GET /api/gateway/petTypes
pub async fn list_pet_types(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> ApiResult<Json<Vec<PetTypeDto>>> {
    let types = svc
        .list_pet_types()
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(types.into_iter().map(PetTypeDto::from).collect()))
}

/// POST /api/gateway/owners/{ownerId}/pets
pub async fn create_pet(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(owner_id): Path<String>,
    body: Result<Json<PetRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let owner_id = parse_id("ownerId", &owner_id, &uri)?;
    let pet = json_body(body, &uri)?
        .validate()
        .map_err(|v| validation_problem(v, uri.path()))?;

    let created = svc
        .create_pet(owner_id, pet)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    let id = created.id.to_string();
    Ok(created_json(PetDto::from(created), &uri, &id))
}

/// GET /api/gateway/owners/{ownerId}/pets/{petId}
///
/// Pets are addressed by id alone; `ownerId` is only checked for shape.
pub async fn find_pet(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path((owner_id, pet_id)): Path<(String, String)>,
) -> ApiResult<Json<PetDto>> {
    parse_id("ownerId", &owner_id, &uri)?;
    let pet_id = parse_id("petId", &pet_id, &uri)?;
    let pet = svc
        .find_pet(pet_id)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(pet.into()))
}

/// PUT /api/gateway/owners/{ownerId}/pets/{petId}
pub async fn update_pet(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path((owner_id, pet_id)): Path<(String, String)>,
    body: Result<Json<PetRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    parse_id("ownerId", &owner_id, &uri)?;
    let pet_id = parse_id("petId", &pet_id, &uri)?;
    let pet = json_body(body, &uri)?
        .validate()
        .map_err(|v| validation_problem(v, uri.path()))?;

    svc.update_pet(pet_id, pet)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(no_content())
}

/// GET /api/gateway/owners/{ownerId}/pets/{petId}/visits
pub async fn list_visits(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path((owner_id, pet_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<VisitDto>>> {
    parse_id("ownerId", &owner_id, &uri)?;
    let pet_id = parse_id("petId", &pet_id, &uri)?;
    let visits = svc
        .list_visits_for_pet(pet_id)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(Json(visits.into_iter().map(VisitDto::from).collect()))
}

/// POST /api/gateway/owners/{ownerId}/pets/{petId}/visits
pub async fn create_visit(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path((owner_id, pet_id)): Path<(String, String)>,
    body: Result<Json<VisitRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    parse_id("ownerId", &owner_id, &uri)?;
    let pet_id = parse_id("petId", &pet_id, &uri)?;
    let visit = json_body(body, &uri)?
        .validate(pet_id)
        .map_err(|v| validation_problem(v, uri.path()))?;

    let created_visit = svc
        .create_visit(pet_id, visit)
        .await
        .map_err(|e| domain_error_to_problem(&e, uri.path()))?;
    Ok(created(VisitDto::from(created_visit)))
}

/// GET /api/gateway/health
pub async fn health(Extension(svc): Extension<Arc<Service>>) -> Json<HealthDto> {
    Json(svc.visits_breaker_snapshot().into())
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> Problem {
    catalog::ROUTE_NOT_FOUND.with_context(
        format!("No route for {}", uri.path()),
        uri.path(),
        current_trace_id(),
    )
}
