use axum::{
    Json,
    http::{StatusCode, Uri, header},
    response::IntoResponse,
};
use petclinic_errors::Problem;

/// Result type of every REST handler.
pub type ApiResult<T> = Result<T, Problem>;

/// 201 Created + JSON with Location header
pub fn created_json<T: serde::Serialize>(
    value: T,
    uri: &Uri,
    new_id: &str,
) -> impl IntoResponse + use<T> {
    let location = [uri.path().trim_end_matches('/'), new_id].join("/");
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(value),
    )
}

/// 201 Created + JSON, for resources without their own URL
pub fn created<T: serde::Serialize>(value: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(value))
}

/// 204 No Content
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
