use petclinic_errors::{Problem, ValidationViolation};

use crate::domain::error::DomainError;

/// HTTP-facing error catalog of the gateway.
pub mod catalog {
    use petclinic_errors::ErrDef;

    pub const OWNER_NOT_FOUND: ErrDef = ErrDef {
        status: 404,
        title: "Owner not found",
        code: "PETCLINIC_OWNER_NOT_FOUND",
        type_url: "https://errors.petclinic.local/owner-not-found",
    };

    pub const PET_NOT_FOUND: ErrDef = ErrDef {
        status: 404,
        title: "Pet not found",
        code: "PETCLINIC_PET_NOT_FOUND",
        type_url: "https://errors.petclinic.local/pet-not-found",
    };

    pub const VALIDATION: ErrDef = ErrDef {
        status: 400,
        title: "Validation error",
        code: "PETCLINIC_VALIDATION",
        type_url: "https://errors.petclinic.local/validation",
    };

    pub const MALFORMED_REQUEST: ErrDef = ErrDef {
        status: 400,
        title: "Malformed request",
        code: "PETCLINIC_MALFORMED_REQUEST",
        type_url: "https://errors.petclinic.local/malformed-request",
    };

    pub const ROUTE_NOT_FOUND: ErrDef = ErrDef {
        status: 404,
        title: "Not Found",
        code: "PETCLINIC_ROUTE_NOT_FOUND",
        type_url: "about:blank",
    };

    pub const UPSTREAM_FAILURE: ErrDef = ErrDef {
        status: 500,
        title: "Internal Server Error",
        code: "PETCLINIC_UPSTREAM_FAILURE",
        type_url: "https://errors.petclinic.local/upstream-failure",
    };
}

/// Id of the current span, used as the problem's trace id.
#[must_use]
pub fn current_trace_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Map domain error to RFC 9457 Problem using the error catalog
#[must_use]
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = current_trace_id();

    match e {
        DomainError::OwnerNotFound(_) => {
            catalog::OWNER_NOT_FOUND.with_context(e.to_string(), instance, trace_id)
        }
        DomainError::PetNotFound(_) => {
            catalog::PET_NOT_FOUND.with_context(e.to_string(), instance, trace_id)
        }
        DomainError::Validation { field, message } => validation_problem(
            vec![ValidationViolation::new(field.as_str(), message.as_str())],
            instance,
        ),
        DomainError::Customers(_) | DomainError::Visits(_) => {
            tracing::error!(error = %e, "Upstream service call failed");
            catalog::UPSTREAM_FAILURE.with_context(
                "An internal error occurred",
                instance,
                trace_id,
            )
        }
    }
}

/// 400 with one entry per invalid field.
#[must_use]
pub fn validation_problem(violations: Vec<ValidationViolation>, instance: &str) -> Problem {
    let detail = violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ");
    catalog::VALIDATION
        .with_context(detail, instance, current_trace_id())
        .with_errors(violations)
}

/// 400 for a request that could not be parsed at all (bad id, broken JSON).
#[must_use]
pub fn malformed_request(detail: impl Into<String>, instance: &str) -> Problem {
    catalog::MALFORMED_REQUEST.with_context(detail, instance, current_trace_id())
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}
