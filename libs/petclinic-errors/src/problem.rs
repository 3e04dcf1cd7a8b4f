//! RFC 9457 problem documents.

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Content type of every error body the gateway sends.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Problem document as sent on the wire. `status` is a plain number there.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(with = "status_as_u16")]
    pub status: StatusCode,
    pub detail: String,
    /// Request path the problem occurred on.
    #[serde(default)]
    pub instance: String,
    /// Catalog code, e.g. `PETCLINIC_OWNER_NOT_FOUND`.
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// One entry per rejected field; only on validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

/// A rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// JSON name of the field, e.g. "firstName" or "birthDate"
    pub field: String,
    pub message: String,
}

impl ValidationViolation {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Problem {
    /// Untyped problem (`about:blank`) without code or request context.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
        }
    }

    /// Bind the problem to the request it answers.
    pub fn at(mut self, instance: &str, trace_id: Option<String>) -> Self {
        instance.clone_into(&mut self.instance);
        self.trace_id = trace_id;
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }
}

mod status_as_u16 {
    use http::StatusCode;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde's `with` signature
    pub fn serialize<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<StatusCode, D::Error> {
        StatusCode::from_u16(u16::deserialize(d)?).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            [(http::header::CONTENT_TYPE, APPLICATION_PROBLEM_JSON)],
            axum::Json(self),
        )
            .into_response()
    }
}
