//! Error catalog support.
//!
//! Each HTTP-facing error condition is declared once as a static [`ErrDef`]
//! and turned into a [`Problem`] with a request-specific detail.

use crate::problem::Problem;
use http::StatusCode;

/// Static error definition from catalog
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Problem for this entry with an occurrence-specific detail.
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        Problem {
            type_url: self.type_url.to_owned(),
            code: self.code.to_owned(),
            // an invalid code in a catalog entry degrades to 500
            ..Problem::new(
                StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                self.title,
                detail,
            )
        }
    }

    /// Same as [`ErrDef::as_problem`], bound to the request path and trace id.
    pub fn with_context(
        &self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> Problem {
        self.as_problem(detail).at(instance, trace_id)
    }
}
