//! Visits API trait and error type

use async_trait::async_trait;

use crate::models::{NewVisit, Visit};

/// Visit-history client.
#[async_trait]
pub trait VisitsClientV1: Send + Sync {
    /// Visits of every pet in `pet_ids`, in the order the service returns them.
    /// An empty id set yields an empty list.
    async fn find_visits_by_pet_ids(&self, pet_ids: &[i32]) -> Result<Vec<Visit>, VisitsError>;

    /// Store a visit and return the stored record.
    async fn create_visit(&self, visit: NewVisit) -> Result<Visit, VisitsError>;
}

/// Error type for visits service operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VisitsError {
    #[error("pet {pet_id} not found")]
    NotFound { pet_id: i32 },

    #[error("gRPC transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl VisitsError {
    /// Map a gRPC status; `NOT_FOUND` names the pet the request was about.
    pub(crate) fn from_status(status: &tonic::Status, pet_id: i32) -> Self {
        use tonic::Code;

        match status.code() {
            Code::NotFound => Self::NotFound { pet_id },
            Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Unknown => {
                Self::Transport(format!("{}: {}", status.code(), status.message()))
            }
            _ => Self::Internal(format!("{}: {}", status.code(), status.message())),
        }
    }
}
