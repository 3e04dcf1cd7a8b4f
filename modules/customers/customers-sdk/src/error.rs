/// Error type for customers service operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomersError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i32 },

    #[error("gRPC transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CustomersError {
    /// Map a gRPC status; `NOT_FOUND` becomes [`CustomersError::NotFound`] for the given record.
    pub(crate) fn from_status(status: &tonic::Status, resource: &'static str, id: i32) -> Self {
        use tonic::Code;

        match status.code() {
            Code::NotFound => Self::NotFound { resource, id },
            Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Unknown => {
                Self::Transport(format!("{}: {}", status.code(), status.message()))
            }
            _ => Self::Internal(format!("{}: {}", status.code(), status.message())),
        }
    }
}
