use thiserror::Error;

/// Failures recovered at the dispatcher boundary.
///
/// Every variant becomes a `status: "error"` reply; none of them aborts
/// the serve loop or touches the event log.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid request payload: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),
}
