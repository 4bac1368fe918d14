/// Errors raised by a reducer. The state is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReducerError {
    #[error("Set index {index} is out of range (at most {max} sets per exercise)")]
    SetIndexOutOfRange { index: usize, max: usize },

    #[error("{action} produced an invalid state: {message}")]
    InvalidState { action: String, message: String },
}

/// Errors returned from [`Store::dispatch`](super::Store::dispatch).
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Action must have a string type property")]
    MissingType,

    #[error("Unknown action type '{0}'")]
    UnknownAction(String),

    #[error("Invalid payload for {action}: {message}")]
    InvalidPayload { action: String, message: String },

    #[error("Cannot dispatch while dispatching")]
    Reentrant,

    #[error("Reducer error: {0}")]
    Reducer(#[from] ReducerError),

    #[error("Action {action} rejected: {reason}")]
    Rejected { action: String, reason: String },

    #[error("No Tokio runtime is running; timed middleware needs one")]
    NoRuntime,
}
