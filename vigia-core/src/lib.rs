pub mod narrative;
pub mod registry;
pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Missing or malformed required input; rejected before any scoring
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Registry or narrative collaborator unreachable; callers degrade to
    /// locally-known signals rather than failing the whole assessment
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Concurrent modification on order {order_id}: expected {expected}, found {actual}")]
    ConcurrentModification {
        order_id: String,
        expected: String,
        actual: String,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
