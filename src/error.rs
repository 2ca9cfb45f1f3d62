use thiserror::Error;

use crate::models::ShipmentStatus;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("policy violation: {reason}")]
    PolicyViolation { reason: String },

    #[error("invalid transition: {attempted} is not permitted from {from}")]
    InvalidTransition { from: String, attempted: String },

    #[error("shipment is already {status}")]
    NoOpTransition { status: ShipmentStatus },

    #[error("a manifest must keep at least one delivery stop")]
    MinimumStopViolation,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl EngineError {
    pub fn policy(reason: impl Into<String>) -> Self {
        Self::PolicyViolation {
            reason: reason.into(),
        }
    }

    pub fn invalid_transition(from: impl ToString, attempted: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            attempted: attempted.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
