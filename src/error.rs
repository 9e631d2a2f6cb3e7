use std::fmt;

use thiserror::Error;

/// External service a fault originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Weather,
    Prediction,
    Health,
}

impl ServiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Weather => "weather",
            ServiceKind::Prediction => "prediction",
            ServiceKind::Health => "health",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can go wrong while producing an assessment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisoryError {
    #[error("no assessment inputs have been submitted")]
    MissingInputs,

    #[error("invalid assessment inputs: {0}")]
    InvalidInputs(String),

    #[error("{service} service unreachable: {reason}")]
    Transport {
        service: ServiceKind,
        reason: String,
    },

    #[error("{service} service returned status {status}")]
    Service {
        service: ServiceKind,
        status: u16,
    },

    #[error("{service} service sent an unreadable response: {reason}")]
    MalformedResponse {
        service: ServiceKind,
        reason: String,
    },

    #[error("assessment was interrupted before it finished")]
    Interrupted,
}

impl AdvisoryError {
    /// Faults the user fixes by going back to the input form
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            AdvisoryError::MissingInputs | AdvisoryError::InvalidInputs(_)
        )
    }

    /// Origin of an external-call fault, if any
    pub fn service(&self) -> Option<ServiceKind> {
        match self {
            AdvisoryError::Transport { service, .. }
            | AdvisoryError::Service { service, .. }
            | AdvisoryError::MalformedResponse { service, .. } => Some(*service),
            AdvisoryError::MissingInputs
            | AdvisoryError::InvalidInputs(_)
            | AdvisoryError::Interrupted => None,
        }
    }
}

pub type AdvisoryResult<T> = std::result::Result<T, AdvisoryError>;
