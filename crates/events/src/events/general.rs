use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Events not tied to one batch, queue or sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    Warning {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    /// An operation gave up; the failure carries the error's code and hint
    Failed {
        operation: String,
        failure: FailureContext,
    },

    Debug { message: String },
}

impl GeneralEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: None,
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::Debug {
            message: message.into(),
        }
    }
}
