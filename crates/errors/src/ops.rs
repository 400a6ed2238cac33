//! Orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("missing component: {component}")]
    MissingComponent { component: String },

    #[error("no targets selected")]
    NoTargetsSelected,
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoTargetsSelected => Some("Pass at least one target id; `distro list` shows them."),
            Self::MissingComponent { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::NoTargetsSelected => "ops.no_targets_selected",
        })
    }
}
