//! Catalog storage error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("catalog parse error: {message}")]
    CatalogParse { message: String },

    #[error("unsupported catalog format version: {version}")]
    UnsupportedFormat { version: String },

    #[error("a target with URL pattern {url_pattern} already exists")]
    DuplicateTarget { url_pattern: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
        }
    }
}

impl UserFacingError for StorageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CatalogParse { .. } | Self::UnsupportedFormat { .. } => {
                Some("Check that the file was produced by `distro export`.")
            }
            Self::DuplicateTarget { .. } => Some("Edit the existing target instead."),
            Self::IoError { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::CatalogParse { .. } => "storage.catalog_parse",
            Self::UnsupportedFormat { .. } => "storage.unsupported_format",
            Self::DuplicateTarget { .. } => "storage.duplicate_target",
            Self::IoError { .. } => "storage.io",
        })
    }
}
