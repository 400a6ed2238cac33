//! On-disk catalog persistence

use crate::models::CatalogDocument;
use distro_errors::{Error, StorageError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// JSON catalog file
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog; a missing file is an empty catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<CatalogDocument, Error> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => CatalogDocument::from_json(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no catalog file yet");
                Ok(CatalogDocument::default())
            }
            Err(e) => Err(StorageError::IoError {
                message: format!("failed to read catalog {}: {e}", self.path.display()),
            }
            .into()),
        }
    }

    /// Save the catalog through a temporary file and rename
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot be written.
    pub async fn save(&self, document: &CatalogDocument) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::IoError {
                    message: format!("failed to create catalog dir: {e}"),
                })?;
        }

        let json = document.to_json()?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .await
            .map_err(|e| StorageError::IoError {
                message: format!("failed to write catalog: {e}"),
            })?;

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::IoError {
                message: format!("failed to rename catalog file: {e}"),
            })?;

        Ok(())
    }
}
