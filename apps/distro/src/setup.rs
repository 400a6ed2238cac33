//! Startup: configuration precedence and the persisted catalog

use distro_catalog::{CatalogFile, MemoryStore};
use distro_config::Config;
use std::sync::Arc;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::error::CliError;

/// Resolve configuration: file (or defaults), then environment, then flags
pub async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, global);
    config.validate()?;
    Ok(config)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(max) = global.max_concurrent {
        config.transfer.max_concurrent = max;
        config.transfer.quick_link_max_concurrent = max;
    }
    if let Some(dir) = &global.temp_dir {
        config.cleanup.temp_dir = Some(dir.clone());
    }
}

/// The target catalog loaded from disk
pub struct Catalog {
    file: CatalogFile,
    pub store: Arc<MemoryStore>,
}

impl Catalog {
    pub async fn open(config: &Config) -> Result<Self, CliError> {
        let file = CatalogFile::new(config.catalog_path());
        let document = file.load().await?;
        debug!(path = %file.path().display(), targets = document.targets.len(), "catalog loaded");
        Ok(Self {
            file,
            store: Arc::new(MemoryStore::from_document(document)),
        })
    }

    /// Write the store back, including metadata learned during this run
    pub async fn persist(&self) -> Result<(), CliError> {
        self.file.save(&self.store.to_document()).await?;
        Ok(())
    }
}
