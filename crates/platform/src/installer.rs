//! Install and uninstall primitives

use async_trait::async_trait;
use distro_config::{constants, InstallConfig};
use distro_errors::{Error, InstallError};
use std::path::Path;

use crate::process::CommandTemplate;

/// Platform install/uninstall prompts
///
/// Both calls are fire-and-forget: success means the request was handed to
/// the platform, not that the package was installed or removed.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn request_install(&self, file: &Path) -> Result<(), Error>;

    async fn request_uninstall(&self, identifier: &str) -> Result<(), Error>;
}

/// Installer that launches the configured external commands
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    install: CommandTemplate,
    uninstall: CommandTemplate,
}

impl CommandInstaller {
    #[must_use]
    pub fn new(install: CommandTemplate, uninstall: CommandTemplate) -> Self {
        Self { install, uninstall }
    }

    #[must_use]
    pub fn from_config(config: &InstallConfig) -> Self {
        Self::new(
            CommandTemplate::new(config.install_command.clone()),
            CommandTemplate::new(config.uninstall_command.clone()),
        )
    }
}

#[async_trait]
impl PackageInstaller for CommandInstaller {
    async fn request_install(&self, file: &Path) -> Result<(), Error> {
        let path = file.display().to_string();
        let command = self.install.render(constants::FILE_PLACEHOLDER, &path)?;
        tracing::debug!(command = %command.display(), "requesting install");

        // The child keeps running after the handle is dropped
        command
            .to_tokio()
            .spawn()
            .map(drop)
            .map_err(|e| {
                InstallError::InstallRequestFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            })
    }

    async fn request_uninstall(&self, identifier: &str) -> Result<(), Error> {
        let command = self
            .uninstall
            .render(constants::PACKAGE_PLACEHOLDER, identifier)?;
        tracing::debug!(command = %command.display(), "requesting uninstall");

        command
            .to_tokio()
            .spawn()
            .map(drop)
            .map_err(|e| {
                InstallError::UninstallRequestFailed {
                    identifier: identifier.to_string(),
                    message: e.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_reported() {
        let installer = CommandInstaller::new(
            CommandTemplate::new(vec!["distro-no-such-binary".into(), "{file}".into()]),
            CommandTemplate::new(vec!["distro-no-such-binary".into(), "{package}".into()]),
        );

        let err = installer
            .request_install(Path::new("/tmp/temp_x.apk"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::InstallRequestFailed { .. })
        ));

        let err = installer.request_uninstall("com.example").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::UninstallRequestFailed { .. })
        ));
    }
}
