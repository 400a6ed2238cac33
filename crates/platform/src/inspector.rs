//! Package metadata extraction

use distro_config::constants;
use distro_types::PackageMetadata;
use std::path::Path;

use crate::process::CommandTemplate;

/// Best-effort metadata probe for a downloaded artifact
///
/// Returns `None` for anything it cannot read; never fails.
pub trait PackageInspector: Send + Sync {
    fn inspect(&self, file: &Path) -> Option<PackageMetadata>;
}

/// Inspector used when no probe is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInspector;

impl PackageInspector for NoopInspector {
    fn inspect(&self, _file: &Path) -> Option<PackageMetadata> {
        None
    }
}

/// Runs a badging dump command and parses its output
///
/// Expects `aapt dump badging` style lines:
/// `package: name='com.example' versionCode='42' versionName='1.2.0'` and
/// `application-label:'Example'`.
#[derive(Debug, Clone)]
pub struct BadgingInspector {
    command: CommandTemplate,
}

impl BadgingInspector {
    #[must_use]
    pub fn new(command: CommandTemplate) -> Self {
        Self { command }
    }
}

impl PackageInspector for BadgingInspector {
    fn inspect(&self, file: &Path) -> Option<PackageMetadata> {
        let command = self
            .command
            .render(constants::FILE_PLACEHOLDER, &file.display().to_string())
            .ok()?;
        let output = match command.to_std().output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tracing::debug!(status = ?output.status, "inspect command failed");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "inspect command could not start");
                return None;
            }
        };
        parse_badging(&String::from_utf8_lossy(&output.stdout))
    }
}

fn quoted_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let start = line.find(&format!("{key}='"))? + key.len() + 2;
    let end = line[start..].find('\'')? + start;
    Some(&line[start..end])
}

/// Parse badging output; `None` unless a package name is present
#[must_use]
pub fn parse_badging(output: &str) -> Option<PackageMetadata> {
    let mut metadata: Option<PackageMetadata> = None;
    let mut label = None;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("package:") {
            let name = quoted_value(rest, "name")?;
            metadata = Some(PackageMetadata {
                install_identifier: name.to_string(),
                version_label: quoted_value(rest, "versionName").unwrap_or_default().to_string(),
                version_ordinal: quoted_value(rest, "versionCode")
                    .and_then(|code| code.parse().ok())
                    .unwrap_or_default(),
                display_label: String::new(),
            });
        } else if let Some(rest) = line.strip_prefix("application-label:") {
            label = Some(rest.trim().trim_matches('\'').to_string());
        }
    }

    let mut metadata = metadata?;
    if let Some(label) = label {
        metadata.display_label = label;
    }
    Some(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_line_and_label() {
        let output = "package: name='com.example.app' versionCode='42' versionName='1.2.0' platformBuildVersionName=''\n\
                      sdkVersion:'24'\n\
                      application-label:'Example App'\n";
        let metadata = parse_badging(output).unwrap();
        assert_eq!(metadata.install_identifier, "com.example.app");
        assert_eq!(metadata.version_label, "1.2.0");
        assert_eq!(metadata.version_ordinal, 42);
        assert_eq!(metadata.display_label, "Example App");
    }

    #[test]
    fn garbage_yields_none() {
        assert!(parse_badging("ERROR: dump failed because no AndroidManifest.xml found").is_none());
    }

    #[test]
    fn noop_returns_nothing() {
        assert!(NoopInspector.inspect(Path::new("/tmp/x.apk")).is_none());
    }
}
