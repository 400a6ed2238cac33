//! Configured download targets

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for targets whose real label has not been discovered yet
pub const PLACEHOLDER_NAME: &str = "App";

/// Identifier of a target in the configuration store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub i64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TargetId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A named, pre-resolved direct download URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickLink {
    pub name: String,
    pub link: String,
}

/// Metadata extracted from a downloaded artifact by the package inspector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub install_identifier: String,
    pub version_label: String,
    pub version_ordinal: i64,
    pub display_label: String,
}

/// A configured remote-installable package source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTarget {
    pub id: TargetId,
    pub name: String,
    /// URL template; `{version}` is substituted for version batches
    pub url_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_ordinal: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_links: Vec<QuickLink>,
}

impl TransferTarget {
    /// Create a target with only the user-provided fields set
    pub fn new(id: i64, name: impl Into<String>, url_pattern: impl Into<String>) -> Self {
        Self {
            id: TargetId(id),
            name: name.into(),
            url_pattern: url_pattern.into(),
            install_identifier: None,
            version_label: None,
            version_ordinal: None,
            display_label: None,
            quick_links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_install_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.install_identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_quick_link(mut self, name: impl Into<String>, link: impl Into<String>) -> Self {
        self.quick_links.push(QuickLink {
            name: name.into(),
            link: link.into(),
        });
        self
    }

    /// Name shown to the user: the configured name, else the cached label
    #[must_use]
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        self.display_label
            .clone()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_NAME.to_string())
    }

    /// Install identifier usable for removal, if any
    #[must_use]
    pub fn resolvable_identifier(&self) -> Option<&str> {
        self.install_identifier
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Find a quick link by its exact name
    #[must_use]
    pub fn quick_link(&self, name: &str) -> Option<&QuickLink> {
        self.quick_links.iter().find(|ql| ql.name == name)
    }

    /// Return an updated copy carrying `metadata`, or `None` when the cached
    /// metadata already matches.
    #[must_use]
    pub fn with_metadata(&self, metadata: &PackageMetadata) -> Option<Self> {
        let name = if self.name.trim().is_empty() || self.name == PLACEHOLDER_NAME {
            metadata.display_label.clone()
        } else {
            self.name.clone()
        };

        let updated = Self {
            name,
            install_identifier: Some(metadata.install_identifier.clone()),
            version_label: Some(metadata.version_label.clone()),
            version_ordinal: Some(metadata.version_ordinal),
            display_label: Some(metadata.display_label.clone()),
            ..self.clone()
        };

        (updated != *self).then_some(updated)
    }
}
