//! Catalog documents

use distro_config::constants::CATALOG_FORMAT_VERSION;
use distro_errors::{Error, StorageError};
use distro_types::{QuickLink, TransferTarget};
use serde::{Deserialize, Serialize};

/// Portable import/export document
///
/// Only user-provided fields travel; extracted metadata and ids stay local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportList {
    pub version: String,
    pub apps: Vec<ImportItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportItem {
    pub name: String,
    pub url_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_links: Vec<QuickLink>,
}

impl From<&TransferTarget> for ImportItem {
    fn from(target: &TransferTarget) -> Self {
        Self {
            name: target.name.clone(),
            url_pattern: target.url_pattern.clone(),
            package_name: target.install_identifier.clone(),
            quick_links: target.quick_links.clone(),
        }
    }
}

impl ImportItem {
    /// Target with a placeholder id; the store assigns the real one
    #[must_use]
    pub fn into_target(self) -> TransferTarget {
        let mut target = TransferTarget::new(0, self.name, self.url_pattern);
        target.install_identifier = self.package_name;
        target.quick_links = self.quick_links;
        target
    }
}

impl ImportList {
    #[must_use]
    pub fn from_targets<'a>(targets: impl IntoIterator<Item = &'a TransferTarget>) -> Self {
        Self {
            version: CATALOG_FORMAT_VERSION.to_string(),
            apps: targets.into_iter().map(ImportItem::from).collect(),
        }
    }

    /// Parse an import document
    ///
    /// Any version string is accepted; the field exists for forward
    /// compatibility only.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CatalogParse` for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| {
            StorageError::CatalogParse {
                message: format!("invalid import JSON: {e}"),
            }
            .into()
        })
    }

    /// # Errors
    ///
    /// Returns an error if the list cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }
}

/// Full local catalog, including ids and extracted metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub version: String,
    pub targets: Vec<TransferTarget>,
}

impl Default for CatalogDocument {
    fn default() -> Self {
        Self {
            version: CATALOG_FORMAT_VERSION.to_string(),
            targets: Vec::new(),
        }
    }
}

impl CatalogDocument {
    /// Parse a catalog file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CatalogParse` for malformed JSON and
    /// `StorageError::UnsupportedFormat` for another format version.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let document: Self = serde_json::from_str(json).map_err(|e| StorageError::CatalogParse {
            message: format!("invalid catalog JSON: {e}"),
        })?;
        if document.version != CATALOG_FORMAT_VERSION {
            return Err(StorageError::UnsupportedFormat {
                version: document.version,
            }
            .into());
        }
        Ok(document)
    }

    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_item_optional_fields() {
        let item: ImportItem =
            serde_json::from_str(r#"{"name":"MinimalApp","urlPattern":"https://example.com/app.apk"}"#)
                .unwrap();
        assert_eq!(item.package_name, None);
        assert!(item.quick_links.is_empty());

        let item: ImportItem = serde_json::from_str(
            r#"{"name":"NoPkg","urlPattern":"https://example.com/app.apk","packageName":null}"#,
        )
        .unwrap();
        assert_eq!(item.package_name, None);
    }

    #[test]
    fn export_omits_defaults() {
        let targets = [
            TransferTarget::new(1, "App1", "https://example.com/1"),
            TransferTarget::new(2, "App2", "https://example.com/2").with_install_identifier("com.two"),
        ];
        let json = serde_json::to_string(&ImportList::from_targets(&targets)).unwrap();
        assert_eq!(
            json,
            r#"{"version":"1","apps":[{"name":"App1","urlPattern":"https://example.com/1"},{"name":"App2","urlPattern":"https://example.com/2","packageName":"com.two"}]}"#
        );
    }

    #[test]
    fn malformed_import_is_a_parse_error() {
        let err = ImportList::from_json("{\"apps\": 3}").unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::CatalogParse { .. })
        ));
    }

    #[test]
    fn catalog_version_is_checked() {
        let err = CatalogDocument::from_json(r#"{"version":"9","targets":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::UnsupportedFormat { .. })
        ));
    }
}
