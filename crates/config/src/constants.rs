//! Fixed names and placeholders that are not exposed via TOML configuration.

/// Directory name used under the platform config/cache/data dirs
pub const APP_DIR_NAME: &str = "distro";

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CATALOG_FILE_NAME: &str = "catalog.json";

/// Token substituted with the requested version in a URL pattern
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Tokens substituted in install/uninstall command templates
pub const FILE_PLACEHOLDER: &str = "{file}";
pub const PACKAGE_PLACEHOLDER: &str = "{package}";

/// Format version written into catalog import/export documents
pub const CATALOG_FORMAT_VERSION: &str = "1";
