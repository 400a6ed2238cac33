//! Turning target ids into batch items

use distro_catalog::TargetStore;
use distro_config::constants::VERSION_PLACEHOLDER;
use distro_types::{BatchItem, BatchSource, ItemState, TargetId, TransferTarget};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Why a requested target did not make it into the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExclusionReason {
    UnknownTarget,
    /// Version batch on a URL pattern without `{version}`
    MissingVersionToken,
    MissingQuickLink(String),
    InvalidUrl(String),
    Duplicate,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTarget => write!(f, "unknown target"),
            Self::MissingVersionToken => {
                write!(f, "url pattern has no {VERSION_PLACEHOLDER} token")
            }
            Self::MissingQuickLink(name) => write!(f, "no quick link named '{name}'"),
            Self::InvalidUrl(url) => write!(f, "invalid url {url}"),
            Self::Duplicate => write!(f, "listed more than once"),
        }
    }
}

/// A target left out of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub target_id: TargetId,
    pub name: Option<String>,
    pub reason: ExclusionReason,
}

#[derive(Debug, Default)]
pub(crate) struct Resolution {
    pub items: Vec<BatchItem>,
    pub excluded: Vec<Exclusion>,
}

/// Resolve the download URL of `target` for `source`
pub(crate) fn resolve_url(
    target: &TransferTarget,
    source: &BatchSource,
) -> Result<String, ExclusionReason> {
    let url = match source {
        BatchSource::Version(version) => {
            if !target.url_pattern.contains(VERSION_PLACEHOLDER) {
                return Err(ExclusionReason::MissingVersionToken);
            }
            target.url_pattern.replace(VERSION_PLACEHOLDER, version)
        }
        BatchSource::QuickLink(name) => target
            .quick_link(name)
            .map(|ql| ql.link.clone())
            .ok_or_else(|| ExclusionReason::MissingQuickLink(name.clone()))?,
    };

    distro_net::parse_url(&url).map_err(|_| ExclusionReason::InvalidUrl(url.clone()))?;
    Ok(url)
}

/// Look up `ids` and resolve each one; `order` is the position among the
/// included items.
pub(crate) fn resolve(store: &dyn TargetStore, ids: &[TargetId], source: &BatchSource) -> Resolution {
    let mut seen = HashSet::new();
    let mut resolution = Resolution::default();

    for &id in ids {
        if !seen.insert(id) {
            resolution.excluded.push(Exclusion {
                target_id: id,
                name: None,
                reason: ExclusionReason::Duplicate,
            });
            continue;
        }
        let Some(target) = store.get(id) else {
            resolution.excluded.push(Exclusion {
                target_id: id,
                name: None,
                reason: ExclusionReason::UnknownTarget,
            });
            continue;
        };

        match resolve_url(&target, source) {
            Ok(url) => {
                let order = resolution.items.len();
                resolution.items.push(BatchItem {
                    target,
                    url,
                    state: ItemState::Idle,
                    order,
                });
            }
            Err(reason) => resolution.excluded.push(Exclusion {
                target_id: id,
                name: Some(target.display_name()),
                reason,
            }),
        }
    }
    resolution
}
