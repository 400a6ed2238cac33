//! Aggregate state of one bulk submission

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ItemState, TargetId, TransferTarget};

/// Identifier of a batch; also used as event correlation id
pub type BatchId = Uuid;

/// How the download URL of each target is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BatchSource {
    /// Substitute the version token into each target's URL template
    Version(String),
    /// Use each target's quick link with this name
    QuickLink(String),
}

impl BatchSource {
    /// The version token or quick-link name
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Version(v) | Self::QuickLink(v) => v,
        }
    }
}

/// One target inside a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub target: TransferTarget,
    /// Fully resolved download URL
    pub url: String,
    pub state: ItemState,
    /// Position at submission time; display order never changes
    pub order: usize,
}

impl BatchItem {
    #[must_use]
    pub fn id(&self) -> TargetId {
        self.target.id
    }
}

/// Result of merging one item transition into the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Non-terminal update recorded
    Updated,
    /// Item reached `Succeeded`
    Succeeded,
    /// Item reached `Failed`
    Failed,
    /// Update dropped (unknown item, stale batch or terminal item)
    Ignored,
}

/// Live state of the current batch
///
/// Invariants: `completed` equals the number of terminal items,
/// `failed <= completed <= total`, and `completed == total` once
/// `is_active` is false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchState {
    pub batch_id: Option<BatchId>,
    pub items: Vec<BatchItem>,
    pub is_active: bool,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    /// Set when every item has terminated; advisory only
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchState {
    /// Fresh active batch over `items`
    #[must_use]
    pub fn start(batch_id: BatchId, items: Vec<BatchItem>) -> Self {
        let total = items.len();
        Self {
            batch_id: Some(batch_id),
            items,
            is_active: total > 0,
            completed: 0,
            failed: 0,
            total,
            completed_at: None,
        }
    }

    /// Merge a transition for `id` coming from batch `batch_id`.
    ///
    /// Counters move together with the item state so a reader never sees
    /// one without the other.
    pub fn merge(&mut self, batch_id: BatchId, id: TargetId, next: ItemState) -> MergeOutcome {
        if self.batch_id != Some(batch_id) {
            return MergeOutcome::Ignored;
        }
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return MergeOutcome::Ignored;
        };
        if !item.state.can_transition_to(&next) {
            return MergeOutcome::Ignored;
        }

        let outcome = match &next {
            ItemState::Succeeded { .. } => MergeOutcome::Succeeded,
            ItemState::Failed { .. } => MergeOutcome::Failed,
            ItemState::Idle | ItemState::Downloading(_) => MergeOutcome::Updated,
        };
        item.state = next;

        match outcome {
            MergeOutcome::Succeeded => self.completed += 1,
            MergeOutcome::Failed => {
                self.completed += 1;
                self.failed += 1;
            }
            MergeOutcome::Updated | MergeOutcome::Ignored => {}
        }
        outcome
    }

    /// Mark the batch finished once every item has terminated.
    ///
    /// Returns `false` (and leaves the batch active) if items are still
    /// running or the batch id does not match.
    pub fn finish(&mut self, batch_id: BatchId, now: DateTime<Utc>) -> bool {
        if self.batch_id != Some(batch_id) || self.completed != self.total {
            return false;
        }
        self.is_active = false;
        self.completed_at = Some(now);
        true
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }

    /// Items in display (submission) order
    pub fn ordered_items(&self) -> impl Iterator<Item = &BatchItem> {
        let mut items: Vec<&BatchItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.order);
        items.into_iter()
    }

    /// Hide success banners of a finished batch: `Succeeded` items go back to
    /// `Idle` and the completion stamp is cleared. Counters are kept.
    pub fn clear_success_messages(&mut self) {
        for item in &mut self.items {
            if matches!(item.state, ItemState::Succeeded { .. }) {
                item.state = ItemState::Idle;
            }
        }
        self.completed_at = None;
    }
}
