//! Block record model.
//!
//! # Responsibility
//! - Represent one block/unblock episode raised against a card.
//!
//! # Invariants
//! - A record is active while `unblocked_at` is `None`.
//! - `unblocked_at` and `unblock_reason` are set together, exactly once.
//! - Records are historical and never deleted by core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BlockId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    /// Unix epoch milliseconds.
    pub blocked_at: i64,
    pub block_reason: String,
    /// Unix epoch milliseconds; `None` while the block is active.
    pub unblocked_at: Option<i64>,
    pub unblock_reason: Option<String>,
}

impl BlockRecord {
    /// Opens a new active block.
    pub fn open(blocked_at: i64, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            blocked_at,
            block_reason: reason.into(),
            unblocked_at: None,
            unblock_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.unblocked_at.is_none()
    }

    /// Resolves the block. Resolving twice keeps the first resolution.
    pub fn resolve(&mut self, unblocked_at: i64, reason: impl Into<String>) {
        if !self.is_active() {
            return;
        }
        self.unblocked_at = Some(unblocked_at);
        self.unblock_reason = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::BlockRecord;

    #[test]
    fn resolve_sets_both_fields_once() {
        let mut record = BlockRecord::open(1_000, "waiting on vendor");
        assert!(record.is_active());

        record.resolve(2_000, "vendor replied");
        record.resolve(3_000, "ignored");

        assert!(!record.is_active());
        assert_eq!(record.unblocked_at, Some(2_000));
        assert_eq!(record.unblock_reason.as_deref(), Some("vendor replied"));
    }
}
