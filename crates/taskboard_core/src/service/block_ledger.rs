//! Block ledger use-case service.
//!
//! # Responsibility
//! - Record block/unblock episodes per card.
//! - Answer whether a card is currently blocked.
//!
//! # Invariants
//! - At most one active record per card. `block` checks before inserting and
//!   relies on the caller's transaction to keep check and insert together.
//! - Records are resolved in place and never deleted.

use crate::model::block::BlockRecord;
use crate::model::card::CardId;
use crate::model::{now_epoch_ms, EntityKind};
use crate::repo::block_repo::BlockRepository;
use crate::repo::RepoError;
use crate::service::ErrorCategory;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from block ledger operations.
#[derive(Debug)]
pub enum BlockLedgerError {
    /// Block/unblock reason is blank after trim.
    EmptyReason,
    /// Card already has an active block.
    CardAlreadyBlocked(CardId),
    /// Card has no active block to resolve.
    CardNotBlocked(CardId),
    /// Addressed card or block does not exist.
    EntityNotFound { entity: EntityKind, id: Uuid },
    /// Repository-level failure.
    Repo(RepoError),
}

impl BlockLedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyReason => ErrorCategory::Validation,
            Self::CardAlreadyBlocked(_) | Self::CardNotBlocked(_) => ErrorCategory::StateConflict,
            Self::EntityNotFound { .. } => ErrorCategory::NotFound,
            Self::Repo(_) => ErrorCategory::Storage,
        }
    }
}

impl Display for BlockLedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyReason => write!(f, "block reason must not be blank"),
            Self::CardAlreadyBlocked(id) => write!(f, "card is already blocked: {id}"),
            Self::CardNotBlocked(id) => write!(f, "card is not blocked: {id}"),
            Self::EntityNotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlockLedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BlockLedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::EntityNotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

/// Block ledger facade over a block repository.
pub struct BlockLedger<R: BlockRepository> {
    repo: R,
}

impl<R: BlockRepository> BlockLedger<R> {
    /// Creates ledger from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Opens a new block on a card.
    pub fn block(
        &self,
        card_id: CardId,
        reason: impl Into<String>,
    ) -> Result<BlockRecord, BlockLedgerError> {
        let reason = normalize_reason(reason.into())?;
        self.ensure_card_exists(card_id)?;
        if self.repo.find_active_by_card(card_id)?.is_some() {
            return Err(BlockLedgerError::CardAlreadyBlocked(card_id));
        }

        let record = BlockRecord::open(now_epoch_ms(), reason);
        self.repo.insert_block(&record)?;
        self.repo.link_card_block(card_id, record.id)?;
        info!(
            "event=card_block module=ledger status=ok card_id={card_id} block_id={}",
            record.id
        );
        Ok(record)
    }

    /// Resolves the active block of a card.
    pub fn unblock(
        &self,
        card_id: CardId,
        reason: impl Into<String>,
    ) -> Result<BlockRecord, BlockLedgerError> {
        let reason = normalize_reason(reason.into())?;
        self.ensure_card_exists(card_id)?;
        let mut record = self
            .repo
            .find_active_by_card(card_id)?
            .ok_or(BlockLedgerError::CardNotBlocked(card_id))?;

        // Clamp so a wall-clock step backwards never yields unblocked_at < blocked_at.
        let unblocked_at = now_epoch_ms().max(record.blocked_at);
        record.resolve(unblocked_at, reason);
        self.repo.update_block(&record)?;
        info!(
            "event=card_unblock module=ledger status=ok card_id={card_id} block_id={}",
            record.id
        );
        Ok(record)
    }

    /// Returns the active block of a card, if any.
    pub fn active_block(&self, card_id: CardId) -> Result<Option<BlockRecord>, BlockLedgerError> {
        self.ensure_card_exists(card_id)?;
        self.repo.find_active_by_card(card_id).map_err(Into::into)
    }

    /// Whether the card has an active block.
    pub fn is_blocked(&self, card_id: CardId) -> Result<bool, BlockLedgerError> {
        Ok(self.active_block(card_id)?.is_some())
    }

    /// Lists every block record of a card, most recent first.
    pub fn history(&self, card_id: CardId) -> Result<Vec<BlockRecord>, BlockLedgerError> {
        self.ensure_card_exists(card_id)?;
        self.repo.list_by_card(card_id).map_err(Into::into)
    }

    /// Counts block records of a card, active and resolved.
    pub fn count_blocks(&self, card_id: CardId) -> Result<u32, BlockLedgerError> {
        self.ensure_card_exists(card_id)?;
        self.repo.count_by_card(card_id).map_err(Into::into)
    }

    fn ensure_card_exists(&self, card_id: CardId) -> Result<(), BlockLedgerError> {
        if self.repo.card_exists(card_id)? {
            return Ok(());
        }
        Err(BlockLedgerError::EntityNotFound {
            entity: EntityKind::Card,
            id: card_id,
        })
    }
}

fn normalize_reason(value: String) -> Result<String, BlockLedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BlockLedgerError::EmptyReason);
    }
    Ok(trimmed.to_string())
}
