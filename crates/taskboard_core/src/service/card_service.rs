//! Card lifecycle use-case service.
//!
//! # Responsibility
//! - Create, edit, move, cancel and delete cards under the lifecycle rules.
//! - Route block/unblock through the block ledger.
//!
//! # Invariants
//! - Cards are created in their board's `Initial` column.
//! - A blocked card cannot be edited, moved, cancelled or deleted.
//! - A finished card (in a `Final` or `Cancel` column) cannot be edited and
//!   can only be moved into a `Final` column.
//! - Finished state is derived from the live column on every check.

use crate::model::block::BlockRecord;
use crate::model::board::{BoardId, Column, ColumnId, ColumnKind};
use crate::model::card::{Card, CardId, CardState};
use crate::model::EntityKind;
use crate::repo::block_repo::BlockRepository;
use crate::repo::board_repo::BoardRepository;
use crate::repo::card_repo::CardRepository;
use crate::repo::RepoError;
use crate::service::block_ledger::{BlockLedger, BlockLedgerError};
use crate::service::ErrorCategory;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from card lifecycle operations.
#[derive(Debug)]
pub enum CardServiceError {
    /// Card title is blank after trim.
    EmptyTitle,
    /// Block/unblock reason is blank after trim.
    EmptyReason,
    /// Card has an active block.
    CardBlocked(CardId),
    /// Card sits in a `Final`/`Cancel` column.
    CardFinished(CardId),
    /// Card already has an active block.
    CardAlreadyBlocked(CardId),
    /// Card has no active block to resolve.
    CardNotBlocked(CardId),
    /// Target column does not exist.
    ColumnNotFound(ColumnId),
    /// Target column belongs to a different board than the card.
    ColumnNotOnBoard {
        column_id: ColumnId,
        board_id: BoardId,
    },
    /// Board has no `Initial` column.
    MissingInitialColumn(BoardId),
    /// Board has no `Cancel` column.
    MissingCancelColumn(BoardId),
    /// Addressed board/card/column does not exist.
    EntityNotFound { entity: EntityKind, id: Uuid },
    /// Repository-level failure.
    Repo(RepoError),
}

impl CardServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyTitle | Self::EmptyReason => ErrorCategory::Validation,
            Self::CardBlocked(_)
            | Self::CardFinished(_)
            | Self::CardAlreadyBlocked(_)
            | Self::CardNotBlocked(_)
            | Self::ColumnNotOnBoard { .. } => ErrorCategory::StateConflict,
            Self::ColumnNotFound(_) | Self::EntityNotFound { .. } => ErrorCategory::NotFound,
            Self::MissingInitialColumn(_) | Self::MissingCancelColumn(_) => {
                ErrorCategory::StructuralInvariant
            }
            Self::Repo(_) => ErrorCategory::Storage,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::EmptyReason => "empty_reason",
            Self::CardBlocked(_) => "card_blocked",
            Self::CardFinished(_) => "card_finished",
            Self::CardAlreadyBlocked(_) => "card_already_blocked",
            Self::CardNotBlocked(_) => "card_not_blocked",
            Self::ColumnNotFound(_) => "column_not_found",
            Self::ColumnNotOnBoard { .. } => "column_not_on_board",
            Self::MissingInitialColumn(_) => "missing_initial_column",
            Self::MissingCancelColumn(_) => "missing_cancel_column",
            Self::EntityNotFound { .. } => "entity_not_found",
            Self::Repo(_) => "repo_error",
        }
    }
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "card title must not be blank"),
            Self::EmptyReason => write!(f, "block reason must not be blank"),
            Self::CardBlocked(id) => write!(f, "card is blocked: {id}"),
            Self::CardFinished(id) => write!(f, "card is finished: {id}"),
            Self::CardAlreadyBlocked(id) => write!(f, "card is already blocked: {id}"),
            Self::CardNotBlocked(id) => write!(f, "card is not blocked: {id}"),
            Self::ColumnNotFound(id) => write!(f, "column not found: {id}"),
            Self::ColumnNotOnBoard {
                column_id,
                board_id,
            } => write!(f, "column {column_id} does not belong to board {board_id}"),
            Self::MissingInitialColumn(id) => write!(f, "board has no initial column: {id}"),
            Self::MissingCancelColumn(id) => write!(f, "board has no cancel column: {id}"),
            Self::EntityNotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::EntityNotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

impl From<BlockLedgerError> for CardServiceError {
    fn from(value: BlockLedgerError) -> Self {
        match value {
            BlockLedgerError::EmptyReason => Self::EmptyReason,
            BlockLedgerError::CardAlreadyBlocked(id) => Self::CardAlreadyBlocked(id),
            BlockLedgerError::CardNotBlocked(id) => Self::CardNotBlocked(id),
            BlockLedgerError::EntityNotFound { entity, id } => Self::EntityNotFound { entity, id },
            BlockLedgerError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Card with its live column and ledger status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub card: Card,
    pub column: Column,
    pub active_block: Option<BlockRecord>,
    /// Active and resolved block records.
    pub block_count: u32,
}

impl CardDetails {
    pub fn state(&self) -> CardState {
        self.column.kind.into()
    }

    pub fn is_blocked(&self) -> bool {
        self.active_block.is_some()
    }
}

/// Card lifecycle service facade.
pub struct CardService<C, K, B>
where
    C: CardRepository,
    K: BoardRepository,
    B: BlockRepository,
{
    cards: C,
    boards: K,
    ledger: BlockLedger<B>,
}

impl<C, K, B> CardService<C, K, B>
where
    C: CardRepository,
    K: BoardRepository,
    B: BlockRepository,
{
    /// Creates service from repository implementations.
    pub fn new(cards: C, boards: K, blocks: B) -> Self {
        Self {
            cards,
            boards,
            ledger: BlockLedger::new(blocks),
        }
    }

    /// Ledger used for block checks, exposed for history queries.
    pub fn ledger(&self) -> &BlockLedger<B> {
        &self.ledger
    }

    /// Creates a card in the board's `Initial` column.
    pub fn create_card(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        board_id: BoardId,
    ) -> Result<Card, CardServiceError> {
        let title = normalize_title(title.into())?;
        if self.boards.get_board(board_id)?.is_none() {
            return Err(CardServiceError::EntityNotFound {
                entity: EntityKind::Board,
                id: board_id,
            });
        }
        let initial = self
            .boards
            .find_column_by_board_and_kind(board_id, ColumnKind::Initial)?
            .ok_or(CardServiceError::MissingInitialColumn(board_id))?;

        let card = Card::new(initial.id, title, description);
        self.cards.insert_card(&card)?;
        info!(
            "event=card_create module=card status=ok card_id={} board_id={board_id}",
            card.id
        );
        Ok(card)
    }

    /// Replaces title and description of an open, unblocked card.
    pub fn edit_card(
        &self,
        card_id: CardId,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Card, CardServiceError> {
        let title = normalize_title(title.into())?;
        let mut card = self.load_card(card_id)?;
        self.ensure_not_blocked(&card)
            .map_err(|err| rejected("card_edit", card_id, err))?;
        if self.load_column(card.column_id)?.kind.is_finished() {
            return Err(rejected(
                "card_edit",
                card_id,
                CardServiceError::CardFinished(card_id),
            ));
        }

        card.title = title;
        card.description = description.into();
        self.cards.update_card(&card)?;
        info!("event=card_edit module=card status=ok card_id={card_id}");
        Ok(card)
    }

    /// Moves a card to another column of its board.
    ///
    /// # Contract
    /// - Blocked cards never move, whatever the target column.
    /// - Targets on another board fail with `ColumnNotOnBoard`.
    /// - Open cards move anywhere on their board.
    /// - Finished cards only move into a `Final` column; every other target,
    ///   including `Cancel` and `Pending`, fails with `CardFinished`.
    pub fn move_card(
        &self,
        card_id: CardId,
        target_column_id: ColumnId,
    ) -> Result<Card, CardServiceError> {
        let mut card = self.load_card(card_id)?;
        let target = self
            .boards
            .get_column(target_column_id)?
            .ok_or(CardServiceError::ColumnNotFound(target_column_id))?;
        let current = self.load_column(card.column_id)?;

        self.ensure_not_blocked(&card)
            .map_err(|err| rejected("card_move", card_id, err))?;
        if target.board_id != current.board_id {
            return Err(rejected(
                "card_move",
                card_id,
                CardServiceError::ColumnNotOnBoard {
                    column_id: target.id,
                    board_id: current.board_id,
                },
            ));
        }
        if current.kind.is_finished() && target.kind != ColumnKind::Final {
            return Err(rejected(
                "card_move",
                card_id,
                CardServiceError::CardFinished(card_id),
            ));
        }

        card.column_id = target.id;
        self.cards.update_card(&card)?;
        info!(
            "event=card_move module=card status=ok card_id={card_id} from_kind={} to_kind={}",
            current.kind, target.kind
        );
        Ok(card)
    }

    /// Moves an unblocked card to its board's `Cancel` column.
    pub fn cancel_card(&self, card_id: CardId) -> Result<Card, CardServiceError> {
        let mut card = self.load_card(card_id)?;
        self.ensure_not_blocked(&card)
            .map_err(|err| rejected("card_cancel", card_id, err))?;

        let board_id = self.load_column(card.column_id)?.board_id;
        let cancel = self
            .boards
            .find_column_by_board_and_kind(board_id, ColumnKind::Cancel)?
            .ok_or(CardServiceError::MissingCancelColumn(board_id))?;

        card.column_id = cancel.id;
        self.cards.update_card(&card)?;
        info!("event=card_cancel module=card status=ok card_id={card_id}");
        Ok(card)
    }

    /// Deletes an unblocked card. Its resolved block records are kept.
    pub fn delete_card(&self, card_id: CardId) -> Result<(), CardServiceError> {
        let card = self.load_card(card_id)?;
        self.ensure_not_blocked(&card)
            .map_err(|err| rejected("card_delete", card_id, err))?;

        self.cards.delete_card(card_id)?;
        info!("event=card_delete module=card status=ok card_id={card_id}");
        Ok(())
    }

    /// Opens a block on a card.
    pub fn block_card(
        &self,
        card_id: CardId,
        reason: impl Into<String>,
    ) -> Result<BlockRecord, CardServiceError> {
        self.ledger
            .block(card_id, reason)
            .map_err(|err| rejected("card_block", card_id, err.into()))
    }

    /// Resolves the active block of a card.
    pub fn unblock_card(
        &self,
        card_id: CardId,
        reason: impl Into<String>,
    ) -> Result<BlockRecord, CardServiceError> {
        self.ledger
            .unblock(card_id, reason)
            .map_err(|err| rejected("card_unblock", card_id, err.into()))
    }

    /// Whether the card has an active block.
    pub fn is_blocked(&self, card_id: CardId) -> Result<bool, CardServiceError> {
        self.ledger.is_blocked(card_id).map_err(Into::into)
    }

    /// Whether the card currently sits in a `Final` or `Cancel` column.
    ///
    /// Reloads the card and its column on every call.
    pub fn is_finished(&self, card_id: CardId) -> Result<bool, CardServiceError> {
        let card = self.load_card(card_id)?;
        Ok(self.load_column(card.column_id)?.kind.is_finished())
    }

    /// Loads one card.
    pub fn get_card(&self, card_id: CardId) -> Result<Card, CardServiceError> {
        self.load_card(card_id)
    }

    /// Loads a card with its column, active block and block count.
    pub fn card_details(&self, card_id: CardId) -> Result<CardDetails, CardServiceError> {
        let card = self.load_card(card_id)?;
        let column = self.load_column(card.column_id)?;
        let active_block = self.ledger.active_block(card_id)?;
        let block_count = self.ledger.count_blocks(card_id)?;
        Ok(CardDetails {
            card,
            column,
            active_block,
            block_count,
        })
    }

    /// Lists a board's cards by column order, then title.
    pub fn list_cards_by_board(&self, board_id: BoardId) -> Result<Vec<Card>, CardServiceError> {
        self.ensure_board_exists(board_id)?;
        self.cards.list_cards_by_board(board_id).map_err(Into::into)
    }

    /// Lists a column's cards by title.
    pub fn list_cards_by_column(
        &self,
        column_id: ColumnId,
    ) -> Result<Vec<Card>, CardServiceError> {
        if self.boards.get_column(column_id)?.is_none() {
            return Err(CardServiceError::ColumnNotFound(column_id));
        }
        self.cards.list_cards_by_column(column_id).map_err(Into::into)
    }

    /// Lists a board's cards that currently have an active block.
    pub fn list_blocked_cards(&self, board_id: BoardId) -> Result<Vec<Card>, CardServiceError> {
        self.ensure_board_exists(board_id)?;
        self.cards
            .list_blocked_cards_by_board(board_id)
            .map_err(Into::into)
    }

    fn load_card(&self, card_id: CardId) -> Result<Card, CardServiceError> {
        self.cards
            .get_card(card_id)?
            .ok_or(CardServiceError::EntityNotFound {
                entity: EntityKind::Card,
                id: card_id,
            })
    }

    fn load_column(&self, column_id: ColumnId) -> Result<Column, CardServiceError> {
        self.boards
            .get_column(column_id)?
            .ok_or(CardServiceError::EntityNotFound {
                entity: EntityKind::Column,
                id: column_id,
            })
    }

    fn ensure_board_exists(&self, board_id: BoardId) -> Result<(), CardServiceError> {
        if self.boards.get_board(board_id)?.is_some() {
            return Ok(());
        }
        Err(CardServiceError::EntityNotFound {
            entity: EntityKind::Board,
            id: board_id,
        })
    }

    fn ensure_not_blocked(&self, card: &Card) -> Result<(), CardServiceError> {
        if self.ledger.is_blocked(card.id)? {
            return Err(CardServiceError::CardBlocked(card.id));
        }
        Ok(())
    }
}

fn rejected(event: &'static str, card_id: CardId, err: CardServiceError) -> CardServiceError {
    if matches!(
        err.category(),
        ErrorCategory::StateConflict | ErrorCategory::Validation
    ) {
        warn!(
            "event={event} module=card status=rejected card_id={card_id} error_code={}",
            err.code()
        );
    }
    err
}

fn normalize_title(value: String) -> Result<String, CardServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CardServiceError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}
