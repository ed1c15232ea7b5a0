//! Card repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist cards and their single column reference.
//! - Provide board/column scoped card listings.
//!
//! # Invariants
//! - Column listing order: `title ASC, card_uuid ASC`.
//! - Board listing order: `column_order ASC, title ASC, card_uuid ASC`.
//! - Deleting a card removes its block links but keeps block rows.

use super::sqlite_support::{ensure_connection_ready, parse_uuid};
use super::{RepoError, RepoResult};
use crate::model::board::{BoardId, ColumnId};
use crate::model::card::{Card, CardId};
use crate::model::EntityKind;
use rusqlite::{params, Connection, Row};

const CARD_SELECT_SQL: &str = "SELECT
    c.card_uuid AS card_uuid,
    c.title AS title,
    c.description AS description,
    c.column_uuid AS column_uuid
FROM cards c
INNER JOIN board_columns bc ON bc.column_uuid = c.column_uuid";

/// Repository interface for card persistence.
pub trait CardRepository {
    /// Inserts a new card.
    fn insert_card(&self, card: &Card) -> RepoResult<()>;
    /// Rewrites title, description and column reference of an existing card.
    fn update_card(&self, card: &Card) -> RepoResult<()>;
    /// Loads one card by id.
    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>>;
    /// Lists cards located in one column.
    fn list_cards_by_column(&self, column_id: ColumnId) -> RepoResult<Vec<Card>>;
    /// Lists all cards on one board.
    fn list_cards_by_board(&self, board_id: BoardId) -> RepoResult<Vec<Card>>;
    /// Lists cards on one board that currently have an active block.
    fn list_blocked_cards_by_board(&self, board_id: BoardId) -> RepoResult<Vec<Card>>;
    /// Deletes one card.
    fn delete_card(&self, card_id: CardId) -> RepoResult<()>;
}

/// SQLite-backed card repository.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Creates repository from a migrated connection (or open transaction).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["board_columns", "cards", "card_blocks", "blocks"])?;
        Ok(Self { conn })
    }

    fn query_cards(&self, sql: &str, key: String) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn insert_card(&self, card: &Card) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO cards (card_uuid, title, description, column_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                card.id.to_string(),
                card.title.as_str(),
                card.description.as_str(),
                card.column_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn update_card(&self, card: &Card) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cards
             SET
                title = ?2,
                description = ?3,
                column_uuid = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE card_uuid = ?1;",
            params![
                card.id.to_string(),
                card.title.as_str(),
                card.description.as_str(),
                card.column_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Card,
                id: card.id,
            });
        }
        Ok(())
    }

    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>> {
        let mut cards = self.query_cards(
            &format!("{CARD_SELECT_SQL} WHERE c.card_uuid = ?1;"),
            card_id.to_string(),
        )?;
        Ok(cards.pop())
    }

    fn list_cards_by_column(&self, column_id: ColumnId) -> RepoResult<Vec<Card>> {
        self.query_cards(
            &format!(
                "{CARD_SELECT_SQL}
                 WHERE c.column_uuid = ?1
                 ORDER BY c.title ASC, c.card_uuid ASC;"
            ),
            column_id.to_string(),
        )
    }

    fn list_cards_by_board(&self, board_id: BoardId) -> RepoResult<Vec<Card>> {
        self.query_cards(
            &format!(
                "{CARD_SELECT_SQL}
                 WHERE bc.board_uuid = ?1
                 ORDER BY bc.column_order ASC, c.title ASC, c.card_uuid ASC;"
            ),
            board_id.to_string(),
        )
    }

    fn list_blocked_cards_by_board(&self, board_id: BoardId) -> RepoResult<Vec<Card>> {
        self.query_cards(
            &format!(
                "{CARD_SELECT_SQL}
                 WHERE bc.board_uuid = ?1
                   AND EXISTS (
                     SELECT 1
                     FROM card_blocks cb
                     INNER JOIN blocks b ON b.block_uuid = cb.block_uuid
                     WHERE cb.card_uuid = c.card_uuid
                       AND b.unblocked_at IS NULL
                   )
                 ORDER BY bc.column_order ASC, c.title ASC, c.card_uuid ASC;"
            ),
            board_id.to_string(),
        )
    }

    fn delete_card(&self, card_id: CardId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM cards WHERE card_uuid = ?1;", [card_id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Card,
                id: card_id,
            });
        }
        Ok(())
    }
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let id_text: String = row.get("card_uuid")?;
    let column_text: String = row.get("column_uuid")?;

    Ok(Card {
        id: parse_uuid(&id_text, "cards.card_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        column_id: parse_uuid(&column_text, "cards.column_uuid")?,
    })
}
