//! Block ledger repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist block records and their card links.
//! - Answer "active block" and history queries per card.
//!
//! # Invariants
//! - History order: `blocked_at DESC`, ties broken newest insert first.
//! - Block rows are never deleted here.

use super::sqlite_support::{ensure_connection_ready, parse_uuid};
use super::{RepoError, RepoResult};
use crate::model::block::{BlockId, BlockRecord};
use crate::model::card::CardId;
use crate::model::EntityKind;
use rusqlite::{params, Connection, Row};

const BLOCK_SELECT_SQL: &str = "SELECT
    b.block_uuid AS block_uuid,
    b.blocked_at AS blocked_at,
    b.block_reason AS block_reason,
    b.unblocked_at AS unblocked_at,
    b.unblock_reason AS unblock_reason
FROM blocks b
INNER JOIN card_blocks cb ON cb.block_uuid = b.block_uuid";

/// Repository interface for block records.
pub trait BlockRepository {
    /// Inserts a new block record (not yet linked to a card).
    fn insert_block(&self, block: &BlockRecord) -> RepoResult<()>;
    /// Rewrites an existing block record.
    fn update_block(&self, block: &BlockRecord) -> RepoResult<()>;
    /// Links a block record to the card it was raised against.
    fn link_card_block(&self, card_id: CardId, block_id: BlockId) -> RepoResult<()>;
    /// Loads the unresolved block of a card, if any.
    fn find_active_by_card(&self, card_id: CardId) -> RepoResult<Option<BlockRecord>>;
    /// Lists every block record of a card, most recent first.
    fn list_by_card(&self, card_id: CardId) -> RepoResult<Vec<BlockRecord>>;
    /// Counts block records of a card, active and resolved.
    fn count_by_card(&self, card_id: CardId) -> RepoResult<u32>;
    /// Returns whether the card row exists.
    fn card_exists(&self, card_id: CardId) -> RepoResult<bool>;
}

/// SQLite-backed block repository.
pub struct SqliteBlockRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlockRepository<'conn> {
    /// Creates repository from a migrated connection (or open transaction).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["cards", "blocks", "card_blocks"])?;
        Ok(Self { conn })
    }
}

impl BlockRepository for SqliteBlockRepository<'_> {
    fn insert_block(&self, block: &BlockRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO blocks (
                block_uuid,
                blocked_at,
                block_reason,
                unblocked_at,
                unblock_reason
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                block.id.to_string(),
                block.blocked_at,
                block.block_reason.as_str(),
                block.unblocked_at,
                block.unblock_reason.as_deref(),
            ],
        )?;
        Ok(())
    }

    fn update_block(&self, block: &BlockRecord) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE blocks
             SET
                blocked_at = ?2,
                block_reason = ?3,
                unblocked_at = ?4,
                unblock_reason = ?5
             WHERE block_uuid = ?1;",
            params![
                block.id.to_string(),
                block.blocked_at,
                block.block_reason.as_str(),
                block.unblocked_at,
                block.unblock_reason.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Block,
                id: block.id,
            });
        }
        Ok(())
    }

    fn link_card_block(&self, card_id: CardId, block_id: BlockId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO card_blocks (card_uuid, block_uuid) VALUES (?1, ?2);",
            params![card_id.to_string(), block_id.to_string()],
        )?;
        Ok(())
    }

    fn find_active_by_card(&self, card_id: CardId) -> RepoResult<Option<BlockRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BLOCK_SELECT_SQL}
             WHERE cb.card_uuid = ?1
               AND b.unblocked_at IS NULL
             ORDER BY b.blocked_at DESC, b.rowid DESC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([card_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_block_row(row)?));
        }
        Ok(None)
    }

    fn list_by_card(&self, card_id: CardId) -> RepoResult<Vec<BlockRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BLOCK_SELECT_SQL}
             WHERE cb.card_uuid = ?1
             ORDER BY b.blocked_at DESC, b.rowid DESC;"
        ))?;
        let mut rows = stmt.query([card_id.to_string()])?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_block_row(row)?);
        }
        Ok(blocks)
    }

    fn count_by_card(&self, card_id: CardId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM card_blocks WHERE card_uuid = ?1;",
            [card_id.to_string()],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn card_exists(&self, card_id: CardId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cards WHERE card_uuid = ?1);",
            [card_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_block_row(row: &Row<'_>) -> RepoResult<BlockRecord> {
    let id_text: String = row.get("block_uuid")?;
    let unblocked_at: Option<i64> = row.get("unblocked_at")?;
    let unblock_reason: Option<String> = row.get("unblock_reason")?;
    if unblocked_at.is_some() != unblock_reason.is_some() {
        return Err(RepoError::InvalidData(format!(
            "block `{id_text}` has mismatched unblocked_at/unblock_reason"
        )));
    }

    Ok(BlockRecord {
        id: parse_uuid(&id_text, "blocks.block_uuid")?,
        blocked_at: row.get("blocked_at")?,
        block_reason: row.get("block_reason")?,
        unblocked_at,
        unblock_reason,
    })
}
