//! Board and column repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist board headers and their composed column sets.
//! - Answer column lookups by board and kind without graph traversal.
//!
//! # Invariants
//! - Column listing is deterministic: `column_order ASC`.
//! - Board listing is deterministic: `name ASC, board_uuid ASC`.
//! - Deleting a board cascades to columns, cards and card/block links.

use super::sqlite_support::{ensure_connection_ready, parse_kind, parse_uuid};
use super::{RepoError, RepoResult};
use crate::model::board::{Board, BoardId, Column, ColumnId, ColumnKind};
use crate::model::EntityKind;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMN_SELECT_SQL: &str = "SELECT
    column_uuid,
    board_uuid,
    name,
    column_order,
    kind
FROM board_columns";

/// Column read model with the number of cards currently in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub column: Column,
    pub card_count: u32,
}

/// Repository interface for boards and their columns.
pub trait BoardRepository {
    /// Inserts a new board header.
    fn insert_board(&self, board: &Board) -> RepoResult<()>;
    /// Updates board header fields.
    fn update_board(&self, board: &Board) -> RepoResult<()>;
    /// Loads one board by id.
    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>>;
    /// Lists all boards.
    fn list_boards(&self) -> RepoResult<Vec<Board>>;
    /// Deletes one board and everything it owns.
    fn delete_board(&self, board_id: BoardId) -> RepoResult<()>;
    /// Inserts one column into an existing board.
    fn insert_column(&self, column: &Column) -> RepoResult<()>;
    /// Loads one column by id.
    fn get_column(&self, column_id: ColumnId) -> RepoResult<Option<Column>>;
    /// Lists a board's columns left to right.
    fn list_columns_by_board(&self, board_id: BoardId) -> RepoResult<Vec<Column>>;
    /// Finds the left-most column of the given kind on a board.
    fn find_column_by_board_and_kind(
        &self,
        board_id: BoardId,
        kind: ColumnKind,
    ) -> RepoResult<Option<Column>>;
    /// Lists a board's columns with per-column card counts.
    fn column_summaries(&self, board_id: BoardId) -> RepoResult<Vec<ColumnSummary>>;
}

/// SQLite-backed board/column repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Creates repository from a migrated connection (or open transaction).
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["boards", "board_columns", "cards"])?;
        Ok(Self { conn })
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn insert_board(&self, board: &Board) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO boards (board_uuid, name) VALUES (?1, ?2);",
            params![board.id.to_string(), board.name.as_str()],
        )?;
        Ok(())
    }

    fn update_board(&self, board: &Board) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE boards
             SET
                name = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE board_uuid = ?1;",
            params![board.id.to_string(), board.name.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Board,
                id: board.id,
            });
        }
        Ok(())
    }

    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>> {
        let row = self
            .conn
            .query_row(
                "SELECT board_uuid, name FROM boards WHERE board_uuid = ?1;",
                [board_id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(id, name)| {
            Ok(Board {
                id: parse_uuid(&id, "boards.board_uuid")?,
                name,
            })
        })
        .transpose()
    }

    fn list_boards(&self) -> RepoResult<Vec<Board>> {
        let mut stmt = self
            .conn
            .prepare("SELECT board_uuid, name FROM boards ORDER BY name ASC, board_uuid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("board_uuid")?;
            boards.push(Board {
                id: parse_uuid(&id, "boards.board_uuid")?,
                name: row.get("name")?,
            });
        }
        Ok(boards)
    }

    fn delete_board(&self, board_id: BoardId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM boards WHERE board_uuid = ?1;",
            [board_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Board,
                id: board_id,
            });
        }
        Ok(())
    }

    fn insert_column(&self, column: &Column) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO board_columns (
                column_uuid,
                board_uuid,
                name,
                column_order,
                kind
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                column.id.to_string(),
                column.board_id.to_string(),
                column.name.as_str(),
                column.order,
                column.kind.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_column(&self, column_id: ColumnId) -> RepoResult<Option<Column>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COLUMN_SELECT_SQL} WHERE column_uuid = ?1;"))?;
        let mut rows = stmt.query([column_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_column_row(row)?));
        }
        Ok(None)
    }

    fn list_columns_by_board(&self, board_id: BoardId) -> RepoResult<Vec<Column>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COLUMN_SELECT_SQL} WHERE board_uuid = ?1 ORDER BY column_order ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(parse_column_row(row)?);
        }
        Ok(columns)
    }

    fn find_column_by_board_and_kind(
        &self,
        board_id: BoardId,
        kind: ColumnKind,
    ) -> RepoResult<Option<Column>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COLUMN_SELECT_SQL}
             WHERE board_uuid = ?1
               AND kind = ?2
             ORDER BY column_order ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![board_id.to_string(), kind.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_column_row(row)?));
        }
        Ok(None)
    }

    fn column_summaries(&self, board_id: BoardId) -> RepoResult<Vec<ColumnSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                bc.column_uuid AS column_uuid,
                bc.board_uuid AS board_uuid,
                bc.name AS name,
                bc.column_order AS column_order,
                bc.kind AS kind,
                COUNT(c.card_uuid) AS card_count
             FROM board_columns bc
             LEFT JOIN cards c ON c.column_uuid = bc.column_uuid
             WHERE bc.board_uuid = ?1
             GROUP BY bc.column_uuid
             ORDER BY bc.column_order ASC;",
        )?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(ColumnSummary {
                column: parse_column_row(row)?,
                card_count: row.get("card_count")?,
            });
        }
        Ok(summaries)
    }
}

fn parse_column_row(row: &Row<'_>) -> RepoResult<Column> {
    let id_text: String = row.get("column_uuid")?;
    let board_text: String = row.get("board_uuid")?;
    let kind_text: String = row.get("kind")?;

    Ok(Column {
        id: parse_uuid(&id_text, "board_columns.column_uuid")?,
        board_id: parse_uuid(&board_text, "board_columns.board_uuid")?,
        name: row.get("name")?,
        order: row.get("column_order")?,
        kind: parse_kind(&kind_text, "board_columns.kind")?,
    })
}
