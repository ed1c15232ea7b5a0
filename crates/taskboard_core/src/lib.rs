//! Core domain logic for task boards.
//! This crate is the single source of truth for column-kind, card lifecycle
//! and block ledger invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::block::{BlockId, BlockRecord};
pub use model::board::{
    validate_column_set, Board, BoardId, Column, ColumnId, ColumnKind, ColumnSetError,
    InvalidKind,
};
pub use model::card::{Card, CardId, CardState};
pub use model::EntityKind;
pub use repo::block_repo::{BlockRepository, SqliteBlockRepository};
pub use repo::board_repo::{BoardRepository, ColumnSummary, SqliteBoardRepository};
pub use repo::card_repo::{CardRepository, SqliteCardRepository};
pub use repo::{RepoError, RepoResult};
pub use service::block_ledger::{BlockLedger, BlockLedgerError};
pub use service::board_service::{
    BoardDetails, BoardLayout, BoardService, BoardServiceError, CANCEL_COLUMN_NAME,
    DEFAULT_COLUMNS, MIN_CUSTOM_COLUMNS,
};
pub use service::card_service::{CardDetails, CardService, CardServiceError};
pub use service::ErrorCategory;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
