//! Domain model for boards, columns, cards and block records.
//!
//! # Responsibility
//! - Define the canonical data structures used by composition and lifecycle logic.
//! - Own the column-kind classification every transition rule is expressed in.
//!
//! # Invariants
//! - Every entity is identified by a stable UUIDv4 generated by core.
//! - Relations are id references (column -> board, card -> column), never pointers.

pub mod block;
pub mod board;
pub mod card;

use std::fmt::{Display, Formatter};

/// Entity family used in not-found reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Board,
    Column,
    Card,
    Block,
}

impl EntityKind {
    /// Stable lowercase name used in messages and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Column => "column",
            Self::Card => "card",
            Self::Block => "block",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}
