//! Card model.
//!
//! # Invariants
//! - `title` is non-blank; services trim it before persistence.
//! - `column_id` is the single location of the card. Moving reassigns it.

use super::board::{ColumnId, ColumnKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CardId = Uuid;

/// Lifecycle class derived from the kind of the column a card sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    /// In an `Initial` or `Pending` column.
    Open,
    /// In a `Final` or `Cancel` column.
    Finished,
}

impl From<ColumnKind> for CardState {
    fn from(kind: ColumnKind) -> Self {
        if kind.is_finished() {
            Self::Finished
        } else {
            Self::Open
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    /// Free text, may be empty.
    pub description: String,
    pub column_id: ColumnId,
}

impl Card {
    /// Creates a card with a freshly generated id in the given column.
    pub fn new(column_id: ColumnId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            column_id,
        }
    }
}
