//! Board and column model, including the column-kind invariant.
//!
//! # Responsibility
//! - Classify columns by workflow role (`ColumnKind`).
//! - Check that a board's column set is structurally valid.
//!
//! # Invariants
//! - A valid column set has exactly one `Initial`, one `Final` and one
//!   `Cancel` column, plus any number of `Pending` columns.
//! - Column `order` is 1-based and unique within its board.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type BoardId = Uuid;
pub type ColumnId = Uuid;

/// Workflow role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Entry column; new cards always land here.
    Initial,
    /// Work-in-progress column.
    Pending,
    /// Completed work.
    Final,
    /// Abandoned work.
    Cancel,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 4] = [Self::Initial, Self::Pending, Self::Final, Self::Cancel];

    /// Storage/wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Pending => "pending",
            Self::Final => "final",
            Self::Cancel => "cancel",
        }
    }

    /// Whether a card sitting in a column of this kind counts as finished.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Final | Self::Cancel)
    }

    /// Whether a board must contain exactly one column of this kind.
    pub fn is_singleton(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for ColumnKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized column kind name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKind(pub String);

impl Display for InvalidKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid column kind `{}`; expected initial|pending|final|cancel",
            self.0
        )
    }
}

impl Error for InvalidKind {}

impl FromStr for ColumnKind {
    type Err = InvalidKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| InvalidKind(value.to_string()))
    }
}

/// Board header. Columns are stored separately and reference the board id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
}

impl Board {
    /// Creates a board with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// One column of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    /// Owning board (back-reference only).
    pub board_id: BoardId,
    pub name: String,
    /// 1-based left-to-right position.
    pub order: u32,
    pub kind: ColumnKind,
}

impl Column {
    /// Creates a column with a freshly generated id.
    pub fn new(board_id: BoardId, name: impl Into<String>, order: u32, kind: ColumnKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id,
            name: name.into(),
            order,
            kind,
        }
    }
}

/// Structural defect in a board's column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSetError {
    /// A singleton kind has no column.
    MissingKind(ColumnKind),
    /// A singleton kind appears more than once.
    DuplicateKind { kind: ColumnKind, count: usize },
    /// Two columns share the same order value.
    DuplicateOrder(u32),
}

impl Display for ColumnSetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingKind(kind) => write!(f, "column set has no `{kind}` column"),
            Self::DuplicateKind { kind, count } => {
                write!(f, "column set has {count} `{kind}` columns, expected 1")
            }
            Self::DuplicateOrder(order) => write!(f, "column order {order} is used twice"),
        }
    }
}

impl Error for ColumnSetError {}

/// Checks the column-kind invariant over one board's columns.
///
/// Singleton kinds are checked in `ColumnKind::ALL` order, so the first
/// reported defect is deterministic.
pub fn validate_column_set(columns: &[Column]) -> Result<(), ColumnSetError> {
    for kind in ColumnKind::ALL.into_iter().filter(|kind| kind.is_singleton()) {
        let count = columns.iter().filter(|column| column.kind == kind).count();
        match count {
            0 => return Err(ColumnSetError::MissingKind(kind)),
            1 => {}
            count => return Err(ColumnSetError::DuplicateKind { kind, count }),
        }
    }

    let mut orders: Vec<u32> = columns.iter().map(|column| column.order).collect();
    orders.sort_unstable();
    if let Some(pair) = orders.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ColumnSetError::DuplicateOrder(pair[0]));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_column_set, Column, ColumnKind, ColumnSetError, InvalidKind};
    use uuid::Uuid;

    fn column(order: u32, kind: ColumnKind) -> Column {
        Column::new(Uuid::nil(), format!("c{order}"), order, kind)
    }

    #[test]
    fn kind_lookup_is_case_insensitive_and_trimmed() {
        assert_eq!(" FINAL ".parse::<ColumnKind>(), Ok(ColumnKind::Final));
        assert_eq!("pending".parse::<ColumnKind>(), Ok(ColumnKind::Pending));
    }

    #[test]
    fn kind_lookup_rejects_unknown_names() {
        let err = "blocked".parse::<ColumnKind>().unwrap_err();
        assert_eq!(err, InvalidKind("blocked".to_string()));
    }

    #[test]
    fn only_final_and_cancel_are_finished() {
        assert!(!ColumnKind::Initial.is_finished());
        assert!(!ColumnKind::Pending.is_finished());
        assert!(ColumnKind::Final.is_finished());
        assert!(ColumnKind::Cancel.is_finished());
    }

    #[test]
    fn column_set_without_pending_is_valid() {
        let columns = vec![
            column(1, ColumnKind::Initial),
            column(2, ColumnKind::Final),
            column(3, ColumnKind::Cancel),
        ];
        assert_eq!(validate_column_set(&columns), Ok(()));
    }

    #[test]
    fn column_set_reports_missing_and_duplicate_kinds() {
        let missing_cancel = vec![column(1, ColumnKind::Initial), column(2, ColumnKind::Final)];
        assert_eq!(
            validate_column_set(&missing_cancel),
            Err(ColumnSetError::MissingKind(ColumnKind::Cancel))
        );

        let two_initial = vec![
            column(1, ColumnKind::Initial),
            column(2, ColumnKind::Initial),
            column(3, ColumnKind::Final),
            column(4, ColumnKind::Cancel),
        ];
        assert_eq!(
            validate_column_set(&two_initial),
            Err(ColumnSetError::DuplicateKind {
                kind: ColumnKind::Initial,
                count: 2
            })
        );
    }

    #[test]
    fn column_set_rejects_repeated_order() {
        let columns = vec![
            column(1, ColumnKind::Initial),
            column(2, ColumnKind::Pending),
            column(2, ColumnKind::Final),
            column(3, ColumnKind::Cancel),
        ];
        assert_eq!(
            validate_column_set(&columns),
            Err(ColumnSetError::DuplicateOrder(2))
        );
    }
}
