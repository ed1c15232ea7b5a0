//! Board composition use-case service.
//!
//! # Responsibility
//! - Build default and custom column layouts for new boards.
//! - Expose board read/rename/delete entry points.
//!
//! # Invariants
//! - Every composed board satisfies `validate_column_set`.
//! - Input validation completes before the board row is inserted.

use crate::model::board::{
    validate_column_set, Board, BoardId, Column, ColumnKind, ColumnSetError,
};
use crate::model::EntityKind;
use crate::repo::board_repo::{BoardRepository, ColumnSummary};
use crate::repo::RepoError;
use crate::service::ErrorCategory;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Default layout: name and kind, in left-to-right order.
pub const DEFAULT_COLUMNS: [(&str, ColumnKind); 4] = [
    ("To Do", ColumnKind::Initial),
    ("In Progress", ColumnKind::Pending),
    ("Done", ColumnKind::Final),
    ("Cancelled", ColumnKind::Cancel),
];

/// Name of the cancel column appended to every custom layout.
pub const CANCEL_COLUMN_NAME: &str = "Cancelled";

/// Smallest accepted custom layout (one initial and one final column).
pub const MIN_CUSTOM_COLUMNS: usize = 2;

/// Errors from board composition and board management.
#[derive(Debug)]
pub enum BoardServiceError {
    /// Board name is blank after trim.
    InvalidBoardName,
    /// Custom layout has fewer than `MIN_CUSTOM_COLUMNS` names.
    InvalidColumnCount(usize),
    /// Column name at the 1-based `position` is blank after trim.
    InvalidColumnName { position: usize },
    /// Planned layout breaks the column-kind invariant.
    InvalidLayout(ColumnSetError),
    /// Addressed board does not exist.
    EntityNotFound { entity: EntityKind, id: Uuid },
    /// Repository-level failure.
    Repo(RepoError),
}

impl BoardServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidBoardName
            | Self::InvalidColumnCount(_)
            | Self::InvalidColumnName { .. } => ErrorCategory::Validation,
            Self::InvalidLayout(_) => ErrorCategory::StructuralInvariant,
            Self::EntityNotFound { .. } => ErrorCategory::NotFound,
            Self::Repo(_) => ErrorCategory::Storage,
        }
    }
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBoardName => write!(f, "board name must not be blank"),
            Self::InvalidColumnCount(count) => write!(
                f,
                "custom layout needs at least {MIN_CUSTOM_COLUMNS} columns, got {count}"
            ),
            Self::InvalidColumnName { position } => {
                write!(f, "column name at position {position} must not be blank")
            }
            Self::InvalidLayout(err) => write!(f, "invalid column layout: {err}"),
            Self::EntityNotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLayout(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::EntityNotFound { entity, id },
            other => Self::Repo(other),
        }
    }
}

/// A board together with its composed columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    pub board: Board,
    /// Ordered by `order`.
    pub columns: Vec<Column>,
}

impl BoardLayout {
    /// Finds the left-most column of a kind.
    pub fn column_of_kind(&self, kind: ColumnKind) -> Option<&Column> {
        self.columns.iter().find(|column| column.kind == kind)
    }
}

/// Board header with per-column card counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardDetails {
    pub board: Board,
    pub columns: Vec<ColumnSummary>,
}

/// Board composition service facade.
pub struct BoardService<R: BoardRepository> {
    repo: R,
}

impl<R: BoardRepository> BoardService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a board with the four default columns.
    pub fn create_board_with_default_columns(
        &self,
        name: impl Into<String>,
    ) -> Result<BoardLayout, BoardServiceError> {
        let board = Board::new(normalize_board_name(name.into())?);
        let columns = DEFAULT_COLUMNS
            .iter()
            .zip(1..)
            .map(|((column_name, kind), order)| Column::new(board.id, *column_name, order, *kind))
            .collect();
        self.persist_layout(board, columns)
    }

    /// Creates a board from caller-supplied column names.
    ///
    /// # Contract
    /// - First name becomes `Initial`, last becomes `Final`, the rest `Pending`.
    /// - A `Cancel` column is always appended at `names.len() + 1`.
    /// - Blank names or fewer than two names persist nothing.
    pub fn create_board_with_custom_columns<S: AsRef<str>>(
        &self,
        name: impl Into<String>,
        column_names: &[S],
    ) -> Result<BoardLayout, BoardServiceError> {
        let board = Board::new(normalize_board_name(name.into())?);
        let columns = plan_custom_columns(board.id, column_names)?;
        self.persist_layout(board, columns)
    }

    /// Loads one board.
    pub fn get_board(&self, board_id: BoardId) -> Result<Board, BoardServiceError> {
        self.repo
            .get_board(board_id)?
            .ok_or(BoardServiceError::EntityNotFound {
                entity: EntityKind::Board,
                id: board_id,
            })
    }

    /// Lists boards by name.
    pub fn list_boards(&self) -> Result<Vec<Board>, BoardServiceError> {
        self.repo.list_boards().map_err(Into::into)
    }

    /// Lists a board's columns left to right.
    pub fn list_columns(&self, board_id: BoardId) -> Result<Vec<Column>, BoardServiceError> {
        self.get_board(board_id)?;
        self.repo.list_columns_by_board(board_id).map_err(Into::into)
    }

    /// Loads a board with per-column card counts.
    pub fn board_details(&self, board_id: BoardId) -> Result<BoardDetails, BoardServiceError> {
        let board = self.get_board(board_id)?;
        let columns = self.repo.column_summaries(board_id)?;
        Ok(BoardDetails { board, columns })
    }

    /// Renames a board. Columns are untouched.
    pub fn rename_board(
        &self,
        board_id: BoardId,
        name: impl Into<String>,
    ) -> Result<Board, BoardServiceError> {
        let name = normalize_board_name(name.into())?;
        let mut board = self.get_board(board_id)?;
        board.name = name;
        self.repo.update_board(&board)?;
        Ok(board)
    }

    /// Deletes a board with its columns, cards and card/block links.
    pub fn delete_board(&self, board_id: BoardId) -> Result<(), BoardServiceError> {
        self.repo.delete_board(board_id)?;
        info!("event=board_delete module=board status=ok board_id={board_id}");
        Ok(())
    }

    fn persist_layout(
        &self,
        board: Board,
        columns: Vec<Column>,
    ) -> Result<BoardLayout, BoardServiceError> {
        validate_column_set(&columns).map_err(BoardServiceError::InvalidLayout)?;

        let started_at = Instant::now();
        self.repo.insert_board(&board)?;
        for column in &columns {
            self.repo.insert_column(column)?;
        }
        info!(
            "event=board_create module=board status=ok board_id={} column_count={} duration_ms={}",
            board.id,
            columns.len(),
            started_at.elapsed().as_millis()
        );

        Ok(BoardLayout { board, columns })
    }
}

/// Plans the columns of a custom layout without touching storage.
pub fn plan_custom_columns<S: AsRef<str>>(
    board_id: BoardId,
    column_names: &[S],
) -> Result<Vec<Column>, BoardServiceError> {
    if column_names.len() < MIN_CUSTOM_COLUMNS {
        return Err(BoardServiceError::InvalidColumnCount(column_names.len()));
    }

    let last_index = column_names.len() - 1;
    let mut columns = Vec::with_capacity(column_names.len() + 1);
    for (index, raw_name) in column_names.iter().enumerate() {
        let name = raw_name.as_ref().trim();
        if name.is_empty() {
            return Err(BoardServiceError::InvalidColumnName {
                position: index + 1,
            });
        }
        let kind = match index {
            0 => ColumnKind::Initial,
            i if i == last_index => ColumnKind::Final,
            _ => ColumnKind::Pending,
        };
        columns.push(Column::new(board_id, name, position_to_order(index + 1)?, kind));
    }

    columns.push(Column::new(
        board_id,
        CANCEL_COLUMN_NAME,
        position_to_order(column_names.len() + 1)?,
        ColumnKind::Cancel,
    ));
    Ok(columns)
}

fn position_to_order(position: usize) -> Result<u32, BoardServiceError> {
    u32::try_from(position).map_err(|_| BoardServiceError::InvalidColumnCount(position))
}

fn normalize_board_name(value: String) -> Result<String, BoardServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardServiceError::InvalidBoardName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{plan_custom_columns, BoardServiceError, CANCEL_COLUMN_NAME};
    use crate::model::board::ColumnKind;
    use crate::service::ErrorCategory;
    use uuid::Uuid;

    #[test]
    fn plan_assigns_kinds_by_position_and_appends_cancel() {
        let columns =
            plan_custom_columns(Uuid::nil(), &["Backlog", " Doing ", "Review", "Shipped"]).unwrap();

        let kinds: Vec<ColumnKind> = columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Initial,
                ColumnKind::Pending,
                ColumnKind::Pending,
                ColumnKind::Final,
                ColumnKind::Cancel,
            ]
        );
        let orders: Vec<u32> = columns.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        assert_eq!(columns[1].name, "Doing");
        assert_eq!(columns[4].name, CANCEL_COLUMN_NAME);
    }

    #[test]
    fn plan_rejects_short_layouts() {
        let err = plan_custom_columns(Uuid::nil(), &["Only"]).unwrap_err();
        assert!(matches!(err, BoardServiceError::InvalidColumnCount(1)));
        assert_eq!(err.category(), ErrorCategory::Validation);

        let empty: [&str; 0] = [];
        let err = plan_custom_columns(Uuid::nil(), &empty).unwrap_err();
        assert!(matches!(err, BoardServiceError::InvalidColumnCount(0)));
    }

    #[test]
    fn plan_reports_position_of_blank_name() {
        let err = plan_custom_columns(Uuid::nil(), &["Todo", "   ", "Done"]).unwrap_err();
        assert!(matches!(
            err,
            BoardServiceError::InvalidColumnName { position: 2 }
        ));
    }
}
