//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the persistence contracts the composition, lifecycle and ledger
//!   services depend on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories borrow the caller's connection; they never open, commit or
//!   roll back transactions themselves.
//! - Updates and deletes that touch no row fail with `RepoError::NotFound`.

pub mod block_repo;
pub mod board_repo;
pub mod card_repo;
mod error;
mod sqlite_support;

pub use error::{RepoError, RepoResult};
