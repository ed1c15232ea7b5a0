//! Core use-case services.
//!
//! # Responsibility
//! - Board composition, card lifecycle and block ledger rules.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Every precondition check runs before the first write of an operation,
//!   so a rejected operation leaves storage untouched.
//! - Services never commit or roll back; the caller owns the transaction.

pub mod block_ledger;
pub mod board_service;
pub mod card_service;

/// Coarse classification of service failures for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input; nothing changed, caller may retry with corrected input.
    Validation,
    /// Operation conflicts with the card's current block/column state.
    StateConflict,
    /// Addressed entity does not exist.
    NotFound,
    /// Board was built outside composition rules.
    StructuralInvariant,
    /// Storage transport or persisted-data failure.
    Storage,
}
