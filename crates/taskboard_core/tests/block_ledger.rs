use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    BlockLedger, BlockLedgerError, BoardService, Card, CardService, ColumnKind, EntityKind,
    ErrorCategory, SqliteBlockRepository, SqliteBoardRepository, SqliteCardRepository,
};
use uuid::Uuid;

fn ledger(conn: &Connection) -> BlockLedger<SqliteBlockRepository<'_>> {
    BlockLedger::new(SqliteBlockRepository::try_new(conn).unwrap())
}

fn seeded_card(conn: &Connection) -> Card {
    let layout = BoardService::new(SqliteBoardRepository::try_new(conn).unwrap())
        .create_board_with_default_columns("Ledger")
        .unwrap();
    CardService::new(
        SqliteCardRepository::try_new(conn).unwrap(),
        SqliteBoardRepository::try_new(conn).unwrap(),
        SqliteBlockRepository::try_new(conn).unwrap(),
    )
    .create_card("Tracked", "", layout.board.id)
    .unwrap()
}

#[test]
fn block_opens_active_record_with_trimmed_reason() {
    let conn = open_db_in_memory().unwrap();
    let card = seeded_card(&conn);
    let ledger = ledger(&conn);

    let record = ledger.block(card.id, "  waiting on vendor ").unwrap();

    assert!(record.is_active());
    assert_eq!(record.block_reason, "waiting on vendor");
    assert!(record.blocked_at > 0);
    assert!(ledger.is_blocked(card.id).unwrap());
    assert_eq!(ledger.active_block(card.id).unwrap(), Some(record));
}

#[test]
fn second_block_fails_and_keeps_first_record() {
    let conn = open_db_in_memory().unwrap();
    let card = seeded_card(&conn);
    let ledger = ledger(&conn);
    let first = ledger.block(card.id, "first").unwrap();

    let err = ledger.block(card.id, "second").unwrap_err();

    assert!(matches!(err, BlockLedgerError::CardAlreadyBlocked(id) if id == card.id));
    assert_eq!(err.category(), ErrorCategory::StateConflict);
    assert_eq!(ledger.history(card.id).unwrap(), vec![first]);
    assert_eq!(ledger.count_blocks(card.id).unwrap(), 1);
}

#[test]
fn unblock_resolves_record_in_place() {
    let conn = open_db_in_memory().unwrap();
    let card = seeded_card(&conn);
    let ledger = ledger(&conn);
    let opened = ledger.block(card.id, "waiting").unwrap();

    let resolved = ledger.unblock(card.id, " unblocked by ops ").unwrap();

    assert_eq!(resolved.id, opened.id);
    assert_eq!(resolved.block_reason, "waiting");
    assert_eq!(resolved.unblock_reason.as_deref(), Some("unblocked by ops"));
    let unblocked_at = resolved.unblocked_at.unwrap();
    assert!(unblocked_at >= resolved.blocked_at);
    assert!(!ledger.is_blocked(card.id).unwrap());
    assert_eq!(ledger.active_block(card.id).unwrap(), None);
    assert_eq!(ledger.history(card.id).unwrap(), vec![resolved]);
}

#[test]
fn unblock_without_active_block_fails() {
    let conn = open_db_in_memory().unwrap();
    let card = seeded_card(&conn);
    let ledger = ledger(&conn);

    let err = ledger.unblock(card.id, "nothing to do").unwrap_err();
    assert!(matches!(err, BlockLedgerError::CardNotBlocked(id) if id == card.id));

    ledger.block(card.id, "once").unwrap();
    ledger.unblock(card.id, "done").unwrap();
    let err = ledger.unblock(card.id, "twice").unwrap_err();
    assert!(matches!(err, BlockLedgerError::CardNotBlocked(_)));
}

#[test]
fn history_lists_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let card = seeded_card(&conn);
    let ledger = ledger(&conn);

    for reason in ["one", "two", "three"] {
        ledger.block(card.id, reason).unwrap();
        ledger.unblock(card.id, format!("{reason} cleared")).unwrap();
    }
    ledger.block(card.id, "four").unwrap();

    let history = ledger.history(card.id).unwrap();
    let reasons: Vec<&str> = history.iter().map(|r| r.block_reason.as_str()).collect();
    assert_eq!(reasons, vec!["four", "three", "two", "one"]);
    assert!(history[0].is_active());
    assert!(history[1..].iter().all(|r| !r.is_active()));
    assert_eq!(ledger.count_blocks(card.id).unwrap(), 4);
}

#[test]
fn blank_reasons_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let card = seeded_card(&conn);
    let ledger = ledger(&conn);

    let err = ledger.block(card.id, "   ").unwrap_err();
    assert!(matches!(err, BlockLedgerError::EmptyReason));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(!ledger.is_blocked(card.id).unwrap());

    ledger.block(card.id, "real").unwrap();
    let err = ledger.unblock(card.id, "").unwrap_err();
    assert!(matches!(err, BlockLedgerError::EmptyReason));
    assert!(ledger.is_blocked(card.id).unwrap());
}

#[test]
fn unknown_card_is_reported_as_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ledger = ledger(&conn);
    let missing = Uuid::new_v4();

    for err in [
        ledger.block(missing, "reason").unwrap_err(),
        ledger.is_blocked(missing).unwrap_err(),
        ledger.count_blocks(missing).unwrap_err(),
    ] {
        assert!(matches!(
            err,
            BlockLedgerError::EntityNotFound {
                entity: EntityKind::Card,
                id
            } if id == missing
        ));
    }
}

#[test]
fn block_status_survives_moves_between_columns() {
    let conn = open_db_in_memory().unwrap();
    let layout = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap())
        .create_board_with_default_columns("Moves")
        .unwrap();
    let service = CardService::new(
        SqliteCardRepository::try_new(&conn).unwrap(),
        SqliteBoardRepository::try_new(&conn).unwrap(),
        SqliteBlockRepository::try_new(&conn).unwrap(),
    );
    let card = service.create_card("Roams", "", layout.board.id).unwrap();
    let pending = layout.column_of_kind(ColumnKind::Pending).unwrap().id;

    service.block_card(card.id, "hold").unwrap();
    service.unblock_card(card.id, "go").unwrap();
    service.move_card(card.id, pending).unwrap();
    service.block_card(card.id, "hold again").unwrap();

    assert!(service.ledger().is_blocked(card.id).unwrap());
    assert_eq!(service.ledger().count_blocks(card.id).unwrap(), 2);
}
