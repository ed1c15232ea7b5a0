use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use taskboard_core::db::open_db;
use taskboard_core::{
    default_log_level, init_logging, logging_status, BoardService, SqliteBoardRepository,
};

fn unique_temp_dir(suffix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "taskboard-bootstrap-{suffix}-{}-{nanos}",
        std::process::id()
    ))
}

#[test]
fn host_starts_logging_before_opening_database() {
    let log_dir = unique_temp_dir("logs");
    let log_dir_text = log_dir.to_str().unwrap().to_string();
    let db_dir = tempfile::tempdir().unwrap();

    init_logging(default_log_level(), &log_dir_text).unwrap();
    let conn = open_db(db_dir.path().join("boards.db")).unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    service.create_board_with_default_columns("Logged").unwrap();

    let (level, active_dir) = logging_status().unwrap();
    assert_eq!(level, default_log_level());
    assert_eq!(active_dir, log_dir);
    assert!(log_dir.is_dir());

    // Same arguments again are accepted; a different directory is not.
    init_logging(default_log_level(), &log_dir_text).unwrap();
    let other = unique_temp_dir("other");
    assert!(init_logging(default_log_level(), other.to_str().unwrap()).is_err());
}
