//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskboard_core` linkage.
//! - Optionally summarize the boards stored in a database file.
//!
//! Usage: `taskboard_cli [DB_PATH [LOG_DIR]]`. `LOG_DIR` must be absolute.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskboard_core::db::open_db;
use taskboard_core::{default_log_level, init_logging, BoardService, SqliteBoardRepository};

fn main() -> ExitCode {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());

    let mut args = std::env::args_os().skip(1);
    let Some(db_path) = args.next().map(PathBuf::from) else {
        return ExitCode::SUCCESS;
    };

    let result = args
        .next()
        .map_or(Ok(()), |log_dir| start_logging(&log_dir))
        .and_then(|()| print_boards(&db_path));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(log_dir: &OsStr) -> Result<(), String> {
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| "log directory must be valid UTF-8".to_string())?;
    init_logging(default_log_level(), log_dir)?;
    println!("logging level={} dir={log_dir}", default_log_level());
    Ok(())
}

fn print_boards(db_path: &Path) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let repo = SqliteBoardRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = BoardService::new(repo);

    let boards = service.list_boards().map_err(|err| err.to_string())?;
    println!("boards={}", boards.len());
    for board in boards {
        let details = service
            .board_details(board.id)
            .map_err(|err| err.to_string())?;
        println!("board id={} name={}", board.id, board.name);
        for summary in details.columns {
            println!(
                "  column order={} kind={} cards={} name={}",
                summary.column.order, summary.column.kind, summary.card_count, summary.column.name
            );
        }
    }
    Ok(())
}
