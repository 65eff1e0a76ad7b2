//! DeskDB CLI: admin console for the DeskDB research store.
//!
//! `deskdb [--db PATH | --memory] [--json] [-v] COMMAND`
//!
//! Runs a single command and exits: 0 on success, 1 on any error.

mod commands;
mod format;
mod parse;
mod state;

use std::process;
use std::sync::Arc;

use deskdb_core::StoreResult;
use deskdb_engine::Database;
use tracing::Level;

use commands::build_cli;
use format::{format_error, format_output, format_usage_error, OutputMode};
use parse::matches_to_action;
use state::SessionState;

fn main() {
    let matches = build_cli().get_matches();

    // Engine logs go to stderr so stdout stays parseable
    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", format_usage_error(&e, mode));
            process::exit(1);
        }
    };

    let db = match open_database(&matches) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    let state = SessionState::new(db);
    match state.execute(action) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    }
}

fn open_database(matches: &clap::ArgMatches) -> StoreResult<Arc<Database>> {
    if matches.get_flag("memory") {
        return Ok(Database::ephemeral());
    }
    let path = matches
        .get_one::<String>("db")
        .map(|s| s.as_str())
        .unwrap_or(".deskdb");
    Database::open(path)
}
