// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::io::stderr;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hearthbook::{cli, commands, db, utils};

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'warn'", level);
            LevelFilter::WARN
        }
    }
}

fn setup_logging(level: LevelFilter) {
    // stdout carries command output
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(|s| parse_log_level(s))
        .unwrap_or(LevelFilter::WARN);
    setup_logging(level);

    let db_override = matches.get_one::<String>("db").map(PathBuf::from);
    let mut conn = db::open_or_init(db_override.as_deref())?;

    // `user` manages identities itself and must work before any user exists
    if let Some(("user", sub)) = matches.subcommand() {
        return commands::users::handle(&conn, sub);
    }
    if let Some(("init", _)) = matches.subcommand() {
        println!(
            "Database initialized at {}",
            db::db_path(db_override.as_deref())?.display()
        );
        return Ok(());
    }

    let user = utils::current_user(&conn, matches.get_one::<String>("user").map(|s| s.as_str()))?;

    match matches.subcommand() {
        Some(("account", sub)) => commands::accounts::handle(&mut conn, &user, sub)?,
        Some(("card", sub)) => commands::cards::handle(&mut conn, &user, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, &user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, &user, sub)?,
        Some(("scheduled", sub)) => commands::scheduled::handle(&mut conn, &user, sub)?,
        Some(("fx", sub)) => commands::fx::handle(&conn, &user, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, &user, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, &user, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &user, sub)?,
        Some(("reminders", sub)) => commands::reminders::handle(&conn, &user, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn, &user)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
