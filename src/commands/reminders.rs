// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AuthenticatedUser, ScheduleStatus};
use crate::notify::{self, DEFAULT_HORIZON_DAYS};
use crate::store;
use crate::utils::{date_arg, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    let days = m
        .get_one::<i64>("days")
        .copied()
        .unwrap_or(DEFAULT_HORIZON_DAYS);
    let today = date_arg(m, "date")?;
    let pending = store::list_scheduled(conn, user.id, Some(ScheduleStatus::Pending))?;
    let notes = notify::reminders(&pending, today, days);
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &notes)? {
        if notes.is_empty() {
            println!("Nothing due in the next {} days.", days);
        } else {
            let rows = notes
                .into_iter()
                .map(|n| vec![n.title, n.message])
                .collect();
            println!("{}", pretty_table(&["Reminder", "Detail"], rows));
        }
    }
    Ok(())
}
