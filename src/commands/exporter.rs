// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::{TransactionRow, to_rows};
use crate::models::AuthenticatedUser;
use crate::store::{self, TransactionFilter};
use crate::utils::parse_month;
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
            let out = sub.get_one::<String>("out").unwrap();
            let filter = TransactionFilter {
                month: sub
                    .get_one::<String>("month")
                    .map(|s| parse_month(s))
                    .transpose()?,
                ..Default::default()
            };
            let count = export_transactions(conn, user, &fmt, Path::new(out), &filter)?;
            println!("Exported {} transactions to {}", count, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes the user's transactions, oldest first, as `csv` or `json`.
pub fn export_transactions(
    conn: &Connection,
    user: &AuthenticatedUser,
    fmt: &str,
    out: &Path,
    filter: &TransactionFilter,
) -> Result<usize> {
    let mut txs = store::list_transactions(conn, user.id, filter)?;
    txs.reverse();
    let rows: Vec<TransactionRow> = to_rows(conn, user, &txs)?;

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Failed to write {}", out.display()))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(rows.len())
}
