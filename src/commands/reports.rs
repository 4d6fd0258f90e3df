// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::conversion::CurrencyConverter;
use crate::models::AuthenticatedUser;
use crate::money::Money;
use crate::store;
use crate::utils::{load_rate_table, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;

pub fn handle(conn: &Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => {
            let report = balances(conn, user)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
                let rows = report
                    .accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.balance.format("en-US"),
                            a.in_base
                                .as_ref()
                                .map(|m| m.format("en-US"))
                                .unwrap_or_else(|| "n/a".into()),
                        ]
                    })
                    .collect();
                let base_hdr = format!("In {}", report.total.currency());
                println!(
                    "{}",
                    pretty_table(&["Account", "Balance", &base_hdr], rows)
                );
                println!("Total: {}", report.total.format("en-US"));
                if !report.skipped.is_empty() {
                    let skipped: Vec<&str> = report.skipped.iter().map(String::as_str).collect();
                    println!("Not included (no rate): {}", skipped.join(", "));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BalanceLine {
    pub account_id: i64,
    pub name: String,
    pub balance: Money,
    pub in_base: Option<Money>,
}

#[derive(Debug, Serialize)]
pub struct BalanceReport {
    pub accounts: Vec<BalanceLine>,
    pub total: Money,
    pub skipped: BTreeSet<String>,
}

/// Active accounts ranked by value in the user's base currency.
pub fn balances(conn: &Connection, user: &AuthenticatedUser) -> Result<BalanceReport> {
    let rates = load_rate_table(conn)?;
    let converter = CurrencyConverter::new(&rates);
    let mut accounts = store::list_accounts(conn, user.id, false)?;

    let amounts: Vec<Money> = accounts.iter().map(|a| a.balance.clone()).collect();
    let aggregate = converter.sum(&amounts, &user.base_currency)?;
    let ranked = converter.sort_by_value(amounts, &user.base_currency)?;

    let mut lines = Vec::with_capacity(accounts.len());
    for balance in ranked.items {
        // Equal balances may repeat; take each account once
        let Some(pos) = accounts.iter().position(|a| a.balance == balance) else {
            continue;
        };
        let account = accounts.swap_remove(pos);
        lines.push(BalanceLine {
            account_id: account.id,
            name: account.name,
            in_base: rates.convert(&balance, &user.base_currency),
            balance,
        });
    }
    Ok(BalanceReport {
        accounts: lines,
        total: aggregate.total,
        skipped: aggregate.skipped,
    })
}
