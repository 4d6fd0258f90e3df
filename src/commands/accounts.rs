// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::{AccountDraft, AccountPatch, AccountType, AuthenticatedUser, Removal};
use crate::store;
use crate::utils::{id_for_account, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind: AccountType = sub.get_one::<String>("type").unwrap().parse()?;
            let draft = AccountDraft {
                name: sub.get_one::<String>("name").unwrap().to_string(),
                kind,
                currency: sub.get_one::<String>("currency").unwrap().to_string(),
                opening_balance: sub
                    .get_one::<String>("opening")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                rate: sub
                    .get_one::<String>("rate")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                maturity: sub
                    .get_one::<String>("maturity")
                    .map(|s| parse_date(s))
                    .transpose()?,
            };
            let account = ledger::create_account(conn, user, draft)?;
            println!(
                "Added account '{}' (#{}, {}, {})",
                account.name, account.id, account.kind, account.balance
            );
        }
        Some(("list", sub)) => {
            let accounts = store::list_accounts(conn, user.id, sub.get_flag("all"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let rows = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.id.to_string(),
                            a.name.clone(),
                            a.kind.to_string(),
                            a.currency.clone(),
                            a.balance.format("en-US"),
                            if a.is_active { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Name", "Type", "CCY", "Balance", "Active"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let id = id_for_account(conn, user.id, sub.get_one::<String>("account").unwrap())?;
            let is_active = if sub.get_flag("activate") {
                Some(true)
            } else if sub.get_flag("deactivate") {
                Some(false)
            } else {
                None
            };
            let patch = AccountPatch {
                name: sub.get_one::<String>("name").cloned(),
                rate: sub
                    .get_one::<String>("rate")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                maturity: sub
                    .get_one::<String>("maturity")
                    .map(|s| parse_date(s))
                    .transpose()?,
                is_active,
            };
            let account = ledger::update_account(conn, user, id, patch)?;
            println!("Updated account '{}' (#{})", account.name, account.id);
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("account").unwrap();
            let id = id_for_account(conn, user.id, key)?;
            match ledger::delete_account(conn, user, id)? {
                Removal::Deleted => println!("Removed account '{}'", key),
                Removal::Deactivated => {
                    println!("Account '{}' has history; deactivated instead", key)
                }
            }
        }
        _ => {}
    }
    Ok(())
}
