// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::money::normalize_currency;
use crate::store;
use crate::utils::{get_base_currency, maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let email = sub.get_one::<String>("email").unwrap().trim().to_lowercase();
            if !email.contains('@') {
                bail!("'{}' is not an email address", email);
            }
            if store::find_user_by_email(conn, &email)?.is_some() {
                bail!("User '{}' already exists", email);
            }
            let base = match sub.get_one::<String>("base") {
                Some(c) => normalize_currency(c)?,
                None => get_base_currency(conn)?,
            };
            let user = store::insert_user(conn, &email, &base)?;
            println!("Added user '{}' (#{}, base {})", user.email, user.id, user.base_currency);
        }
        Some(("use", sub)) => {
            let email = sub.get_one::<String>("email").unwrap().trim().to_lowercase();
            if store::find_user_by_email(conn, &email)?.is_none() {
                return Err(crate::error::LedgerError::UserNotFound(email).into());
            }
            store::set_setting(conn, "current_user", &email)?;
            println!("Now acting as '{}'", email);
        }
        Some(("list", sub)) => {
            let users = store::list_users(conn)?;
            let current = store::get_setting(conn, "current_user")?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &users)? {
                let rows = users
                    .iter()
                    .map(|u| {
                        let marker = if current.as_deref() == Some(u.email.as_str()) {
                            "*"
                        } else {
                            ""
                        };
                        vec![
                            marker.to_string(),
                            u.id.to_string(),
                            u.email.clone(),
                            u.base_currency.clone(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["", "Id", "Email", "Base"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
