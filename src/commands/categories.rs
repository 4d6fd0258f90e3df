// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::AuthenticatedUser;
use crate::store;
use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                bail!("Category name must not be empty");
            }
            if store::find_category_by_name(conn, user.id, name)?.is_some() {
                bail!("Category '{}' already exists", name);
            }
            let category = store::insert_category(conn, user.id, name)?;
            println!("Added category '{}' (#{})", category.name, category.id);
        }
        Some(("list", sub)) => {
            let categories = store::list_categories(conn, user.id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &categories)? {
                let rows = categories
                    .iter()
                    .map(|c| vec![c.id.to_string(), c.name.clone()])
                    .collect();
                println!("{}", pretty_table(&["Id", "Category"], rows));
            }
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("name").unwrap();
            let id = id_for_category(conn, user.id, key)?;
            store::delete_category(conn, user.id, id)?;
            println!("Removed category '{}'", key);
        }
        _ => {}
    }
    Ok(())
}
