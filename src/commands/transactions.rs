// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::{AuthenticatedUser, NewTransaction, Transaction, TransactionType};
use crate::store::{self, TransactionFilter};
use crate::utils::{
    date_arg, id_for_account, id_for_category, maybe_print_json, parse_decimal, parse_month,
    pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        Some(("reverse", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let reversal = ledger::reverse_transaction(conn, user, id, date_arg(sub, "date")?)?;
            println!(
                "Reversed #{} with {} {} (transaction #{})",
                id, reversal.kind, reversal.amount, reversal.id
            );
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = id_for_account(conn, user.id, sub.get_one::<String>("account").unwrap())?;
    let kind: TransactionType = sub.get_one::<String>("type").unwrap().parse()?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.clone(),
        None => store::get_account(conn, user.id, account_id)?.currency,
    };
    let fields = NewTransaction {
        account_id,
        to_account_id: sub
            .get_one::<String>("to")
            .map(|s| id_for_account(conn, user.id, s))
            .transpose()?,
        card_id: sub.get_one::<i64>("card").copied(),
        category_id: sub
            .get_one::<String>("category")
            .map(|s| id_for_category(conn, user.id, s))
            .transpose()?,
        kind,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        currency,
        description: sub
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_default(),
        date: date_arg(sub, "date")?,
    };
    let tx = ledger::record_transaction(conn, user, fields)?;
    println!(
        "Recorded {} {} on {} (transaction #{})",
        tx.kind, tx.amount, tx.date, tx.id
    );
    Ok(())
}

fn list(conn: &Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, user, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.account.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Account", "Amount", "CCY", "Category", "Description"],
                rows,
            )
        );
    }
    Ok(())
}

/// Flattened, name-resolved view of a transaction for listing and export.
#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub account: String,
    pub to_account: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub card_id: Option<i64>,
    pub reverses_id: Option<i64>,
    pub description: String,
}

pub fn filter_from_args(
    conn: &Connection,
    user: &AuthenticatedUser,
    sub: &clap::ArgMatches,
) -> Result<TransactionFilter> {
    let arg = |name: &str| sub.try_get_one::<String>(name).ok().flatten();
    Ok(TransactionFilter {
        month: arg("month").map(|s| parse_month(s)).transpose()?,
        account_id: arg("account")
            .map(|s| id_for_account(conn, user.id, s))
            .transpose()?,
        category_id: arg("category")
            .map(|s| id_for_category(conn, user.id, s))
            .transpose()?,
        kind: arg("type")
            .map(|s| s.parse::<TransactionType>())
            .transpose()?,
        limit: sub.try_get_one::<usize>("limit").ok().flatten().copied(),
    })
}

pub fn query_rows(
    conn: &Connection,
    user: &AuthenticatedUser,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let filter = filter_from_args(conn, user, sub)?;
    let txs = store::list_transactions(conn, user.id, &filter)?;
    to_rows(conn, user, &txs)
}

pub fn to_rows(
    conn: &Connection,
    user: &AuthenticatedUser,
    txs: &[Transaction],
) -> Result<Vec<TransactionRow>> {
    let accounts: HashMap<i64, String> = store::list_accounts(conn, user.id, true)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let categories: HashMap<i64, String> = store::list_categories(conn, user.id)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let name_of = |map: &HashMap<i64, String>, id: Option<i64>| {
        id.and_then(|id| map.get(&id).cloned()).unwrap_or_default()
    };
    Ok(txs
        .iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind.to_string(),
            account: name_of(&accounts, Some(t.account_id)),
            to_account: name_of(&accounts, t.to_account_id),
            amount: t.amount.amount().to_string(),
            currency: t.amount.currency().to_string(),
            category: name_of(&categories, t.category_id),
            card_id: t.card_id,
            reverses_id: t.reverses_id,
            description: t.description.clone(),
        })
        .collect())
}
