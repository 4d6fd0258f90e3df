// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::{AuthenticatedUser, NewScheduledTransaction, ScheduleStatus, TransactionType};
use crate::recurrence::Frequency;
use crate::store;
use crate::utils::{
    date_arg, id_for_account, id_for_category, maybe_print_json, parse_date, parse_decimal,
    pretty_table, today,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        Some(("complete", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let done = ledger::complete_scheduled(conn, user, id, date_arg(sub, "date")?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &done)? {
                println!(
                    "Completed #{} as transaction #{}",
                    id, done.transaction.id
                );
                if let Some(next) = &done.next {
                    println!("Next occurrence #{} due {}", next.id, next.due_date);
                }
            }
        }
        Some(("cancel", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            ledger::cancel_scheduled(conn, user, id)?;
            println!("Cancelled #{}", id);
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
    let frequency = sub
        .get_one::<String>("frequency")
        .map(|s| s.parse::<Frequency>())
        .transpose()?;
    let fields = NewScheduledTransaction {
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
        due_date: parse_date(sub.get_one::<String>("due").unwrap())?,
        is_recurring: frequency.is_some(),
        frequency,
        end_date: sub
            .get_one::<String>("until")
            .map(|s| parse_date(s))
            .transpose()?,
    };
    let st = ledger::create_scheduled(conn, user, fields)?;
    match st.frequency {
        Some(f) => println!("Scheduled #{} from {} ({})", st.id, st.due_date, f),
        None => println!("Scheduled #{} for {}", st.id, st.due_date),
    }
    Ok(())
}

fn list(conn: &Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let status = sub
        .get_one::<String>("status")
        .map(|s| s.parse::<ScheduleStatus>())
        .transpose()?;
    let today = today();
    let items = store::list_scheduled(conn, user.id, status)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        let rows = items
            .iter()
            .map(|st| {
                vec![
                    st.id.to_string(),
                    st.due_date.to_string(),
                    st.kind.to_string(),
                    st.amount.to_string(),
                    st.frequency.map(|f| f.to_string()).unwrap_or_default(),
                    st.effective_status(today).to_string(),
                    st.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Due", "Type", "Amount", "Repeats", "Status", "Description"],
                rows
            )
        );
    }
    Ok(())
}
