// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, CardPaymentRequest};
use crate::models::{AuthenticatedUser, Card, CardDetails, CardDraft, CardPatch, CardType, Removal};
use crate::store;
use crate::utils::{date_arg, id_for_account, id_for_category, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, sub)?,
        Some(("list", sub)) => list(conn, user, sub)?,
        Some(("edit", sub)) => edit(conn, user, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            match ledger::delete_card(conn, user, id)? {
                Removal::Deleted => println!("Removed card #{}", id),
                Removal::Deactivated => println!("Card #{} has history; deactivated instead", id),
            }
        }
        Some(("charge", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let from = id_for_account(conn, user.id, sub.get_one::<String>("from").unwrap())?;
            let date = date_arg(sub, "date")?;
            let charge = ledger::charge_prepaid_card(conn, user, id, amount, from, date)?;
            println!(
                "Loaded {} onto card #{}: card balance {}, source balance {}",
                charge.transaction.amount, id, charge.card_balance, charge.source_balance
            );
        }
        Some(("pay", sub)) => pay(conn, user, sub)?,
        Some(("available", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let available = ledger::credit_available(conn, user, id, date_arg(sub, "date")?)?;
            println!("Card #{} has {} of credit available", id, available);
        }
        Some(("cycle", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let cycle = ledger::postpay_cycle(conn, user, id, date_arg(sub, "date")?)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cycle)? {
                let rows = cycle
                    .payments
                    .iter()
                    .map(|p| {
                        vec![
                            p.transaction_id.to_string(),
                            p.amount.to_string(),
                            p.due_date.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Transaction", "Amount", "Due"], rows));
                println!(
                    "Due {}: total {}, remaining limit {}",
                    cycle.due_date, cycle.total, cycle.remaining
                );
            }
        }
        _ => {}
    }
    Ok(())
}

fn opt_decimal(sub: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    sub.get_one::<String>(name)
        .map(|s| parse_decimal(s))
        .transpose()
}

fn add(conn: &mut Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let card_type: CardType = sub.get_one::<String>("type").unwrap().parse()?;
    let account_id = id_for_account(conn, user.id, sub.get_one::<String>("account").unwrap())?;
    let mut draft = CardDraft::new(card_type, sub.get_one::<String>("name").unwrap(), account_id);
    draft.credit_limit = opt_decimal(sub, "credit-limit")?;
    draft.auto_transfer_enabled = sub.get_flag("auto-transfer");
    draft.linked_account_id = sub
        .get_one::<String>("linked-account")
        .map(|s| id_for_account(conn, user.id, s))
        .transpose()?;
    draft.balance = opt_decimal(sub, "balance")?;
    draft.monthly_limit = opt_decimal(sub, "monthly-limit")?;
    draft.due_day = sub.get_one::<u32>("due-day").copied();
    let card = ledger::create_card(conn, user, draft)?;
    println!("Added {} card '{}' (#{})", card.card_type(), card.name, card.id);
    Ok(())
}

fn describe(card: &Card) -> String {
    match &card.details {
        CardDetails::Credit { credit_limit } => format!("limit {}", credit_limit),
        CardDetails::Debit {
            auto_transfer_enabled: true,
            linked_account_id: Some(linked),
        } => format!("auto-transfer from #{}", linked),
        CardDetails::Debit { .. } => String::new(),
        CardDetails::Prepaid { balance } => format!("balance {}", balance),
        CardDetails::Postpay {
            monthly_limit,
            due_day,
        } => format!("limit {} / due day {}", monthly_limit, due_day),
    }
}

fn list(conn: &Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let cards = store::list_cards(conn, user.id, sub.get_flag("all"))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cards)? {
        let rows = cards
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.card_type().to_string(),
                    c.account_id.to_string(),
                    describe(c),
                    if c.is_active { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Type", "Account", "Details", "Active"], rows)
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let is_active = if sub.get_flag("activate") {
        Some(true)
    } else if sub.get_flag("deactivate") {
        Some(false)
    } else {
        None
    };
    let patch = CardPatch {
        name: sub.get_one::<String>("name").cloned(),
        is_active,
        credit_limit: opt_decimal(sub, "credit-limit")?,
        auto_transfer_enabled: sub.get_one::<bool>("auto-transfer").copied(),
        linked_account_id: sub
            .get_one::<String>("linked-account")
            .map(|s| id_for_account(conn, user.id, s))
            .transpose()?,
        monthly_limit: opt_decimal(sub, "monthly-limit")?,
        due_day: sub.get_one::<u32>("due-day").copied(),
    };
    let card = ledger::update_card(conn, user, id, patch)?;
    println!("Updated card '{}' (#{})", card.name, card.id);
    Ok(())
}

fn pay(conn: &mut Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let card_id = *sub.get_one::<i64>("id").unwrap();
    let card = store::get_card(conn, user.id, card_id)?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.clone(),
        None => store::get_account(conn, user.id, card.account_id)?.currency,
    };
    let request = CardPaymentRequest {
        card_id,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        currency,
        description: sub
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_else(|| format!("{} payment", card.name)),
        category_id: sub
            .get_one::<String>("category")
            .map(|s| id_for_category(conn, user.id, s))
            .transpose()?,
        date: date_arg(sub, "date")?,
    };
    let payment = ledger::pay_card(conn, user, request)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payment)? {
        if let Some(top_up) = &payment.top_up {
            println!(
                "Auto-transferred {} from account #{}",
                top_up.amount, top_up.account_id
            );
        }
        println!(
            "Paid {} with card #{} (transaction #{})",
            payment.transaction.amount, card_id, payment.transaction.id
        );
        if let Some(pp) = &payment.postpay {
            println!("Postpay obligation due {}", pp.due_date);
        }
    }
    Ok(())
}
