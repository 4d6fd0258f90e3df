// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::models::AuthenticatedUser;
use crate::money::{Money, normalize_currency};
use crate::rates::ExchangeRateEntry;
use crate::store;
use crate::utils::{
    http_client, load_rate_table, maybe_print_json, parse_decimal, pretty_table,
    set_base_currency,
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

const FRANKFURTER: &str = "https://api.frankfurter.dev/v1/latest";

pub fn handle(conn: &Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let entry = ExchangeRateEntry::new(
                sub.get_one::<String>("from").unwrap(),
                sub.get_one::<String>("to").unwrap(),
                parse_decimal(sub.get_one::<String>("rate").unwrap())?,
                Utc::now(),
                sub.get_one::<String>("source").unwrap(),
            )?;
            store::insert_rate(conn, &entry)?;
            println!(
                "1 {} = {} {} ({})",
                entry.from_currency, entry.rate, entry.to_currency, entry.source
            );
        }
        Some(("set-base", sub)) => {
            let ccy = set_base_currency(conn, user, sub.get_one::<String>("currency").unwrap())?;
            println!("Base currency set to {}", ccy);
        }
        Some(("fetch", _)) => fetch_rates(conn, user)?,
        Some(("list", sub)) => list_rates(conn, sub)?,
        Some(("convert", sub)) => convert_amount(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn held_currencies(conn: &Connection, user: &AuthenticatedUser) -> Result<BTreeSet<String>> {
    Ok(store::list_accounts(conn, user.id, true)?
        .into_iter()
        .map(|a| a.currency)
        .filter(|c| c != &user.base_currency)
        .collect())
}

#[derive(Debug, Deserialize)]
struct Latest {
    date: NaiveDate,
    rates: HashMap<String, Decimal>,
}

fn fetch_rates(conn: &Connection, user: &AuthenticatedUser) -> Result<()> {
    let base = &user.base_currency;
    let targets = held_currencies(conn, user)?;
    if targets.is_empty() {
        println!("No non-base currencies found; nothing to fetch.");
        return Ok(());
    }
    let symbols = targets.iter().cloned().collect::<Vec<_>>().join(",");
    let url = format!("{FRANKFURTER}?base={base}&symbols={symbols}");
    let client = http_client()?;
    let latest: Latest = client
        .get(&url)
        .send()?
        .error_for_status()?
        .json()
        .with_context(|| format!("Unexpected response from {}", url))?;

    let observed_at = latest
        .date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    let mut stored = 0;
    for (quote, rate) in latest.rates {
        match ExchangeRateEntry::new(base, &quote, rate, observed_at, "frankfurter") {
            Ok(entry) => {
                store::insert_rate(conn, &entry)?;
                stored += 1;
            }
            Err(e) => warn!(%quote, error = %e, "skipping fetched rate"),
        }
    }
    info!(stored, date = %latest.date, "fetched rates");
    println!("Stored {} rates for {} via Frankfurter (ECB).", stored, latest.date);
    Ok(())
}

fn list_rates(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let table = load_rate_table(conn)?;
    let entries: Vec<&ExchangeRateEntry> = table.entries();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
        let rows = entries
            .iter()
            .map(|e| {
                vec![
                    e.from_currency.clone(),
                    e.to_currency.clone(),
                    e.rate.round_dp(6).to_string(),
                    e.observed_at.format("%Y-%m-%d %H:%M").to_string(),
                    e.source.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["From", "To", "Rate", "Observed", "Source"], rows)
        );
    }
    Ok(())
}

fn convert_amount(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from = normalize_currency(sub.get_one::<String>("from").unwrap())?;
    let to = normalize_currency(sub.get_one::<String>("to").unwrap())?;
    let value = Money::new(parse_decimal(sub.get_one::<String>("amount").unwrap())?, &from)?;
    let table = load_rate_table(conn)?;
    let converted = table
        .convert(&value, &to)
        .ok_or(LedgerError::MissingExchangeRate {
            from: from.clone(),
            to: to.clone(),
        })?;
    match sub.get_one::<String>("locale") {
        Some(locale) => println!("{} -> {}", value.format(locale), converted.format(locale)),
        None => println!("{} -> {}", value, converted),
    }
    Ok(())
}
