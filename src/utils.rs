// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::models::AuthenticatedUser;
use crate::money::normalize_currency;
use crate::rates::RateTable;
use crate::store;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{debug, info};

const UA: &str = concat!("hearthbook/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_USER: &str = "owner@localhost";
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `--date` if given, today otherwise.
pub fn date_arg(m: &clap::ArgMatches, name: &str) -> Result<NaiveDate> {
    match m.get_one::<String>(name) {
        Some(s) => parse_date(s),
        None => Ok(today()),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Accepts either a numeric id or an account name.
pub fn id_for_account(conn: &Connection, user_id: i64, key: &str) -> Result<i64> {
    if let Ok(id) = key.parse::<i64>() {
        return Ok(id);
    }
    store::find_account_by_name(conn, user_id, key)?
        .map(|a| a.id)
        .with_context(|| format!("Account '{}' not found", key))
}

/// Accepts either a numeric id or a category name.
pub fn id_for_category(conn: &Connection, user_id: i64, key: &str) -> Result<i64> {
    if let Ok(id) = key.parse::<i64>() {
        return Ok(id);
    }
    store::find_category_by_name(conn, user_id, key)?
        .map(|c| c.id)
        .with_context(|| format!("Category '{}' not found", key))
}

// Base currency settings
pub fn get_base_currency(conn: &Connection) -> Result<String> {
    Ok(store::get_setting(conn, "base_currency")?
        .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string()))
}

pub fn set_base_currency(conn: &Connection, user: &AuthenticatedUser, ccy: &str) -> Result<String> {
    let code = normalize_currency(ccy)?;
    store::set_setting(conn, "base_currency", &code)?;
    store::set_user_base_currency(conn, user.id, &code)?;
    Ok(code)
}

/// Resolves who the command runs as: `--user`, then the stored
/// `current_user`, then the local default user (created on first use).
pub fn current_user(conn: &Connection, override_email: Option<&str>) -> Result<AuthenticatedUser> {
    let email = match override_email {
        Some(e) => e.trim().to_lowercase(),
        None => store::get_setting(conn, "current_user")?.unwrap_or_else(|| DEFAULT_USER.into()),
    };
    if let Some(user) = store::find_user_by_email(conn, &email)? {
        return Ok(user);
    }
    if email != DEFAULT_USER {
        return Err(LedgerError::UserNotFound(email).into());
    }
    let base = get_base_currency(conn)?;
    let user = store::insert_user(conn, &email, &base)?;
    info!(user = user.id, email = %user.email, "created default user");
    Ok(user)
}

/// Rebuilds the rate table from every stored rate record.
pub fn load_rate_table(conn: &Connection) -> Result<RateTable> {
    let entries = store::load_rates(conn)?;
    let count = entries.len();
    let table = RateTable::from_entries(entries)?;
    debug!(records = count, pairs = table.len(), "loaded rate table");
    Ok(table)
}
