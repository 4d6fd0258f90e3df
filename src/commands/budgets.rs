// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::conversion::CurrencyConverter;
use crate::error::LedgerError;
use crate::models::{AuthenticatedUser, Transaction, TransactionType};
use crate::money::Money;
use crate::store::{self, TransactionFilter};
use crate::utils::{
    id_for_category, load_rate_table, maybe_print_json, parse_decimal, parse_month, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

pub fn handle(conn: &Connection, user: &AuthenticatedUser, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, user, sub)?,
        Some(("report", sub)) => {
            let month = parse_month(sub.get_one::<String>("month").unwrap())?;
            let report = budget_report(conn, user, &month)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
                let rows = report
                    .lines
                    .iter()
                    .map(|l| {
                        vec![
                            l.category.clone(),
                            l.budget.to_string(),
                            l.spent.to_string(),
                            l.used_pct
                                .map(|p| format!("{}%", p.round_dp(1)))
                                .unwrap_or_else(|| "n/a".into()),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Category", "Budget", "Spent", "Used"], rows)
                );
                if !report.skipped.is_empty() {
                    let skipped: Vec<&str> = report.skipped.iter().map(String::as_str).collect();
                    println!("Not included (no rate to {}): {}", user.base_currency, skipped.join(", "));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, user: &AuthenticatedUser, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let cat = sub.get_one::<String>("category").unwrap();
    let cat_id = id_for_category(conn, user.id, cat)?;
    let amount = Money::new(
        parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        &user.base_currency,
    )?;
    if amount.is_negative() {
        return Err(LedgerError::InvalidAmount(format!("budget {amount} must not be negative")).into());
    }
    store::upsert_budget(conn, user.id, &month, cat_id, &amount)?;
    println!("Budget set for {} / {} = {}", month, cat, amount);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub budget: Money,
    pub spent: Money,
    /// `None` when the budget and spend cannot be compared for lack of a rate.
    pub used_pct: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct BudgetReport {
    pub month: String,
    pub lines: Vec<BudgetLine>,
    pub skipped: BTreeSet<String>,
}

/// Spend contribution of a transaction: expenses count, reversed expenses
/// give their amount back. An EXPENSE that reverses an income is not spend.
fn spend_of(tx: &Transaction) -> Option<Money> {
    match (tx.kind, tx.reverses_id) {
        (TransactionType::Expense, None) => Some(tx.amount.clone()),
        (TransactionType::Income, Some(_)) => Some(tx.amount.negate()),
        _ => None,
    }
}

pub fn budget_report(conn: &Connection, user: &AuthenticatedUser, month: &str) -> Result<BudgetReport> {
    let rates = load_rate_table(conn)?;
    let converter = CurrencyConverter::new(&rates);
    let names: HashMap<i64, String> = store::list_categories(conn, user.id)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut lines = Vec::new();
    let mut skipped = BTreeSet::new();
    for budget in store::list_budgets(conn, user.id, Some(month))? {
        let filter = TransactionFilter {
            month: Some(month.to_string()),
            category_id: Some(budget.category_id),
            ..Default::default()
        };
        let spend: Vec<Money> = store::list_transactions(conn, user.id, &filter)?
            .iter()
            .filter_map(spend_of)
            .collect();
        let aggregate = converter.sum(&spend, &user.base_currency)?;
        skipped.extend(aggregate.skipped);
        let used_pct = match converter.percentage(&aggregate.total, &budget.amount) {
            Ok(p) => Some(p),
            Err(LedgerError::MissingExchangeRate { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        lines.push(BudgetLine {
            category: names
                .get(&budget.category_id)
                .cloned()
                .unwrap_or_else(|| format!("#{}", budget.category_id)),
            budget: budget.amount,
            spent: aggregate.total,
            used_pct,
        });
    }
    lines.sort_by(|a, b| a.category.cmp(&b.category));
    Ok(BudgetReport {
        month: month.to_string(),
        lines,
        skipped,
    })
}
