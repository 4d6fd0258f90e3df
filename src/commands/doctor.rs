// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::transactions::signed_delta;
use crate::models::AuthenticatedUser;
use crate::store::{self, TransactionFilter};
use crate::utils::{load_rate_table, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection, user: &AuthenticatedUser) -> Result<()> {
    let issues = diagnose(conn, user)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection, user: &AuthenticatedUser) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();
    let accounts = store::list_accounts(conn, user.id, true)?;

    // 1) Currencies that cannot be valued in base
    let rates = load_rate_table(conn)?;
    let currencies: BTreeSet<&str> = accounts.iter().map(|a| a.currency.as_str()).collect();
    for ccy in currencies {
        if !rates.has_rate(ccy, &user.base_currency) {
            issues.push(Issue {
                kind: "missing_fx",
                detail: format!("{} -> {}", ccy, user.base_currency),
            });
        }
    }

    // 2) Stored balance vs opening balance plus recorded deltas
    let mut expected: HashMap<i64, _> = accounts
        .iter()
        .map(|a| (a.id, a.opening_balance.clone()))
        .collect();
    for tx in store::list_transactions(conn, user.id, &TransactionFilter::default())? {
        if let Some(total) = expected.get_mut(&tx.account_id) {
            *total = total.add(&signed_delta(&tx), None)?;
        }
        if let Some(total) = tx.to_account_id.and_then(|to| expected.get_mut(&to)) {
            *total = total.add(&tx.amount, None)?;
        }
    }
    for account in &accounts {
        if let Some(total) = expected.get(&account.id) {
            if !total.equals(&account.balance) {
                issues.push(Issue {
                    kind: "balance_mismatch",
                    detail: format!(
                        "{} (#{}): stored {}, history {}",
                        account.name, account.id, account.balance, total
                    ),
                });
            }
        }
    }
    Ok(issues)
}
