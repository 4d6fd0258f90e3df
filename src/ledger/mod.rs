// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance mutation protocol.
//!
//! Every mutating operation opens one IMMEDIATE SQLite transaction, runs all
//! of its checks, applies its balance deltas through compare-and-set updates
//! and commits. Any error drops the transaction, which rolls it back, so a
//! failed call never leaves a partial delta behind.

pub mod accounts;
pub mod cards;
pub mod scheduled;
pub mod transactions;

pub use accounts::{create_account, delete_account, update_account};
pub use cards::{
    CardPayment, CardPaymentRequest, PostpayCycle, PrepaidCharge, charge_prepaid_card, create_card,
    credit_available, delete_card, pay_card, postpay_cycle, update_card,
};
pub use scheduled::{Completion, cancel_scheduled, complete_scheduled, create_scheduled};
pub use transactions::{record_transaction, reverse_transaction};

use crate::error::{LedgerError, LedgerResult};
use crate::models::Account;
use crate::money::Money;
use crate::store;
use rusqlite::{Connection, TransactionBehavior};

pub(crate) fn begin(conn: &mut Connection) -> LedgerResult<rusqlite::Transaction<'_>> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Owned by `user_id` and not deactivated.
pub(crate) fn active_account(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Account> {
    let account = store::get_account(conn, user_id, id)?;
    if !account.is_active {
        return Err(LedgerError::AccountInactive(id));
    }
    Ok(account)
}

pub(crate) fn require_positive(amount: &Money) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount(format!(
            "{amount} must be greater than zero"
        )));
    }
    Ok(())
}

pub(crate) fn require_currency(account: &Account, amount: &Money) -> LedgerResult<()> {
    if account.currency != amount.currency() {
        return Err(LedgerError::InvalidCurrency {
            expected: account.currency.clone(),
            found: amount.currency().to_string(),
        });
    }
    Ok(())
}
