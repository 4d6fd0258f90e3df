// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{active_account, begin, require_currency, require_positive};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AuthenticatedUser, CardDetails, NewTransaction, Transaction, TransactionType};
use crate::money::Money;
use crate::store;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

/// Records a transaction and applies its balance delta atomically.
///
/// INCOME adds the amount to the account, EXPENSE subtracts it. A TRANSFER
/// subtracts it from the account and adds it to `to_account_id`.
pub fn record_transaction(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    fields: NewTransaction,
) -> LedgerResult<Transaction> {
    let tx = begin(conn)?;
    let recorded = record_in(&tx, user, fields, None)?;
    tx.commit()?;
    Ok(recorded)
}

/// Validation plus mutation, for callers that already hold a transaction.
pub(crate) fn record_in(
    conn: &Connection,
    user: &AuthenticatedUser,
    fields: NewTransaction,
    scheduled_transaction_id: Option<i64>,
) -> LedgerResult<Transaction> {
    let amount = Money::new(fields.amount, &fields.currency)?;
    require_positive(&amount)?;
    let account = active_account(conn, user.id, fields.account_id)?;
    if let Some(card_id) = fields.card_id {
        store::get_card(conn, user.id, card_id)?;
    }
    if let Some(category_id) = fields.category_id {
        store::get_category(conn, user.id, category_id)?;
    }
    require_currency(&account, &amount)?;

    match (fields.kind, fields.to_account_id) {
        (TransactionType::Transfer, Some(to)) => {
            if to == account.id {
                return Err(LedgerError::InvalidInput(
                    "a transfer needs two different accounts".into(),
                ));
            }
            let destination = active_account(conn, user.id, to)?;
            require_currency(&destination, &amount)?;
        }
        (TransactionType::Transfer, None) => {
            return Err(LedgerError::InvalidInput(
                "a transfer needs a destination account".into(),
            ));
        }
        (_, Some(_)) => {
            return Err(LedgerError::InvalidInput(
                "only transfers take a destination account".into(),
            ));
        }
        (_, None) => {}
    }

    let recorded = store::insert_transaction(
        conn,
        Transaction {
            id: 0,
            user_id: user.id,
            account_id: account.id,
            to_account_id: fields.to_account_id,
            card_id: fields.card_id,
            category_id: fields.category_id,
            scheduled_transaction_id,
            reverses_id: None,
            kind: fields.kind,
            amount,
            description: fields.description,
            date: fields.date,
        },
    )?;
    apply_effects(conn, &recorded)?;
    Ok(recorded)
}

/// Signed change a transaction makes to its own account.
pub fn signed_delta(tx: &Transaction) -> Money {
    match tx.kind {
        TransactionType::Income => tx.amount.clone(),
        TransactionType::Expense | TransactionType::Transfer => tx.amount.negate(),
    }
}

fn apply_effects(conn: &Connection, tx: &Transaction) -> LedgerResult<()> {
    let delta = signed_delta(tx);
    let balance = store::apply_balance_delta(conn, tx.account_id, &delta)?;
    info!(
        transaction = tx.id,
        account = tx.account_id,
        delta = %delta,
        balance = %balance,
        "applied balance delta"
    );
    if let Some(to) = tx.to_account_id {
        let balance = store::apply_balance_delta(conn, to, &tx.amount)?;
        info!(
            transaction = tx.id,
            account = to,
            delta = %tx.amount,
            balance = %balance,
            "applied transfer credit"
        );
    }
    Ok(())
}

/// A prepaid charge moved money from another account onto the card, so its
/// reversal takes the same amount back off the card.
fn unload_prepaid_charge(
    conn: &Connection,
    user: &AuthenticatedUser,
    original: &Transaction,
    card_id: i64,
) -> LedgerResult<()> {
    let card = store::get_card(conn, user.id, card_id)?;
    let CardDetails::Prepaid { balance } = card.details else {
        return Ok(());
    };
    if original.kind != TransactionType::Expense || original.account_id == card.account_id {
        return Ok(());
    }
    let amount = original.amount.amount();
    if balance < amount {
        let on_card = Money::new(balance, original.amount.currency())?;
        return Err(LedgerError::insufficient_funds(&on_card, &original.amount));
    }
    let left = store::apply_prepaid_delta(conn, card.id, -amount)?;
    info!(card = card.id, transaction = original.id, balance = %left, "unloaded prepaid card");
    Ok(())
}

/// Records the compensating entry for transaction `id`: INCOME and EXPENSE
/// swap, a TRANSFER runs back the other way. Transactions themselves stay
/// immutable, and each one can be reversed once. Reversing a prepaid charge
/// also takes the amount back off the card.
pub fn reverse_transaction(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    id: i64,
    date: NaiveDate,
) -> LedgerResult<Transaction> {
    let tx = begin(conn)?;
    let original = store::get_transaction(&tx, user.id, id)?;
    if original.reverses_id.is_some() {
        return Err(LedgerError::InvalidInput(format!(
            "transaction {id} is itself a reversal"
        )));
    }
    if store::is_reversed(&tx, id)? {
        return Err(LedgerError::AlreadyReversed(id));
    }
    let (kind, account_id, to_account_id) = match original.kind {
        TransactionType::Income => (TransactionType::Expense, original.account_id, None),
        TransactionType::Expense => (TransactionType::Income, original.account_id, None),
        TransactionType::Transfer => (
            TransactionType::Transfer,
            original
                .to_account_id
                .ok_or_else(|| LedgerError::Corrupt(format!("transfer {id} has no destination")))?,
            Some(original.account_id),
        ),
    };
    // Existence only: history on a deactivated account can still be corrected.
    store::get_account(&tx, user.id, account_id)?;
    if let Some(to) = to_account_id {
        store::get_account(&tx, user.id, to)?;
    }
    if let Some(card_id) = original.card_id {
        unload_prepaid_charge(&tx, user, &original, card_id)?;
    }

    let reversal = store::insert_transaction(
        &tx,
        Transaction {
            id: 0,
            user_id: user.id,
            account_id,
            to_account_id,
            card_id: original.card_id,
            category_id: original.category_id,
            scheduled_transaction_id: None,
            reverses_id: Some(original.id),
            kind,
            amount: original.amount.clone(),
            description: format!("Reversal of #{}: {}", original.id, original.description),
            date,
        },
    )?;
    apply_effects(&tx, &reversal)?;
    tx.commit()?;
    Ok(reversal)
}
