// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::begin;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountDraft, AccountPatch, AuthenticatedUser, Removal};
use crate::money::Money;
use crate::policy;
use crate::store;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{info, warn};

pub fn create_account(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    draft: AccountDraft,
) -> LedgerResult<Account> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidAccountConfiguration(
            "name must not be empty".into(),
        ));
    }
    policy::validate_account_fields(draft.kind, draft.rate, draft.maturity)?;
    let opening = Money::new(
        draft.opening_balance.unwrap_or(Decimal::ZERO),
        &draft.currency,
    )?;

    let tx = begin(conn)?;
    if store::find_account_by_name(&tx, user.id, name)?.is_some() {
        return Err(LedgerError::InvalidAccountConfiguration(format!(
            "an account named '{name}' already exists"
        )));
    }
    let account = store::insert_account(
        &tx,
        user.id,
        name,
        draft.kind,
        &opening,
        draft.rate,
        draft.maturity,
    )?;
    tx.commit()?;
    info!(account = account.id, kind = %account.kind, opening = %opening, "created account");
    Ok(account)
}

/// Applies descriptive changes. Balance, type and currency are not editable.
pub fn update_account(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    id: i64,
    patch: AccountPatch,
) -> LedgerResult<Account> {
    let tx = begin(conn)?;
    let mut account = store::get_account(&tx, user.id, id)?;
    if let Some(name) = patch.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::InvalidAccountConfiguration(
                "name must not be empty".into(),
            ));
        }
        account.name = name;
    }
    if patch.rate.is_some() {
        account.rate = patch.rate;
    }
    if patch.maturity.is_some() {
        account.maturity = patch.maturity;
    }
    if let Some(active) = patch.is_active {
        account.is_active = active;
    }
    policy::validate_account_fields(account.kind, account.rate, account.maturity)?;
    store::update_account(&tx, &account)?;
    tx.commit()?;
    Ok(account)
}

/// Hard-deletes an account with no history; anything referenced by a
/// transaction, schedule or card is deactivated instead.
pub fn delete_account(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    id: i64,
) -> LedgerResult<Removal> {
    let tx = begin(conn)?;
    let mut account = store::get_account(&tx, user.id, id)?;
    let references = store::account_reference_count(&tx, id)?;
    let removal = if references > 0 {
        account.is_active = false;
        store::update_account(&tx, &account)?;
        warn!(account = id, references, "account has history, deactivated instead of deleted");
        Removal::Deactivated
    } else {
        store::delete_account(&tx, id)?;
        info!(account = id, "deleted account");
        Removal::Deleted
    };
    tx.commit()?;
    Ok(removal)
}
