// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::record_in;
use super::{active_account, begin, require_currency, require_positive};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AuthenticatedUser, NewScheduledTransaction, NewTransaction, ScheduleStatus,
    ScheduledTransaction, Transaction, TransactionType,
};
use crate::money::Money;
use crate::recurrence;
use crate::store;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub transaction: Transaction,
    pub completed: ScheduledTransaction,
    /// The follow-up occurrence for recurring schedules still within range.
    pub next: Option<ScheduledTransaction>,
}

pub fn create_scheduled(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    fields: NewScheduledTransaction,
) -> LedgerResult<ScheduledTransaction> {
    let amount = Money::new(fields.amount, &fields.currency)?;
    require_positive(&amount)?;
    if fields.is_recurring && fields.frequency.is_none() {
        return Err(LedgerError::UnsupportedFrequency("none".into()));
    }
    if let Some(end) = fields.end_date {
        if end < fields.due_date {
            return Err(LedgerError::InvalidInput(format!(
                "end date {end} is before due date {}",
                fields.due_date
            )));
        }
    }
    match (fields.kind, fields.to_account_id) {
        (TransactionType::Transfer, None) => {
            return Err(LedgerError::InvalidInput(
                "a transfer needs a destination account".into(),
            ));
        }
        (TransactionType::Transfer, Some(_)) | (_, None) => {}
        (_, Some(_)) => {
            return Err(LedgerError::InvalidInput(
                "only transfers take a destination account".into(),
            ));
        }
    }

    let tx = begin(conn)?;
    let account = active_account(&tx, user.id, fields.account_id)?;
    require_currency(&account, &amount)?;
    if let Some(to) = fields.to_account_id {
        let destination = active_account(&tx, user.id, to)?;
        require_currency(&destination, &amount)?;
    }
    if let Some(card_id) = fields.card_id {
        store::get_card(&tx, user.id, card_id)?;
    }
    if let Some(category_id) = fields.category_id {
        store::get_category(&tx, user.id, category_id)?;
    }
    let created = store::insert_scheduled(
        &tx,
        ScheduledTransaction {
            id: 0,
            user_id: user.id,
            account_id: fields.account_id,
            to_account_id: fields.to_account_id,
            card_id: fields.card_id,
            category_id: fields.category_id,
            kind: fields.kind,
            amount,
            description: fields.description,
            due_date: fields.due_date,
            frequency: fields.frequency,
            is_recurring: fields.is_recurring,
            end_date: fields.end_date,
            status: ScheduleStatus::Pending,
        },
    )?;
    tx.commit()?;
    Ok(created)
}

fn ensure_open(st: &ScheduledTransaction) -> LedgerResult<()> {
    match st.status {
        ScheduleStatus::Completed => Err(LedgerError::AlreadyCompleted(st.id)),
        ScheduleStatus::Cancelled => Err(LedgerError::AlreadyCancelled(st.id)),
        ScheduleStatus::Pending | ScheduleStatus::Overdue => Ok(()),
    }
}

/// Completes a pending schedule: materialises its transaction dated
/// `completed_on`, marks it COMPLETED and, for recurring schedules whose next
/// occurrence is still within `end_date`, queues that occurrence as PENDING.
pub fn complete_scheduled(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    id: i64,
    completed_on: NaiveDate,
) -> LedgerResult<Completion> {
    let tx = begin(conn)?;
    let st = store::get_scheduled(&tx, user.id, id)?;
    ensure_open(&st)?;

    let next_due = if st.is_recurring {
        let frequency = st
            .frequency
            .ok_or_else(|| LedgerError::UnsupportedFrequency("none".into()))?;
        recurrence::next_occurrence(st.due_date, frequency, st.end_date)?
    } else {
        None
    };

    let transaction = record_in(
        &tx,
        user,
        NewTransaction {
            account_id: st.account_id,
            to_account_id: st.to_account_id,
            card_id: st.card_id,
            category_id: st.category_id,
            kind: st.kind,
            amount: st.amount.amount(),
            currency: st.amount.currency().to_string(),
            description: st.description.clone(),
            date: completed_on,
        },
        Some(st.id),
    )?;

    // The row can only have moved on through a concurrent completion.
    if !store::transition_scheduled(&tx, st.id, st.status, ScheduleStatus::Completed)? {
        return Err(LedgerError::AlreadyCompleted(st.id));
    }

    let next = match next_due {
        Some(due_date) => Some(store::insert_scheduled(
            &tx,
            ScheduledTransaction {
                id: 0,
                due_date,
                status: ScheduleStatus::Pending,
                ..st.clone()
            },
        )?),
        None => None,
    };
    tx.commit()?;

    info!(
        scheduled = st.id,
        transaction = transaction.id,
        next = ?next.as_ref().map(|n| n.due_date),
        "completed scheduled transaction"
    );
    Ok(Completion {
        transaction,
        completed: ScheduledTransaction {
            status: ScheduleStatus::Completed,
            ..st
        },
        next,
    })
}

/// PENDING -> CANCELLED. No balance effect.
pub fn cancel_scheduled(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    id: i64,
) -> LedgerResult<ScheduledTransaction> {
    let tx = begin(conn)?;
    let st = store::get_scheduled(&tx, user.id, id)?;
    ensure_open(&st)?;
    if !store::transition_scheduled(&tx, st.id, st.status, ScheduleStatus::Cancelled)? {
        return Err(LedgerError::AlreadyCompleted(st.id));
    }
    tx.commit()?;
    info!(scheduled = st.id, "cancelled scheduled transaction");
    Ok(ScheduledTransaction {
        status: ScheduleStatus::Cancelled,
        ..st
    })
}
