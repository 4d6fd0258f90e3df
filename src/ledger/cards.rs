// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::transactions::record_in;
use super::{active_account, begin, require_currency, require_positive};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AuthenticatedUser, Card, CardDetails, CardDraft, CardPatch, CardType, NewTransaction,
    PostpayPayment, Removal, Transaction, TransactionType,
};
use crate::money::Money;
use crate::policy;
use crate::recurrence;
use crate::store;
use chrono::{Datelike, Days, Months, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepaidCharge {
    /// EXPENSE recorded against the source account.
    pub transaction: Transaction,
    pub card_balance: Decimal,
    pub source_balance: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardPaymentRequest {
    pub card_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardPayment {
    pub transaction: Transaction,
    /// Debit auto-transfer that covered a shortfall, if one was needed.
    pub top_up: Option<Transaction>,
    pub postpay: Option<PostpayPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostpayCycle {
    pub card_id: i64,
    pub due_date: NaiveDate,
    pub payments: Vec<PostpayPayment>,
    pub total: Money,
    pub remaining: Money,
}

fn wrong_type(card: &Card, expected: &'static str) -> LedgerError {
    LedgerError::WrongCardType {
        card_id: card.id,
        expected,
        found: card.card_type().as_str(),
    }
}

fn usable_card(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Card> {
    let card = store::get_card(conn, user_id, id)?;
    if !card.is_active {
        return Err(LedgerError::InvalidInput(format!("card {id} is inactive")));
    }
    Ok(card)
}

fn check_linked_account(conn: &Connection, user_id: i64, details: &CardDetails) -> LedgerResult<()> {
    if let CardDetails::Debit {
        linked_account_id: Some(linked),
        ..
    } = details
    {
        store::get_account(conn, user_id, *linked)?;
    }
    Ok(())
}

fn month_bounds(on: NaiveDate) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let first = on
        .with_day(1)
        .ok_or_else(|| LedgerError::InvalidInput(format!("no first day for {on}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| LedgerError::InvalidInput(format!("date overflow after {on}")))?;
    Ok((first, last))
}

fn credit_left(conn: &Connection, card_id: i64, limit: Decimal, on: NaiveDate) -> LedgerResult<Decimal> {
    let (first, last) = month_bounds(on)?;
    let used = store::card_net_spend_between(conn, card_id, first, last)?;
    Ok(limit - used)
}

fn cycle_total(payments: &[PostpayPayment]) -> Decimal {
    payments.iter().map(|p| p.amount.amount()).sum()
}

pub fn create_card(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    draft: CardDraft,
) -> LedgerResult<Card> {
    let details = policy::validate_card(&draft)?;
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidCardConfiguration {
            card_type: draft.card_type.as_str(),
            field: "name",
            reason: "must not be empty",
        });
    }
    let tx = begin(conn)?;
    active_account(&tx, user.id, draft.account_id)?;
    check_linked_account(&tx, user.id, &details)?;
    let card = store::insert_card(&tx, user.id, name, draft.account_id, &details)?;
    tx.commit()?;
    info!(card = card.id, kind = %card.card_type(), account = card.account_id, "created card");
    Ok(card)
}

/// Merges `patch` into the card's current configuration and re-runs the
/// card policy on the result.
pub fn update_card(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    id: i64,
    patch: CardPatch,
) -> LedgerResult<Card> {
    let tx = begin(conn)?;
    let mut card = store::get_card(&tx, user.id, id)?;
    let mut draft = CardDraft::from_card(&card);
    if let Some(name) = patch.name {
        draft.name = name.trim().to_string();
    }
    if patch.credit_limit.is_some() {
        draft.credit_limit = patch.credit_limit;
    }
    if let Some(enabled) = patch.auto_transfer_enabled {
        draft.auto_transfer_enabled = enabled;
    }
    if patch.linked_account_id.is_some() {
        draft.linked_account_id = patch.linked_account_id;
    }
    if patch.monthly_limit.is_some() {
        draft.monthly_limit = patch.monthly_limit;
    }
    if patch.due_day.is_some() {
        draft.due_day = patch.due_day;
    }
    let details = policy::validate_card(&draft)?;
    if draft.name.is_empty() {
        return Err(LedgerError::InvalidCardConfiguration {
            card_type: draft.card_type.as_str(),
            field: "name",
            reason: "must not be empty",
        });
    }
    check_linked_account(&tx, user.id, &details)?;
    card.name = draft.name;
    card.details = details;
    if let Some(active) = patch.is_active {
        card.is_active = active;
    }
    store::update_card(&tx, &card)?;
    tx.commit()?;
    Ok(card)
}

pub fn delete_card(conn: &mut Connection, user: &AuthenticatedUser, id: i64) -> LedgerResult<Removal> {
    let tx = begin(conn)?;
    let mut card = store::get_card(&tx, user.id, id)?;
    let references = store::card_reference_count(&tx, id)?;
    let removal = if references > 0 {
        card.is_active = false;
        store::update_card(&tx, &card)?;
        warn!(card = id, references, "card has history, deactivated instead of deleted");
        Removal::Deactivated
    } else {
        store::delete_card(&tx, id)?;
        info!(card = id, "deleted card");
        Removal::Deleted
    };
    tx.commit()?;
    Ok(removal)
}

/// Moves `amount` from `from_account_id` onto a prepaid card's own balance.
/// The source account is debited through a recorded EXPENSE, so its balance
/// stays reconcilable with its transaction history.
pub fn charge_prepaid_card(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    card_id: i64,
    amount: Decimal,
    from_account_id: i64,
    date: NaiveDate,
) -> LedgerResult<PrepaidCharge> {
    let tx = begin(conn)?;
    let card = usable_card(&tx, user.id, card_id)?;
    if card.card_type() != CardType::Prepaid {
        return Err(wrong_type(&card, "PREPAID"));
    }
    if from_account_id == card.account_id {
        return Err(LedgerError::InvalidInput(
            "a prepaid card cannot be charged from its own account".into(),
        ));
    }
    let source = active_account(&tx, user.id, from_account_id)?;
    let charge = Money::new(amount, &source.currency)?;
    require_positive(&charge)?;
    if source.balance.less_than(&charge, None)? {
        return Err(LedgerError::insufficient_funds(&source.balance, &charge));
    }

    let transaction = record_in(
        &tx,
        user,
        NewTransaction {
            account_id: source.id,
            to_account_id: None,
            card_id: Some(card.id),
            category_id: None,
            kind: TransactionType::Expense,
            amount,
            currency: source.currency.clone(),
            description: format!("Prepaid charge: {}", card.name),
            date,
        },
        None,
    )?;
    let card_balance = store::apply_prepaid_delta(&tx, card.id, amount)?;
    let source_balance = store::get_account(&tx, user.id, source.id)?.balance;
    tx.commit()?;
    info!(card = card.id, %card_balance, source = source.id, "charged prepaid card");
    Ok(PrepaidCharge {
        transaction,
        card_balance,
        source_balance,
    })
}

/// Records a card payment as an EXPENSE against the card's account, after
/// the card-type checks: credit cards must have room under their limit for
/// the current month, debit cards with auto-transfer pull any shortfall from
/// their linked account first, and postpay cards must stay within the
/// monthly limit of the cycle the payment falls into.
pub fn pay_card(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    request: CardPaymentRequest,
) -> LedgerResult<CardPayment> {
    let tx = begin(conn)?;
    let card = usable_card(&tx, user.id, request.card_id)?;
    let payment = Money::new(request.amount, &request.currency)?;
    require_positive(&payment)?;
    let account = active_account(&tx, user.id, card.account_id)?;
    require_currency(&account, &payment)?;
    if let Some(category_id) = request.category_id {
        store::get_category(&tx, user.id, category_id)?;
    }

    let mut top_up = None;
    let mut postpay_due = None;
    match card.details {
        CardDetails::Credit { credit_limit } => {
            let available = credit_left(&tx, card.id, credit_limit, request.date)?;
            if payment.amount() > available {
                return Err(LedgerError::LimitExceeded {
                    card_id: card.id,
                    available,
                    requested: payment.amount(),
                });
            }
        }
        CardDetails::Debit {
            auto_transfer_enabled: true,
            linked_account_id: Some(linked),
        } if account.balance.less_than(&payment, None)? => {
            let shortfall = payment.subtract(&account.balance, None)?;
            let source = active_account(&tx, user.id, linked)?;
            require_currency(&source, &shortfall)?;
            if source.balance.less_than(&shortfall, None)? {
                return Err(LedgerError::insufficient_funds(&source.balance, &shortfall));
            }
            top_up = Some(record_in(
                &tx,
                user,
                NewTransaction {
                    account_id: source.id,
                    to_account_id: Some(account.id),
                    card_id: None,
                    category_id: None,
                    kind: TransactionType::Transfer,
                    amount: shortfall.amount(),
                    currency: shortfall.currency().to_string(),
                    description: format!("Auto-transfer for {}", card.name),
                    date: request.date,
                },
                None,
            )?);
        }
        CardDetails::Debit { .. } => {}
        CardDetails::Prepaid { .. } => return Err(wrong_type(&card, "CREDIT, DEBIT or POSTPAY")),
        CardDetails::Postpay {
            monthly_limit,
            due_day,
        } => {
            let due = recurrence::next_day_of_month(request.date, due_day)?;
            let committed = cycle_total(&store::list_postpay_payments(&tx, card.id, due)?);
            let available = monthly_limit - committed;
            if payment.amount() > available {
                return Err(LedgerError::LimitExceeded {
                    card_id: card.id,
                    available,
                    requested: payment.amount(),
                });
            }
            postpay_due = Some(due);
        }
    }

    let transaction = record_in(
        &tx,
        user,
        NewTransaction {
            account_id: account.id,
            to_account_id: None,
            card_id: Some(card.id),
            category_id: request.category_id,
            kind: TransactionType::Expense,
            amount: payment.amount(),
            currency: payment.currency().to_string(),
            description: request.description,
            date: request.date,
        },
        None,
    )?;
    let postpay = match postpay_due {
        Some(due) => Some(store::insert_postpay_payment(
            &tx,
            card.id,
            transaction.id,
            &payment,
            due,
        )?),
        None => None,
    };
    tx.commit()?;
    info!(card = card.id, transaction = transaction.id, amount = %payment, "recorded card payment");
    Ok(CardPayment {
        transaction,
        top_up,
        postpay,
    })
}

/// `credit_limit - net spend` for the calendar month containing `on`.
pub fn credit_available(
    conn: &Connection,
    user: &AuthenticatedUser,
    card_id: i64,
    on: NaiveDate,
) -> LedgerResult<Money> {
    let card = store::get_card(conn, user.id, card_id)?;
    let CardDetails::Credit { credit_limit } = card.details else {
        return Err(wrong_type(&card, "CREDIT"));
    };
    let account = store::get_account(conn, user.id, card.account_id)?;
    Money::new(credit_left(conn, card.id, credit_limit, on)?, &account.currency)
}

/// Payments owed at the first due date on or after `on`.
pub fn postpay_cycle(
    conn: &Connection,
    user: &AuthenticatedUser,
    card_id: i64,
    on: NaiveDate,
) -> LedgerResult<PostpayCycle> {
    let card = store::get_card(conn, user.id, card_id)?;
    let CardDetails::Postpay {
        monthly_limit,
        due_day,
    } = card.details
    else {
        return Err(wrong_type(&card, "POSTPAY"));
    };
    let account = store::get_account(conn, user.id, card.account_id)?;
    let due_date = recurrence::next_day_of_month(on, due_day)?;
    let payments = store::list_postpay_payments(conn, card.id, due_date)?;
    let total = cycle_total(&payments);
    Ok(PostpayCycle {
        card_id: card.id,
        due_date,
        payments,
        total: Money::new(total, &account.currency)?,
        remaining: Money::new(monthly_limit - total, &account.currency)?,
    })
}
