// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-type validation for cards and accounts. Pure functions, no I/O.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccountType, CardDetails, CardDraft, CardType};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const DEFAULT_POSTPAY_DUE_DAY: u32 = 25;

fn invalid(card_type: CardType, field: &'static str, reason: &'static str) -> LedgerError {
    LedgerError::InvalidCardConfiguration {
        card_type: card_type.as_str(),
        field,
        reason,
    }
}

fn require_positive(
    card_type: CardType,
    field: &'static str,
    value: Option<Decimal>,
) -> LedgerResult<Decimal> {
    match value {
        None => Err(invalid(card_type, field, "is required")),
        Some(v) if v <= Decimal::ZERO => Err(invalid(card_type, field, "must be greater than zero")),
        Some(v) => Ok(v),
    }
}

/// Turns raw card fields into type-specific details, rejecting the first
/// violated rule.
pub fn validate_card(draft: &CardDraft) -> LedgerResult<CardDetails> {
    let card_type = draft.card_type;
    match card_type {
        CardType::Credit => Ok(CardDetails::Credit {
            credit_limit: require_positive(card_type, "creditLimit", draft.credit_limit)?,
        }),
        CardType::Debit => {
            if draft.auto_transfer_enabled && draft.linked_account_id.is_none() {
                return Err(invalid(card_type, "linkedAccountId", "is required when autoTransferEnabled is set"));
            }
            if draft.linked_account_id.is_some() && draft.linked_account_id == Some(draft.account_id) {
                return Err(invalid(card_type, "linkedAccountId", "must differ from the card account"));
            }
            Ok(CardDetails::Debit {
                auto_transfer_enabled: draft.auto_transfer_enabled,
                linked_account_id: draft.linked_account_id,
            })
        }
        CardType::Prepaid => {
            let balance = draft.balance.unwrap_or(Decimal::ZERO);
            if balance < Decimal::ZERO {
                return Err(invalid(card_type, "balance", "must not be negative"));
            }
            Ok(CardDetails::Prepaid { balance })
        }
        CardType::Postpay => {
            let monthly_limit = require_positive(card_type, "monthlyLimit", draft.monthly_limit)?;
            let due_day = draft.due_day.unwrap_or(DEFAULT_POSTPAY_DUE_DAY);
            if !(1..=28).contains(&due_day) {
                return Err(invalid(card_type, "dueDay", "must be between 1 and 28"));
            }
            Ok(CardDetails::Postpay {
                monthly_limit,
                due_day,
            })
        }
    }
}

/// Interest rate and maturity only make sense on fixed deposits.
pub fn validate_account_fields(
    kind: AccountType,
    rate: Option<Decimal>,
    maturity: Option<NaiveDate>,
) -> LedgerResult<()> {
    if kind != AccountType::FixedDeposit {
        if rate.is_some() || maturity.is_some() {
            return Err(LedgerError::InvalidAccountConfiguration(format!(
                "rate and maturity are only allowed on {} accounts, not {}",
                AccountType::FixedDeposit,
                kind
            )));
        }
        return Ok(());
    }
    if let Some(r) = rate {
        if r < Decimal::ZERO {
            return Err(LedgerError::InvalidAccountConfiguration(format!(
                "rate must not be negative, got {r}"
            )));
        }
    }
    Ok(())
}
