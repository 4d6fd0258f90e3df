// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::money::Money;
use crate::recurrence::Frequency;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller identity handed to every ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub base_currency: String,
}

macro_rules! string_enum {
    ($name:ident, $err:expr, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().replace('-', "_").as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err($err(s)),
                }
            }
        }
    };
}

string_enum!(AccountType, |s: &str| LedgerError::InvalidAccountConfiguration(format!("unknown account type '{s}'")), {
    Cash => "CASH",
    Checking => "CHECKING",
    Savings => "SAVINGS",
    FixedDeposit => "FIXED_DEPOSIT",
});

string_enum!(CardType, |s: &str| LedgerError::InvalidInput(format!("unknown card type '{s}'")), {
    Credit => "CREDIT",
    Debit => "DEBIT",
    Prepaid => "PREPAID",
    Postpay => "POSTPAY",
});

string_enum!(TransactionType, |s: &str| LedgerError::InvalidInput(format!("unknown transaction type '{s}'")), {
    Income => "INCOME",
    Expense => "EXPENSE",
    Transfer => "TRANSFER",
});

string_enum!(ScheduleStatus, |s: &str| LedgerError::Corrupt(format!("unknown schedule status '{s}'")), {
    Pending => "PENDING",
    Completed => "COMPLETED",
    Overdue => "OVERDUE",
    Cancelled => "CANCELLED",
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub kind: AccountType,
    pub currency: String,
    pub balance: Money,
    pub opening_balance: Money,
    pub is_active: bool,
    /// Fixed deposits only.
    pub rate: Option<Decimal>,
    /// Fixed deposits only.
    pub maturity: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    pub kind: AccountType,
    pub currency: String,
    pub opening_balance: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub maturity: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub rate: Option<Decimal>,
    pub maturity: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Card-type specific state, only constructible through the card policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardDetails {
    Credit {
        credit_limit: Decimal,
    },
    Debit {
        auto_transfer_enabled: bool,
        linked_account_id: Option<i64>,
    },
    Prepaid {
        balance: Decimal,
    },
    Postpay {
        monthly_limit: Decimal,
        due_day: u32,
    },
}

impl CardDetails {
    pub fn card_type(&self) -> CardType {
        match self {
            CardDetails::Credit { .. } => CardType::Credit,
            CardDetails::Debit { .. } => CardType::Debit,
            CardDetails::Prepaid { .. } => CardType::Prepaid,
            CardDetails::Postpay { .. } => CardType::Postpay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub account_id: i64,
    pub is_active: bool,
    pub details: CardDetails,
}

impl Card {
    pub fn card_type(&self) -> CardType {
        self.details.card_type()
    }
}

/// Unvalidated card fields as they arrive from a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    pub card_type: CardType,
    pub name: String,
    pub account_id: i64,
    pub credit_limit: Option<Decimal>,
    pub auto_transfer_enabled: bool,
    pub linked_account_id: Option<i64>,
    pub balance: Option<Decimal>,
    pub monthly_limit: Option<Decimal>,
    pub due_day: Option<u32>,
}

impl CardDraft {
    pub fn new(card_type: CardType, name: &str, account_id: i64) -> Self {
        Self {
            card_type,
            name: name.to_string(),
            account_id,
            credit_limit: None,
            auto_transfer_enabled: false,
            linked_account_id: None,
            balance: None,
            monthly_limit: None,
            due_day: None,
        }
    }

    /// Draft describing an existing card, used as the base for updates.
    pub fn from_card(card: &Card) -> Self {
        let mut draft = Self::new(card.card_type(), &card.name, card.account_id);
        match &card.details {
            CardDetails::Credit { credit_limit } => draft.credit_limit = Some(*credit_limit),
            CardDetails::Debit {
                auto_transfer_enabled,
                linked_account_id,
            } => {
                draft.auto_transfer_enabled = *auto_transfer_enabled;
                draft.linked_account_id = *linked_account_id;
            }
            CardDetails::Prepaid { balance } => draft.balance = Some(*balance),
            CardDetails::Postpay {
                monthly_limit,
                due_day,
            } => {
                draft.monthly_limit = Some(*monthly_limit);
                draft.due_day = Some(*due_day);
            }
        }
        draft
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub credit_limit: Option<Decimal>,
    pub auto_transfer_enabled: Option<bool>,
    pub linked_account_id: Option<i64>,
    pub monthly_limit: Option<Decimal>,
    pub due_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub to_account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub category_id: Option<i64>,
    pub scheduled_transaction_id: Option<i64>,
    pub reverses_id: Option<i64>,
    pub kind: TransactionType,
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: i64,
    pub to_account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub category_id: Option<i64>,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledTransaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub to_account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub category_id: Option<i64>,
    pub kind: TransactionType,
    pub amount: Money,
    pub description: String,
    pub due_date: NaiveDate,
    pub frequency: Option<Frequency>,
    pub is_recurring: bool,
    pub end_date: Option<NaiveDate>,
    pub status: ScheduleStatus,
}

impl ScheduledTransaction {
    /// Stored status, with PENDING reported as OVERDUE once `today` is past
    /// the due date.
    pub fn effective_status(&self, today: NaiveDate) -> ScheduleStatus {
        match self.status {
            ScheduleStatus::Pending if self.due_date < today => ScheduleStatus::Overdue,
            s => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduledTransaction {
    pub account_id: i64,
    pub to_account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub category_id: Option<i64>,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub frequency: Option<Frequency>,
    pub is_recurring: bool,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostpayPayment {
    pub id: i64,
    pub card_id: i64,
    pub transaction_id: i64,
    pub amount: Money,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub month: String, // YYYY-MM
    pub category_id: i64,
    pub amount: Money, // base currency
}

/// Outcome of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Removal {
    Deleted,
    Deactivated,
}
