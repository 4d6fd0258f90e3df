// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Stable, surface-independent classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingExchangeRate,
    InvalidCurrency,
    InsufficientFunds,
    AccountNotFound,
    CardNotFound,
    CategoryNotFound,
    ScheduledTransactionNotFound,
    TransactionNotFound,
    InvalidCardConfiguration,
    UnsupportedFrequency,
    AlreadyCompleted,
    AlreadyCancelled,
    AlreadyReversed,
    AccountInactive,
    WrongCardType,
    InvalidAmount,
    InvalidInput,
    LimitExceeded,
    InvalidAccountConfiguration,
    InvalidExchangeRate,
    DivisionByZero,
    UserNotFound,
    ConcurrentModification,
    Storage,
    Corrupt,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingExchangeRate => "missing_exchange_rate",
            ErrorKind::InvalidCurrency => "invalid_currency",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::AccountNotFound => "account_not_found",
            ErrorKind::CardNotFound => "card_not_found",
            ErrorKind::CategoryNotFound => "category_not_found",
            ErrorKind::ScheduledTransactionNotFound => "scheduled_transaction_not_found",
            ErrorKind::TransactionNotFound => "transaction_not_found",
            ErrorKind::InvalidCardConfiguration => "invalid_card_configuration",
            ErrorKind::UnsupportedFrequency => "unsupported_frequency",
            ErrorKind::AlreadyCompleted => "already_completed",
            ErrorKind::AlreadyCancelled => "already_cancelled",
            ErrorKind::AlreadyReversed => "already_reversed",
            ErrorKind::AccountInactive => "account_inactive",
            ErrorKind::WrongCardType => "wrong_card_type",
            ErrorKind::InvalidAmount => "invalid_amount",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::LimitExceeded => "limit_exceeded",
            ErrorKind::InvalidAccountConfiguration => "invalid_account_configuration",
            ErrorKind::InvalidExchangeRate => "invalid_exchange_rate",
            ErrorKind::DivisionByZero => "division_by_zero",
            ErrorKind::UserNotFound => "user_not_found",
            ErrorKind::ConcurrentModification => "concurrent_modification",
            ErrorKind::Storage => "storage",
            ErrorKind::Corrupt => "corrupt",
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("No exchange rate available for {from} -> {to}")]
    MissingExchangeRate { from: String, to: String },
    #[error("Currency {found} does not match expected currency {expected}")]
    InvalidCurrency { expected: String, found: String },
    #[error("'{0}' is not a valid ISO currency code")]
    MalformedCurrency(String),
    #[error("Insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds { available: String, requested: String },
    #[error("Account {0} not found")]
    AccountNotFound(i64),
    #[error("Account {0} is inactive")]
    AccountInactive(i64),
    #[error("Card {0} not found")]
    CardNotFound(i64),
    #[error("Category {0} not found")]
    CategoryNotFound(i64),
    #[error("Scheduled transaction {0} not found")]
    ScheduledTransactionNotFound(i64),
    #[error("Transaction {0} not found")]
    TransactionNotFound(i64),
    #[error("Invalid {card_type} card configuration: {field} {reason}")]
    InvalidCardConfiguration {
        card_type: &'static str,
        field: &'static str,
        reason: &'static str,
    },
    #[error("Invalid account configuration: {0}")]
    InvalidAccountConfiguration(String),
    #[error("Unsupported recurrence frequency '{0}'")]
    UnsupportedFrequency(String),
    #[error("Scheduled transaction {0} is already completed")]
    AlreadyCompleted(i64),
    #[error("Scheduled transaction {0} is cancelled")]
    AlreadyCancelled(i64),
    #[error("Transaction {0} has already been reversed")]
    AlreadyReversed(i64),
    #[error("Card {card_id} is a {found} card, expected {expected}")]
    WrongCardType {
        card_id: i64,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Card {card_id} limit exceeded: {available} available, {requested} requested")]
    LimitExceeded {
        card_id: i64,
        available: Decimal,
        requested: Decimal,
    },
    #[error("Invalid exchange rate {rate} for {from} -> {to}")]
    InvalidExchangeRate {
        from: String,
        to: String,
        rate: Decimal,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("User '{0}' not found")]
    UserNotFound(String),
    #[error("{entity} {id} was modified concurrently")]
    ConcurrentModification { entity: &'static str, id: i64 },
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::MissingExchangeRate { .. } => ErrorKind::MissingExchangeRate,
            LedgerError::InvalidCurrency { .. } | LedgerError::MalformedCurrency(_) => {
                ErrorKind::InvalidCurrency
            }
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::AccountNotFound(_) => ErrorKind::AccountNotFound,
            LedgerError::AccountInactive(_) => ErrorKind::AccountInactive,
            LedgerError::CardNotFound(_) => ErrorKind::CardNotFound,
            LedgerError::CategoryNotFound(_) => ErrorKind::CategoryNotFound,
            LedgerError::ScheduledTransactionNotFound(_) => {
                ErrorKind::ScheduledTransactionNotFound
            }
            LedgerError::TransactionNotFound(_) => ErrorKind::TransactionNotFound,
            LedgerError::InvalidCardConfiguration { .. } => ErrorKind::InvalidCardConfiguration,
            LedgerError::InvalidAccountConfiguration(_) => ErrorKind::InvalidAccountConfiguration,
            LedgerError::UnsupportedFrequency(_) => ErrorKind::UnsupportedFrequency,
            LedgerError::AlreadyCompleted(_) => ErrorKind::AlreadyCompleted,
            LedgerError::AlreadyCancelled(_) => ErrorKind::AlreadyCancelled,
            LedgerError::AlreadyReversed(_) => ErrorKind::AlreadyReversed,
            LedgerError::WrongCardType { .. } => ErrorKind::WrongCardType,
            LedgerError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
            LedgerError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            LedgerError::InvalidExchangeRate { .. } => ErrorKind::InvalidExchangeRate,
            LedgerError::DivisionByZero => ErrorKind::DivisionByZero,
            LedgerError::UserNotFound(_) => ErrorKind::UserNotFound,
            LedgerError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            LedgerError::Storage(_) => ErrorKind::Storage,
            LedgerError::Corrupt(_) => ErrorKind::Corrupt,
        }
    }

    /// HTTP-style status for a boundary layer that speaks JSON.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::UserNotFound => 401,
            ErrorKind::AccountNotFound
            | ErrorKind::CardNotFound
            | ErrorKind::CategoryNotFound
            | ErrorKind::ScheduledTransactionNotFound
            | ErrorKind::TransactionNotFound => 404,
            ErrorKind::AlreadyCompleted
            | ErrorKind::AlreadyCancelled
            | ErrorKind::AlreadyReversed
            | ErrorKind::InsufficientFunds
            | ErrorKind::LimitExceeded
            | ErrorKind::AccountInactive
            | ErrorKind::ConcurrentModification => 409,
            ErrorKind::Storage | ErrorKind::Corrupt => 500,
            ErrorKind::MissingExchangeRate
            | ErrorKind::InvalidCurrency
            | ErrorKind::InvalidCardConfiguration
            | ErrorKind::UnsupportedFrequency
            | ErrorKind::WrongCardType
            | ErrorKind::InvalidAmount
            | ErrorKind::InvalidInput
            | ErrorKind::InvalidAccountConfiguration
            | ErrorKind::InvalidExchangeRate
            | ErrorKind::DivisionByZero => 400,
        }
    }

    pub fn insufficient_funds(available: &crate::money::Money, requested: &crate::money::Money) -> Self {
        LedgerError::InsufficientFunds {
            available: available.to_string(),
            requested: requested.to_string(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
