// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read/write-by-id access to persisted entities.
//!
//! Every function takes a plain `&Connection`, so callers can hand in either
//! a connection or an open `rusqlite::Transaction` and get all-or-nothing
//! semantics from the latter. Lookups are always scoped to the owning user;
//! a row that belongs to someone else is reported as not found.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Account, AccountType, AuthenticatedUser, Budget, Card, CardDetails, CardType, Category,
    PostpayPayment, ScheduleStatus, ScheduledTransaction, Transaction, TransactionType,
};
use crate::money::Money;
use crate::rates::ExchangeRateEntry;
use crate::recurrence::Frequency;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::str::FromStr;

fn parsed_at<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_parsed_at<T>(row: &Row, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        s.parse::<T>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn missing_column(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Null,
        format!("{what} is required for this card type").into(),
    )
}

// ---------------------------------------------------------------- settings

pub fn get_setting(conn: &Connection, key: &str) -> LedgerResult<Option<String>> {
    Ok(conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

// ---------------------------------------------------------------- users

fn user_from_row(r: &Row) -> rusqlite::Result<AuthenticatedUser> {
    Ok(AuthenticatedUser {
        id: r.get(0)?,
        email: r.get(1)?,
        base_currency: r.get(2)?,
    })
}

pub fn insert_user(conn: &Connection, email: &str, base_currency: &str) -> LedgerResult<AuthenticatedUser> {
    conn.execute(
        "INSERT INTO users(email, base_currency) VALUES (?1, ?2)",
        params![email, base_currency],
    )?;
    Ok(AuthenticatedUser {
        id: conn.last_insert_rowid(),
        email: email.to_string(),
        base_currency: base_currency.to_string(),
    })
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> LedgerResult<Option<AuthenticatedUser>> {
    Ok(conn
        .query_row(
            "SELECT id, email, base_currency FROM users WHERE email=?1",
            params![email],
            user_from_row,
        )
        .optional()?)
}

pub fn set_user_base_currency(conn: &Connection, user_id: i64, base_currency: &str) -> LedgerResult<()> {
    conn.execute(
        "UPDATE users SET base_currency=?1 WHERE id=?2",
        params![base_currency, user_id],
    )?;
    Ok(())
}

pub fn list_users(conn: &Connection) -> LedgerResult<Vec<AuthenticatedUser>> {
    let mut stmt = conn.prepare("SELECT id, email, base_currency FROM users ORDER BY email")?;
    let rows = stmt.query_map([], user_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------- accounts

const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, type, currency, balance, opening_balance, is_active, rate, maturity";

fn account_from_row(r: &Row) -> rusqlite::Result<Account> {
    let currency: String = r.get(4)?;
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        kind: parsed_at::<AccountType>(r, 3)?,
        balance: Money::from_parts(parsed_at(r, 5)?, currency.clone()),
        opening_balance: Money::from_parts(parsed_at(r, 6)?, currency.clone()),
        currency,
        is_active: r.get(7)?,
        rate: opt_parsed_at(r, 8)?,
        maturity: r.get(9)?,
    })
}

pub fn insert_account(
    conn: &Connection,
    user_id: i64,
    name: &str,
    kind: AccountType,
    opening_balance: &Money,
    rate: Option<Decimal>,
    maturity: Option<NaiveDate>,
) -> LedgerResult<Account> {
    conn.execute(
        "INSERT INTO accounts(user_id, name, type, currency, balance, opening_balance, rate, maturity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7)",
        params![
            user_id,
            name,
            kind.as_str(),
            opening_balance.currency(),
            opening_balance.amount().to_string(),
            rate.map(|r| r.to_string()),
            maturity
        ],
    )?;
    get_account(conn, user_id, conn.last_insert_rowid())
}

pub fn get_account(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Account> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        account_from_row,
    )
    .optional()?
    .ok_or(LedgerError::AccountNotFound(id))
}

pub fn find_account_by_name(conn: &Connection, user_id: i64, name: &str) -> LedgerResult<Option<Account>> {
    Ok(conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name=?1 AND user_id=?2"),
            params![name, user_id],
            account_from_row,
        )
        .optional()?)
}

pub fn list_accounts(conn: &Connection, user_id: i64, include_inactive: bool) -> LedgerResult<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id=?1 AND (is_active=1 OR ?2) ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id, include_inactive], account_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Persists the descriptive fields of an account. Balances are never
/// written here; see [`apply_balance_delta`].
pub fn update_account(conn: &Connection, account: &Account) -> LedgerResult<()> {
    conn.execute(
        "UPDATE accounts SET name=?1, is_active=?2, rate=?3, maturity=?4 WHERE id=?5",
        params![
            account.name,
            account.is_active,
            account.rate.map(|r| r.to_string()),
            account.maturity,
            account.id
        ],
    )?;
    Ok(())
}

pub fn delete_account(conn: &Connection, id: i64) -> LedgerResult<()> {
    conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    Ok(())
}

/// Transactions, scheduled transactions and cards that point at the account.
pub fn account_reference_count(conn: &Connection, id: i64) -> LedgerResult<i64> {
    Ok(conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM transactions WHERE account_id=?1 OR to_account_id=?1)
          + (SELECT COUNT(*) FROM scheduled_transactions WHERE account_id=?1 OR to_account_id=?1)
          + (SELECT COUNT(*) FROM cards WHERE account_id=?1 OR linked_account_id=?1)",
        params![id],
        |r| r.get(0),
    )?)
}

/// Adds `delta` to the account balance with a compare-and-set on the value
/// that was read, returning the new balance. Run inside a transaction.
pub fn apply_balance_delta(conn: &Connection, account_id: i64, delta: &Money) -> LedgerResult<Money> {
    let (currency, current): (String, String) = conn
        .query_row(
            "SELECT currency, balance FROM accounts WHERE id=?1",
            params![account_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?
        .ok_or(LedgerError::AccountNotFound(account_id))?;
    if currency != delta.currency() {
        return Err(LedgerError::InvalidCurrency {
            expected: currency,
            found: delta.currency().to_string(),
        });
    }
    let balance = current
        .parse::<Decimal>()
        .map_err(|e| LedgerError::Corrupt(format!("balance of account {account_id}: {e}")))?;
    let next = Money::from_parts(balance, currency).add(delta, None)?;
    let changed = conn.execute(
        "UPDATE accounts SET balance=?1 WHERE id=?2 AND balance=?3",
        params![next.amount().to_string(), account_id, current],
    )?;
    if changed != 1 {
        return Err(LedgerError::ConcurrentModification {
            entity: "account",
            id: account_id,
        });
    }
    Ok(next)
}

// ---------------------------------------------------------------- cards

const CARD_COLUMNS: &str = "id, user_id, name, type, account_id, is_active, credit_limit, \
     auto_transfer_enabled, linked_account_id, balance, monthly_limit, due_day";

fn card_from_row(r: &Row) -> rusqlite::Result<Card> {
    let card_type = parsed_at::<CardType>(r, 3)?;
    let details = match card_type {
        CardType::Credit => CardDetails::Credit {
            credit_limit: opt_parsed_at(r, 6)?.ok_or_else(|| missing_column(6, "credit_limit"))?,
        },
        CardType::Debit => CardDetails::Debit {
            auto_transfer_enabled: r.get(7)?,
            linked_account_id: r.get(8)?,
        },
        CardType::Prepaid => CardDetails::Prepaid {
            balance: opt_parsed_at(r, 9)?.unwrap_or(Decimal::ZERO),
        },
        CardType::Postpay => CardDetails::Postpay {
            monthly_limit: opt_parsed_at(r, 10)?.ok_or_else(|| missing_column(10, "monthly_limit"))?,
            due_day: r
                .get::<_, Option<u32>>(11)?
                .unwrap_or(crate::policy::DEFAULT_POSTPAY_DUE_DAY),
        },
    };
    Ok(Card {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        account_id: r.get(4)?,
        is_active: r.get(5)?,
        details,
    })
}

type CardColumns = (
    Option<String>,
    bool,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<u32>,
);

fn card_columns(details: &CardDetails) -> CardColumns {
    match details {
        CardDetails::Credit { credit_limit } => {
            (Some(credit_limit.to_string()), false, None, None, None, None)
        }
        CardDetails::Debit {
            auto_transfer_enabled,
            linked_account_id,
        } => (None, *auto_transfer_enabled, *linked_account_id, None, None, None),
        CardDetails::Prepaid { balance } => (None, false, None, Some(balance.to_string()), None, None),
        CardDetails::Postpay {
            monthly_limit,
            due_day,
        } => (None, false, None, None, Some(monthly_limit.to_string()), Some(*due_day)),
    }
}

pub fn insert_card(
    conn: &Connection,
    user_id: i64,
    name: &str,
    account_id: i64,
    details: &CardDetails,
) -> LedgerResult<Card> {
    let (credit_limit, auto_transfer, linked, balance, monthly_limit, due_day) = card_columns(details);
    conn.execute(
        "INSERT INTO cards(user_id, name, type, account_id, credit_limit, auto_transfer_enabled,
                           linked_account_id, balance, monthly_limit, due_day)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user_id,
            name,
            details.card_type().as_str(),
            account_id,
            credit_limit,
            auto_transfer,
            linked,
            balance,
            monthly_limit,
            due_day
        ],
    )?;
    get_card(conn, user_id, conn.last_insert_rowid())
}

pub fn get_card(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Card> {
    conn.query_row(
        &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        card_from_row,
    )
    .optional()?
    .ok_or(LedgerError::CardNotFound(id))
}

pub fn list_cards(conn: &Connection, user_id: i64, include_inactive: bool) -> LedgerResult<Vec<Card>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE user_id=?1 AND (is_active=1 OR ?2) ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id, include_inactive], card_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Persists name, activity and type-specific configuration. The prepaid
/// balance is left alone; see [`apply_prepaid_delta`].
pub fn update_card(conn: &Connection, card: &Card) -> LedgerResult<()> {
    let (credit_limit, auto_transfer, linked, _, monthly_limit, due_day) = card_columns(&card.details);
    conn.execute(
        "UPDATE cards SET name=?1, is_active=?2, credit_limit=?3, auto_transfer_enabled=?4,
                          linked_account_id=?5, monthly_limit=?6, due_day=?7
         WHERE id=?8",
        params![
            card.name,
            card.is_active,
            credit_limit,
            auto_transfer,
            linked,
            monthly_limit,
            due_day,
            card.id
        ],
    )?;
    Ok(())
}

pub fn delete_card(conn: &Connection, id: i64) -> LedgerResult<()> {
    conn.execute("DELETE FROM cards WHERE id=?1", params![id])?;
    Ok(())
}

pub fn card_reference_count(conn: &Connection, id: i64) -> LedgerResult<i64> {
    Ok(conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM transactions WHERE card_id=?1)
          + (SELECT COUNT(*) FROM scheduled_transactions WHERE card_id=?1)
          + (SELECT COUNT(*) FROM postpay_payments WHERE card_id=?1)",
        params![id],
        |r| r.get(0),
    )?)
}

/// Compare-and-set update of a prepaid card's own balance.
pub fn apply_prepaid_delta(conn: &Connection, card_id: i64, delta: Decimal) -> LedgerResult<Decimal> {
    let current: Option<String> = conn
        .query_row(
            "SELECT balance FROM cards WHERE id=?1 AND type='PREPAID'",
            params![card_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or(LedgerError::CardNotFound(card_id))?;
    let balance = match &current {
        Some(s) => s
            .parse::<Decimal>()
            .map_err(|e| LedgerError::Corrupt(format!("balance of card {card_id}: {e}")))?,
        None => Decimal::ZERO,
    };
    let next = balance
        .checked_add(delta)
        .ok_or_else(|| LedgerError::InvalidAmount("overflow on card balance".into()))?;
    let changed = conn.execute(
        "UPDATE cards SET balance=?1 WHERE id=?2 AND balance IS ?3",
        params![next.to_string(), card_id, current],
    )?;
    if changed != 1 {
        return Err(LedgerError::ConcurrentModification {
            entity: "card",
            id: card_id,
        });
    }
    Ok(next)
}

/// Net spend on the card with `from <= date <= to`: expenses count up,
/// refunds (INCOME tagged with the card) count down.
pub fn card_net_spend_between(
    conn: &Connection,
    card_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> LedgerResult<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT type, amount FROM transactions
         WHERE card_id=?1 AND type IN ('EXPENSE','INCOME') AND date>=?2 AND date<=?3",
    )?;
    let rows = stmt.query_map(params![card_id, from, to], |r| {
        Ok((parsed_at::<TransactionType>(r, 0)?, parsed_at::<Decimal>(r, 1)?))
    })?;
    let mut total = Decimal::ZERO;
    for row in rows {
        match row? {
            (TransactionType::Expense, amount) => total += amount,
            (_, amount) => total -= amount,
        }
    }
    Ok(total.max(Decimal::ZERO))
}

// ---------------------------------------------------------------- categories

pub fn insert_category(conn: &Connection, user_id: i64, name: &str) -> LedgerResult<Category> {
    conn.execute(
        "INSERT INTO categories(user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        user_id,
        name: name.to_string(),
    })
}

fn category_from_row(r: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
    })
}

pub fn get_category(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Category> {
    conn.query_row(
        "SELECT id, user_id, name FROM categories WHERE id=?1 AND user_id=?2",
        params![id, user_id],
        category_from_row,
    )
    .optional()?
    .ok_or(LedgerError::CategoryNotFound(id))
}

pub fn find_category_by_name(conn: &Connection, user_id: i64, name: &str) -> LedgerResult<Option<Category>> {
    Ok(conn
        .query_row(
            "SELECT id, user_id, name FROM categories WHERE name=?1 AND user_id=?2",
            params![name, user_id],
            category_from_row,
        )
        .optional()?)
}

pub fn list_categories(conn: &Connection, user_id: i64) -> LedgerResult<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, user_id, name FROM categories WHERE user_id=?1 ORDER BY name")?;
    let rows = stmt.query_map(params![user_id], category_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn delete_category(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<()> {
    let changed = conn.execute(
        "DELETE FROM categories WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if changed == 0 {
        return Err(LedgerError::CategoryNotFound(id));
    }
    Ok(())
}

// ---------------------------------------------------------------- transactions

const TRANSACTION_COLUMNS: &str = "id, user_id, account_id, to_account_id, card_id, category_id, \
     scheduled_transaction_id, reverses_id, type, amount, currency, description, date";

fn transaction_from_row(r: &Row) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        account_id: r.get(2)?,
        to_account_id: r.get(3)?,
        card_id: r.get(4)?,
        category_id: r.get(5)?,
        scheduled_transaction_id: r.get(6)?,
        reverses_id: r.get(7)?,
        kind: parsed_at::<TransactionType>(r, 8)?,
        amount: Money::from_parts(parsed_at(r, 9)?, r.get(10)?),
        description: r.get(11)?,
        date: r.get(12)?,
    })
}

/// Inserts `tx` (its `id` is ignored) and returns it with the assigned id.
pub fn insert_transaction(conn: &Connection, mut tx: Transaction) -> LedgerResult<Transaction> {
    conn.execute(
        "INSERT INTO transactions(user_id, account_id, to_account_id, card_id, category_id,
                                  scheduled_transaction_id, reverses_id, type, amount, currency,
                                  description, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            tx.user_id,
            tx.account_id,
            tx.to_account_id,
            tx.card_id,
            tx.category_id,
            tx.scheduled_transaction_id,
            tx.reverses_id,
            tx.kind.as_str(),
            tx.amount.amount().to_string(),
            tx.amount.currency(),
            tx.description,
            tx.date
        ],
    )?;
    tx.id = conn.last_insert_rowid();
    Ok(tx)
}

pub fn get_transaction(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<Transaction> {
    conn.query_row(
        &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        transaction_from_row,
    )
    .optional()?
    .ok_or(LedgerError::TransactionNotFound(id))
}

pub fn is_reversed(conn: &Connection, id: i64) -> LedgerResult<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "SELECT id FROM transactions WHERE reverses_id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(hit.is_some())
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub month: Option<String>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub kind: Option<TransactionType>,
    pub limit: Option<usize>,
}

pub fn list_transactions(
    conn: &Connection,
    user_id: i64,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id=?");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(Box::new(month.clone()));
    }
    if let Some(acct) = filter.account_id {
        sql.push_str(" AND (account_id=? OR to_account_id=?)");
        params_vec.push(Box::new(acct));
        params_vec.push(Box::new(acct));
    }
    if let Some(cat) = filter.category_id {
        sql.push_str(" AND category_id=?");
        params_vec.push(Box::new(cat));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND type=?");
        params_vec.push(Box::new(kind.as_str()));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
        transaction_from_row,
    )?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------- scheduled transactions

const SCHEDULED_COLUMNS: &str = "id, user_id, account_id, to_account_id, card_id, category_id, \
     type, amount, currency, description, due_date, frequency, is_recurring, end_date, status";

/// Row image kept close to the table so that an unknown frequency surfaces
/// as `UnsupportedFrequency` rather than a storage error.
struct ScheduledRow {
    id: i64,
    user_id: i64,
    account_id: i64,
    to_account_id: Option<i64>,
    card_id: Option<i64>,
    category_id: Option<i64>,
    kind: String,
    amount: String,
    currency: String,
    description: String,
    due_date: NaiveDate,
    frequency: Option<String>,
    is_recurring: bool,
    end_date: Option<NaiveDate>,
    status: String,
}

impl ScheduledRow {
    fn from_row(r: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            user_id: r.get(1)?,
            account_id: r.get(2)?,
            to_account_id: r.get(3)?,
            card_id: r.get(4)?,
            category_id: r.get(5)?,
            kind: r.get(6)?,
            amount: r.get(7)?,
            currency: r.get(8)?,
            description: r.get(9)?,
            due_date: r.get(10)?,
            frequency: r.get(11)?,
            is_recurring: r.get(12)?,
            end_date: r.get(13)?,
            status: r.get(14)?,
        })
    }

    fn into_model(self) -> LedgerResult<ScheduledTransaction> {
        let amount = self
            .amount
            .parse::<Decimal>()
            .map_err(|e| LedgerError::Corrupt(format!("amount of scheduled transaction {}: {e}", self.id)))?;
        Ok(ScheduledTransaction {
            id: self.id,
            user_id: self.user_id,
            account_id: self.account_id,
            to_account_id: self.to_account_id,
            card_id: self.card_id,
            category_id: self.category_id,
            kind: self.kind.parse()?,
            amount: Money::from_parts(amount, self.currency),
            description: self.description,
            due_date: self.due_date,
            frequency: self.frequency.as_deref().map(Frequency::from_str).transpose()?,
            is_recurring: self.is_recurring,
            end_date: self.end_date,
            status: self.status.parse()?,
        })
    }
}

pub fn insert_scheduled(conn: &Connection, mut st: ScheduledTransaction) -> LedgerResult<ScheduledTransaction> {
    conn.execute(
        "INSERT INTO scheduled_transactions(user_id, account_id, to_account_id, card_id, category_id,
                                            type, amount, currency, description, due_date, frequency,
                                            is_recurring, end_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            st.user_id,
            st.account_id,
            st.to_account_id,
            st.card_id,
            st.category_id,
            st.kind.as_str(),
            st.amount.amount().to_string(),
            st.amount.currency(),
            st.description,
            st.due_date,
            st.frequency.map(|f| f.as_str()),
            st.is_recurring,
            st.end_date,
            st.status.as_str()
        ],
    )?;
    st.id = conn.last_insert_rowid();
    Ok(st)
}

pub fn get_scheduled(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<ScheduledTransaction> {
    conn.query_row(
        &format!("SELECT {SCHEDULED_COLUMNS} FROM scheduled_transactions WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        ScheduledRow::from_row,
    )
    .optional()?
    .ok_or(LedgerError::ScheduledTransactionNotFound(id))?
    .into_model()
}

pub fn list_scheduled(
    conn: &Connection,
    user_id: i64,
    status: Option<ScheduleStatus>,
) -> LedgerResult<Vec<ScheduledTransaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SCHEDULED_COLUMNS} FROM scheduled_transactions
         WHERE user_id=?1 AND (?2 IS NULL OR status=?2) ORDER BY due_date, id"
    ))?;
    let rows = stmt.query_map(params![user_id, status.map(|s| s.as_str())], ScheduledRow::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_model()?);
    }
    Ok(out)
}

/// Moves a schedule from `from` to `to`; false when it was not in `from`.
pub fn transition_scheduled(
    conn: &Connection,
    id: i64,
    from: ScheduleStatus,
    to: ScheduleStatus,
) -> LedgerResult<bool> {
    let changed = conn.execute(
        "UPDATE scheduled_transactions SET status=?1 WHERE id=?2 AND status=?3",
        params![to.as_str(), id, from.as_str()],
    )?;
    Ok(changed == 1)
}

// ---------------------------------------------------------------- postpay

pub fn insert_postpay_payment(
    conn: &Connection,
    card_id: i64,
    transaction_id: i64,
    amount: &Money,
    due_date: NaiveDate,
) -> LedgerResult<PostpayPayment> {
    conn.execute(
        "INSERT INTO postpay_payments(card_id, transaction_id, amount, currency, due_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            card_id,
            transaction_id,
            amount.amount().to_string(),
            amount.currency(),
            due_date
        ],
    )?;
    Ok(PostpayPayment {
        id: conn.last_insert_rowid(),
        card_id,
        transaction_id,
        amount: amount.clone(),
        due_date,
    })
}

/// Open obligations of one cycle; payments whose transaction was reversed
/// no longer count.
pub fn list_postpay_payments(
    conn: &Connection,
    card_id: i64,
    due_date: NaiveDate,
) -> LedgerResult<Vec<PostpayPayment>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.card_id, p.transaction_id, p.amount, p.currency, p.due_date
         FROM postpay_payments p
         LEFT JOIN transactions r ON r.reverses_id = p.transaction_id
         WHERE p.card_id=?1 AND p.due_date=?2 AND r.id IS NULL
         ORDER BY p.id",
    )?;
    let rows = stmt.query_map(params![card_id, due_date], |r| {
        Ok(PostpayPayment {
            id: r.get(0)?,
            card_id: r.get(1)?,
            transaction_id: r.get(2)?,
            amount: Money::from_parts(parsed_at(r, 3)?, r.get(4)?),
            due_date: r.get(5)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------- exchange rates

pub fn insert_rate(conn: &Connection, entry: &ExchangeRateEntry) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO fx_rates(from_currency, to_currency, rate, observed_at, source)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(from_currency, to_currency, observed_at)
         DO UPDATE SET rate=excluded.rate, source=excluded.source",
        params![
            entry.from_currency,
            entry.to_currency,
            entry.rate.to_string(),
            entry.observed_at,
            entry.source
        ],
    )?;
    Ok(())
}

/// Every stored rate record; the rate table keeps the latest per pair.
pub fn load_rates(conn: &Connection) -> LedgerResult<Vec<ExchangeRateEntry>> {
    let mut stmt = conn.prepare(
        "SELECT from_currency, to_currency, rate, observed_at, source FROM fx_rates ORDER BY observed_at",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(ExchangeRateEntry {
            from_currency: r.get(0)?,
            to_currency: r.get(1)?,
            rate: parsed_at(r, 2)?,
            observed_at: r.get::<_, DateTime<Utc>>(3)?,
            source: r.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------- budgets

pub fn upsert_budget(
    conn: &Connection,
    user_id: i64,
    month: &str,
    category_id: i64,
    amount: &Money,
) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO budgets(user_id, month, category_id, amount, currency) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, month, category_id)
         DO UPDATE SET amount=excluded.amount, currency=excluded.currency",
        params![
            user_id,
            month,
            category_id,
            amount.amount().to_string(),
            amount.currency()
        ],
    )?;
    Ok(())
}

pub fn list_budgets(conn: &Connection, user_id: i64, month: Option<&str>) -> LedgerResult<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, month, category_id, amount, currency FROM budgets
         WHERE user_id=?1 AND (?2 IS NULL OR month=?2) ORDER BY month DESC, category_id",
    )?;
    let rows = stmt.query_map(params![user_id, month], |r| {
        Ok(Budget {
            id: r.get(0)?,
            user_id: r.get(1)?,
            month: r.get(2)?,
            category_id: r.get(3)?,
            amount: Money::from_parts(parsed_at(r, 4)?, r.get(5)?),
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
