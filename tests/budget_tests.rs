// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, TimeZone, Utc};
use hearthbook::models::{Account, AccountDraft, AccountType, AuthenticatedUser, NewTransaction, TransactionType};
use hearthbook::rates::ExchangeRateEntry;
use hearthbook::{Money, commands::budgets, db, ledger, store};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, AuthenticatedUser, i64) {
    let conn = db::open_in_memory().unwrap();
    let user = store::insert_user(&conn, "robin@example.com", "USD").unwrap();
    let dining = store::insert_category(&conn, user.id, "Dining").unwrap();
    store::upsert_budget(
        &conn,
        user.id,
        "2025-08",
        dining.id,
        &Money::new(dec!(50), "USD").unwrap(),
    )
    .unwrap();
    let observed = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
    store::insert_rate(
        &conn,
        &ExchangeRateEntry::new("EUR", "USD", dec!(1.25), observed, "manual").unwrap(),
    )
    .unwrap();
    (conn, user, dining.id)
}

fn account(conn: &mut Connection, user: &AuthenticatedUser, name: &str, ccy: &str) -> Account {
    ledger::create_account(
        conn,
        user,
        AccountDraft {
            name: name.into(),
            kind: AccountType::Checking,
            currency: ccy.into(),
            opening_balance: Some(dec!(1000)),
            rate: None,
            maturity: None,
        },
    )
    .unwrap()
}

fn spend(
    conn: &mut Connection,
    user: &AuthenticatedUser,
    acct: &Account,
    category: i64,
    amount: Decimal,
    day: u32,
) -> i64 {
    ledger::record_transaction(
        conn,
        user,
        NewTransaction {
            account_id: acct.id,
            to_account_id: None,
            card_id: None,
            category_id: Some(category),
            kind: TransactionType::Expense,
            amount,
            currency: acct.currency.clone(),
            description: "Dinner".into(),
            date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
        },
    )
    .unwrap()
    .id
}

#[test]
fn budget_report_converts_spend_into_base() {
    let (mut conn, user, dining) = setup();
    let usd = account(&mut conn, &user, "Checking", "USD");
    let eur = account(&mut conn, &user, "Euro", "EUR");
    spend(&mut conn, &user, &usd, dining, dec!(2.50), 3);
    spend(&mut conn, &user, &eur, dining, dec!(18), 4);

    let report = budgets::budget_report(&conn, &user, "2025-08").unwrap();
    assert_eq!(report.lines.len(), 1);
    let line = &report.lines[0];
    assert_eq!(line.category, "Dining");
    assert_eq!(line.spent.amount(), dec!(25));
    assert_eq!(line.spent.currency(), "USD");
    assert_eq!(line.used_pct, Some(dec!(50)));
    assert!(report.skipped.is_empty());
}

#[test]
fn spend_in_unrated_currency_is_reported_as_skipped() {
    let (mut conn, user, dining) = setup();
    let usd = account(&mut conn, &user, "Checking", "USD");
    let yen = account(&mut conn, &user, "Yen", "JPY");
    spend(&mut conn, &user, &usd, dining, dec!(10), 5);
    spend(&mut conn, &user, &yen, dining, dec!(3000), 6);

    let report = budgets::budget_report(&conn, &user, "2025-08").unwrap();
    assert_eq!(report.lines[0].spent.amount(), dec!(10));
    assert_eq!(report.lines[0].used_pct, Some(dec!(20)));
    assert!(report.skipped.contains("JPY"));
}

#[test]
fn reversed_expenses_no_longer_count() {
    let (mut conn, user, dining) = setup();
    let usd = account(&mut conn, &user, "Checking", "USD");
    spend(&mut conn, &user, &usd, dining, dec!(20), 7);
    let refunded = spend(&mut conn, &user, &usd, dining, dec!(15), 8);
    ledger::reverse_transaction(&mut conn, &user, refunded, NaiveDate::from_ymd_opt(2025, 8, 9).unwrap())
        .unwrap();

    let report = budgets::budget_report(&conn, &user, "2025-08").unwrap();
    assert_eq!(report.lines[0].spent.amount(), dec!(20));
    assert_eq!(report.lines[0].used_pct, Some(dec!(40)));
}

#[test]
fn other_months_are_not_reported() {
    let (conn, user, _) = setup();
    let report = budgets::budget_report(&conn, &user, "2025-09").unwrap();
    assert!(report.lines.is_empty());
    assert_eq!(report.month, "2025-09");
}

#[test]
fn reversed_income_is_not_category_spend() {
    let (mut conn, user, dining) = setup();
    let usd = account(&mut conn, &user, "Checking", "USD");
    spend(&mut conn, &user, &usd, dining, dec!(5), 2);
    let refund = ledger::record_transaction(
        &mut conn,
        &user,
        NewTransaction {
            account_id: usd.id,
            to_account_id: None,
            card_id: None,
            category_id: Some(dining),
            kind: TransactionType::Income,
            amount: dec!(30),
            currency: "USD".into(),
            description: "Voucher".into(),
            date: NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
        },
    )
    .unwrap();
    ledger::reverse_transaction(&mut conn, &user, refund.id, NaiveDate::from_ymd_opt(2025, 8, 4).unwrap())
        .unwrap();

    let report = budgets::budget_report(&conn, &user, "2025-08").unwrap();
    assert_eq!(report.lines[0].spent.amount(), dec!(5));
    assert_eq!(report.lines[0].used_pct, Some(dec!(10)));
}
