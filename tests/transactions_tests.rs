// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use hearthbook::models::{AccountDraft, AccountType, AuthenticatedUser, NewTransaction, TransactionType};
use hearthbook::{cli, commands::transactions, db, ledger, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> (Connection, AuthenticatedUser) {
    let mut conn = db::open_in_memory().unwrap();
    let user = store::insert_user(&conn, "pat@example.com", "USD").unwrap();
    let acct = ledger::create_account(
        &mut conn,
        &user,
        AccountDraft {
            name: "A1".into(),
            kind: AccountType::Checking,
            currency: "USD".into(),
            opening_balance: Some(dec!(100)),
            rate: None,
            maturity: None,
        },
    )
    .unwrap();
    let food = store::insert_category(&conn, user.id, "Cat1").unwrap();
    for day in 1..=3 {
        ledger::record_transaction(
            &mut conn,
            &user,
            NewTransaction {
                account_id: acct.id,
                to_account_id: None,
                card_id: None,
                category_id: Some(food.id),
                kind: TransactionType::Expense,
                amount: dec!(10),
                currency: "USD".into(),
                description: format!("P{day}"),
                date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            },
        )
        .unwrap();
    }
    ledger::record_transaction(
        &mut conn,
        &user,
        NewTransaction {
            account_id: acct.id,
            to_account_id: None,
            card_id: None,
            category_id: None,
            kind: TransactionType::Income,
            amount: dec!(500),
            currency: "USD".into(),
            description: "Salary".into(),
            date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        },
    )
    .unwrap();
    (conn, user)
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["hearthbook", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    list_m.clone()
}

#[test]
fn tx_list_limit_returns_latest_first() {
    let (conn, user) = setup();
    let list_m = list_matches(&["--limit", "2"]);
    let rows = transactions::query_rows(&conn, &user, &list_m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-02-01");
    assert_eq!(rows[0].kind, "INCOME");
    assert_eq!(rows[1].date, "2025-01-03");
    assert_eq!(rows[1].account, "A1");
    assert_eq!(rows[1].category, "Cat1");
    assert_eq!(rows[1].amount, "10");
}

#[test]
fn tx_list_filters_by_month_category_and_type() {
    let (conn, user) = setup();

    let rows = transactions::query_rows(&conn, &user, &list_matches(&["--month", "2025-01"])).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.date.starts_with("2025-01")));

    let rows = transactions::query_rows(&conn, &user, &list_matches(&["--category", "Cat1"])).unwrap();
    assert_eq!(rows.len(), 3);

    let rows = transactions::query_rows(&conn, &user, &list_matches(&["--type", "income"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Salary");
}

#[test]
fn tx_list_rejects_unknown_account_name() {
    let (conn, user) = setup();
    assert!(transactions::query_rows(&conn, &user, &list_matches(&["--account", "Nope"])).is_err());
}

#[test]
fn reversal_rows_point_back_at_the_original() {
    let (mut conn, user) = setup();
    let latest = store::list_transactions(&conn, user.id, &Default::default()).unwrap();
    let salary = latest.first().unwrap().id;
    ledger::reverse_transaction(&mut conn, &user, salary, NaiveDate::from_ymd_opt(2025, 2, 2).unwrap())
        .unwrap();

    let rows = transactions::query_rows(&conn, &user, &list_matches(&["--limit", "1"])).unwrap();
    assert_eq!(rows[0].kind, "EXPENSE");
    assert_eq!(rows[0].reverses_id, Some(salary));
}
