// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use hearthbook::models::{AccountDraft, AccountType, AuthenticatedUser, NewTransaction, TransactionType};
use hearthbook::store::TransactionFilter;
use hearthbook::{cli, commands::exporter, db, ledger, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> (Connection, AuthenticatedUser) {
    let mut conn = db::open_in_memory().unwrap();
    let user = store::insert_user(&conn, "alex@example.com", "USD").unwrap();
    let acct = ledger::create_account(
        &mut conn,
        &user,
        AccountDraft {
            name: "Checking".into(),
            kind: AccountType::Checking,
            currency: "USD".into(),
            opening_balance: Some(dec!(100)),
            rate: None,
            maturity: None,
        },
    )
    .unwrap();
    let groceries = store::insert_category(&conn, user.id, "Groceries").unwrap();
    for (day, amount, description) in [(2, dec!(12.34), "Weekly run"), (9, dec!(20), "Top-up")] {
        ledger::record_transaction(
            &mut conn,
            &user,
            NewTransaction {
                account_id: acct.id,
                to_account_id: None,
                card_id: None,
                category_id: Some(groceries.id),
                kind: TransactionType::Expense,
                amount,
                currency: "USD".into(),
                description: description.into(),
                date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            },
        )
        .unwrap();
    }
    (conn, user)
}

#[test]
fn export_transactions_writes_pretty_json_oldest_first() {
    let (conn, user) = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "hearthbook",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, &user, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(
        parsed[0],
        json!({
            "id": 1,
            "date": "2025-01-02",
            "type": "EXPENSE",
            "account": "Checking",
            "to_account": "",
            "amount": "12.34",
            "currency": "USD",
            "category": "Groceries",
            "card_id": null,
            "reverses_id": null,
            "description": "Weekly run"
        })
    );
    assert_eq!(parsed[1]["description"], "Top-up");
}

#[test]
fn export_transactions_writes_csv_with_header() {
    let (conn, user) = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");

    let count = exporter::export_transactions(
        &conn,
        &user,
        "csv",
        &out_path,
        &TransactionFilter::default(),
    )
    .unwrap();
    assert_eq!(count, 2);

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[2], "type");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "2025-01-02");
    assert_eq!(&records[1][5], "20");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let (conn, user) = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");

    let result = exporter::export_transactions(
        &conn,
        &user,
        "xml",
        &out_path,
        &TransactionFilter::default(),
    );
    assert!(result.is_err());
    assert!(!out_path.exists());
}

#[test]
fn export_respects_month_filter() {
    let (conn, user) = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("feb.json");
    let filter = TransactionFilter {
        month: Some("2025-02".into()),
        ..Default::default()
    };
    let count = exporter::export_transactions(&conn, &user, "json", &out_path, &filter).unwrap();
    assert_eq!(count, 0);
    assert_eq!(std::fs::read_to_string(&out_path).unwrap().trim(), "[]");
}
