// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use hearthbook::ledger::{self, CardPaymentRequest};
use hearthbook::models::{
    Account, AccountDraft, AccountType, AuthenticatedUser, Card, CardDetails, CardDraft, CardPatch,
    CardType, Removal, TransactionType,
};
use hearthbook::{LedgerError, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> (Connection, AuthenticatedUser) {
    let conn = db::open_in_memory().unwrap();
    let user = store::insert_user(&conn, "robin@example.com", "USD").unwrap();
    (conn, user)
}

fn open(conn: &mut Connection, user: &AuthenticatedUser, name: &str, opening: Decimal) -> Account {
    ledger::create_account(
        conn,
        user,
        AccountDraft {
            name: name.into(),
            kind: AccountType::Checking,
            currency: "USD".into(),
            opening_balance: Some(opening),
            rate: None,
            maturity: None,
        },
    )
    .unwrap()
}

fn issue(conn: &mut Connection, user: &AuthenticatedUser, draft: CardDraft) -> Card {
    ledger::create_card(conn, user, draft).unwrap()
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn payment(card_id: i64, amount: Decimal, on: NaiveDate) -> CardPaymentRequest {
    CardPaymentRequest {
        card_id,
        amount,
        currency: "USD".into(),
        description: "groceries".into(),
        category_id: None,
        date: on,
    }
}

fn balance(conn: &Connection, user: &AuthenticatedUser, id: i64) -> Decimal {
    store::get_account(conn, user.id, id).unwrap().balance.amount()
}

fn prepaid_balance(conn: &Connection, user: &AuthenticatedUser, id: i64) -> Decimal {
    match store::get_card(conn, user.id, id).unwrap().details {
        CardDetails::Prepaid { balance } => balance,
        other => panic!("not prepaid: {other:?}"),
    }
}

#[test]
fn prepaid_charge_of_full_balance_leaves_zero() {
    let (mut conn, user) = setup();
    let source = open(&mut conn, &user, "Checking", dec!(100.00));
    let wallet = open(&mut conn, &user, "Wallet", dec!(0));
    let card = issue(&mut conn, &user, CardDraft::new(CardType::Prepaid, "Transit", wallet.id));

    let charge =
        ledger::charge_prepaid_card(&mut conn, &user, card.id, dec!(100.00), source.id, date(4, 1))
            .unwrap();
    assert_eq!(charge.card_balance, dec!(100.00));
    assert!(charge.source_balance.is_zero());
    assert_eq!(balance(&conn, &user, source.id), dec!(0));
    assert_eq!(prepaid_balance(&conn, &user, card.id), dec!(100));
    assert_eq!(charge.transaction.kind, TransactionType::Expense);
    assert_eq!(charge.transaction.card_id, Some(card.id));
}

#[test]
fn prepaid_charge_over_balance_changes_nothing() {
    let (mut conn, user) = setup();
    let source = open(&mut conn, &user, "Checking", dec!(100.00));
    let wallet = open(&mut conn, &user, "Wallet", dec!(0));
    let card = issue(&mut conn, &user, CardDraft::new(CardType::Prepaid, "Transit", wallet.id));

    let err =
        ledger::charge_prepaid_card(&mut conn, &user, card.id, dec!(100.01), source.id, date(4, 1))
            .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(err.status_code(), 409);
    assert_eq!(balance(&conn, &user, source.id), dec!(100.00));
    assert_eq!(prepaid_balance(&conn, &user, card.id), dec!(0));
    assert!(store::list_transactions(&conn, user.id, &Default::default())
        .unwrap()
        .is_empty());
}

#[test]
fn reversing_prepaid_charge_takes_it_back_off_the_card() {
    let (mut conn, user) = setup();
    let source = open(&mut conn, &user, "Checking", dec!(100));
    let wallet = open(&mut conn, &user, "Wallet", dec!(0));
    let card = issue(&mut conn, &user, CardDraft::new(CardType::Prepaid, "Transit", wallet.id));
    let charge =
        ledger::charge_prepaid_card(&mut conn, &user, card.id, dec!(100), source.id, date(4, 1))
            .unwrap();

    ledger::reverse_transaction(&mut conn, &user, charge.transaction.id, date(4, 2)).unwrap();
    assert_eq!(balance(&conn, &user, source.id), dec!(100));
    assert_eq!(prepaid_balance(&conn, &user, card.id), dec!(0));
    assert_eq!(
        balance(&conn, &user, source.id) + prepaid_balance(&conn, &user, card.id),
        dec!(100)
    );
}

#[test]
fn prepaid_charge_reversal_needs_the_money_still_on_the_card() {
    let (mut conn, user) = setup();
    let source = open(&mut conn, &user, "Checking", dec!(100));
    let wallet = open(&mut conn, &user, "Wallet", dec!(0));
    let card = issue(&mut conn, &user, CardDraft::new(CardType::Prepaid, "Transit", wallet.id));
    let charge =
        ledger::charge_prepaid_card(&mut conn, &user, card.id, dec!(100), source.id, date(4, 1))
            .unwrap();
    // 60 of the load already spent off-ledger
    store::apply_prepaid_delta(&conn, card.id, dec!(-60)).unwrap();

    let err = ledger::reverse_transaction(&mut conn, &user, charge.transaction.id, date(4, 2))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(balance(&conn, &user, source.id), dec!(0));
    assert_eq!(prepaid_balance(&conn, &user, card.id), dec!(40));
    assert!(!store::is_reversed(&conn, charge.transaction.id).unwrap());
}

#[test]
fn prepaid_charge_preconditions() {
    let (mut conn, user) = setup();
    let source = open(&mut conn, &user, "Checking", dec!(50));
    let wallet = open(&mut conn, &user, "Wallet", dec!(0));
    let prepaid = issue(&mut conn, &user, CardDraft::new(CardType::Prepaid, "Gift", wallet.id));
    let debit = issue(&mut conn, &user, CardDraft::new(CardType::Debit, "Debit", source.id));

    assert!(matches!(
        ledger::charge_prepaid_card(&mut conn, &user, debit.id, dec!(5), wallet.id, date(4, 1)),
        Err(LedgerError::WrongCardType { .. })
    ));
    assert!(matches!(
        ledger::charge_prepaid_card(&mut conn, &user, prepaid.id, dec!(5), wallet.id, date(4, 1)),
        Err(LedgerError::InvalidInput(_))
    ));
    assert!(matches!(
        ledger::charge_prepaid_card(&mut conn, &user, prepaid.id, dec!(0), source.id, date(4, 1)),
        Err(LedgerError::InvalidAmount(_))
    ));
    assert!(matches!(
        ledger::charge_prepaid_card(&mut conn, &user, 77, dec!(5), source.id, date(4, 1)),
        Err(LedgerError::CardNotFound(77))
    ));
}

#[test]
fn credit_card_stays_within_monthly_limit() {
    let (mut conn, user) = setup();
    let acct = open(&mut conn, &user, "Checking", dec!(1000));
    let mut draft = CardDraft::new(CardType::Credit, "Visa", acct.id);
    draft.credit_limit = Some(dec!(500));
    let card = issue(&mut conn, &user, draft);

    ledger::pay_card(&mut conn, &user, payment(card.id, dec!(300), date(4, 10))).unwrap();
    let available = ledger::credit_available(&conn, &user, card.id, date(4, 20)).unwrap();
    assert_eq!(available.amount(), dec!(200));

    let err = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(250), date(4, 11))).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::LimitExceeded { available, requested, .. }
            if available == dec!(200) && requested == dec!(250)
    ));
    assert_eq!(balance(&conn, &user, acct.id), dec!(700));

    // a new month starts from the full limit
    ledger::pay_card(&mut conn, &user, payment(card.id, dec!(250), date(5, 1))).unwrap();
    assert_eq!(balance(&conn, &user, acct.id), dec!(450));
    assert_eq!(
        ledger::credit_available(&conn, &user, card.id, date(5, 2))
            .unwrap()
            .amount(),
        dec!(250)
    );
}

#[test]
fn debit_auto_transfer_covers_shortfall() {
    let (mut conn, user) = setup();
    let checking = open(&mut conn, &user, "Checking", dec!(30));
    let savings = open(&mut conn, &user, "Savings", dec!(100));
    let mut draft = CardDraft::new(CardType::Debit, "Debit", checking.id);
    draft.auto_transfer_enabled = true;
    draft.linked_account_id = Some(savings.id);
    let card = issue(&mut conn, &user, draft);

    let paid = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(50), date(4, 3))).unwrap();
    let top_up = paid.top_up.expect("shortfall transfer");
    assert_eq!(top_up.kind, TransactionType::Transfer);
    assert_eq!(top_up.amount.amount(), dec!(20));
    assert_eq!(balance(&conn, &user, checking.id), dec!(0));
    assert_eq!(balance(&conn, &user, savings.id), dec!(80));

    let err = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(200), date(4, 4))).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(balance(&conn, &user, checking.id), dec!(0));
    assert_eq!(balance(&conn, &user, savings.id), dec!(80));

    let covered = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(0.5), date(4, 5))).unwrap();
    assert_eq!(covered.top_up.unwrap().amount.amount(), dec!(0.5));
}

#[test]
fn plain_debit_card_may_overdraw() {
    let (mut conn, user) = setup();
    let checking = open(&mut conn, &user, "Checking", dec!(10));
    let card = issue(&mut conn, &user, CardDraft::new(CardType::Debit, "Debit", checking.id));
    let paid = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(25), date(4, 3))).unwrap();
    assert!(paid.top_up.is_none());
    assert_eq!(balance(&conn, &user, checking.id), dec!(-15));
}

#[test]
fn postpay_payments_group_into_due_cycles() {
    let (mut conn, user) = setup();
    let acct = open(&mut conn, &user, "Checking", dec!(1000));
    let mut draft = CardDraft::new(CardType::Postpay, "Later", acct.id);
    draft.monthly_limit = Some(dec!(300));
    draft.due_day = Some(10);
    let card = issue(&mut conn, &user, draft);

    let first = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(100), date(4, 5))).unwrap();
    assert_eq!(first.postpay.unwrap().due_date, date(4, 10));
    ledger::pay_card(&mut conn, &user, payment(card.id, dec!(150), date(4, 8))).unwrap();

    let err = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(100), date(4, 9))).unwrap_err();
    assert!(matches!(err, LedgerError::LimitExceeded { available, .. } if available == dec!(50)));

    let later = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(100), date(4, 11))).unwrap();
    assert_eq!(later.postpay.unwrap().due_date, date(5, 10));

    let cycle = ledger::postpay_cycle(&conn, &user, card.id, date(4, 1)).unwrap();
    assert_eq!(cycle.due_date, date(4, 10));
    assert_eq!(cycle.payments.len(), 2);
    assert_eq!(cycle.total.amount(), dec!(250));
    assert_eq!(cycle.remaining.amount(), dec!(50));
    assert_eq!(balance(&conn, &user, acct.id), dec!(650));
}

#[test]
fn reversed_postpay_payment_frees_the_cycle_limit() {
    let (mut conn, user) = setup();
    let acct = open(&mut conn, &user, "Checking", dec!(1000));
    let mut draft = CardDraft::new(CardType::Postpay, "Later", acct.id);
    draft.monthly_limit = Some(dec!(300));
    draft.due_day = Some(10);
    let card = issue(&mut conn, &user, draft);

    let paid = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(300), date(4, 5))).unwrap();
    ledger::reverse_transaction(&mut conn, &user, paid.transaction.id, date(4, 6)).unwrap();

    let cycle = ledger::postpay_cycle(&conn, &user, card.id, date(4, 6)).unwrap();
    assert!(cycle.payments.is_empty());
    assert!(cycle.total.is_zero());
    assert_eq!(cycle.remaining.amount(), dec!(300));

    let again = ledger::pay_card(&mut conn, &user, payment(card.id, dec!(100), date(4, 7))).unwrap();
    assert_eq!(again.postpay.unwrap().due_date, date(4, 10));
    assert_eq!(balance(&conn, &user, acct.id), dec!(900));
}

#[test]
fn prepaid_cards_cannot_pay() {
    let (mut conn, user) = setup();
    let acct = open(&mut conn, &user, "Wallet", dec!(10));
    let card = issue(&mut conn, &user, CardDraft::new(CardType::Prepaid, "Gift", acct.id));
    assert!(matches!(
        ledger::pay_card(&mut conn, &user, payment(card.id, dec!(1), date(4, 1))),
        Err(LedgerError::WrongCardType { .. })
    ));
    assert!(matches!(
        ledger::credit_available(&conn, &user, card.id, date(4, 1)),
        Err(LedgerError::WrongCardType { .. })
    ));
}

#[test]
fn card_creation_runs_policy_and_ownership_checks() {
    let (mut conn, user) = setup();
    let other = store::insert_user(&conn, "jo@example.com", "USD").unwrap();
    let mine = open(&mut conn, &user, "Mine", dec!(0));
    let theirs = open(&mut conn, &other, "Theirs", dec!(0));

    let err = ledger::create_card(&mut conn, &user, CardDraft::new(CardType::Credit, "Visa", mine.id))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCardConfiguration { field: "creditLimit", .. }));

    let mut linked = CardDraft::new(CardType::Debit, "Debit", mine.id);
    linked.auto_transfer_enabled = true;
    linked.linked_account_id = Some(theirs.id);
    assert!(matches!(
        ledger::create_card(&mut conn, &user, linked),
        Err(LedgerError::AccountNotFound(_))
    ));

    assert!(matches!(
        ledger::create_card(&mut conn, &user, CardDraft::new(CardType::Debit, "X", theirs.id)),
        Err(LedgerError::AccountNotFound(_))
    ));
}

#[test]
fn card_update_revalidates_merged_fields() {
    let (mut conn, user) = setup();
    let acct = open(&mut conn, &user, "Checking", dec!(0));
    let mut draft = CardDraft::new(CardType::Credit, "Visa", acct.id);
    draft.credit_limit = Some(dec!(500));
    let card = issue(&mut conn, &user, draft);

    let err = ledger::update_card(
        &mut conn,
        &user,
        card.id,
        CardPatch {
            credit_limit: Some(dec!(0)),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCardConfiguration { .. }));

    let updated = ledger::update_card(
        &mut conn,
        &user,
        card.id,
        CardPatch {
            name: Some("Visa Gold".into()),
            credit_limit: Some(dec!(1500)),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(updated.name, "Visa Gold");
    assert_eq!(
        store::get_card(&conn, user.id, card.id).unwrap().details,
        CardDetails::Credit {
            credit_limit: dec!(1500)
        }
    );
}

#[test]
fn card_delete_deactivates_when_used() {
    let (mut conn, user) = setup();
    let acct = open(&mut conn, &user, "Checking", dec!(100));
    let unused = issue(&mut conn, &user, CardDraft::new(CardType::Debit, "Spare", acct.id));
    let used = issue(&mut conn, &user, CardDraft::new(CardType::Debit, "Main", acct.id));
    ledger::pay_card(&mut conn, &user, payment(used.id, dec!(10), date(4, 1))).unwrap();

    assert_eq!(ledger::delete_card(&mut conn, &user, unused.id).unwrap(), Removal::Deleted);
    assert!(matches!(
        store::get_card(&conn, user.id, unused.id),
        Err(LedgerError::CardNotFound(_))
    ));
    assert_eq!(ledger::delete_card(&mut conn, &user, used.id).unwrap(), Removal::Deactivated);
    assert!(!store::get_card(&conn, user.id, used.id).unwrap().is_active);
    assert!(matches!(
        ledger::pay_card(&mut conn, &user, payment(used.id, dec!(1), date(4, 2))),
        Err(LedgerError::InvalidInput(_))
    ));

    // the account now has card history and is kept
    assert_eq!(ledger::delete_account(&mut conn, &user, acct.id).unwrap(), Removal::Deactivated);
}
