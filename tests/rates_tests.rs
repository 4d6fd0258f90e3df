// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, TimeZone, Utc};
use hearthbook::conversion::CurrencyConverter;
use hearthbook::rates::{ExchangeRateEntry, RateTable};
use hearthbook::{LedgerError, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
}

fn entry(from: &str, to: &str, rate: Decimal, day: u32) -> ExchangeRateEntry {
    ExchangeRateEntry::new(from, to, rate, at(day), "test").unwrap()
}

fn usd(v: Decimal) -> Money {
    Money::new(v, "USD").unwrap()
}

#[test]
fn reciprocal_rates_multiply_to_one() {
    let mut table = RateTable::new();
    table
        .update_rates(vec![
            entry("USD", "EUR", dec!(0.9), 1),
            entry("GBP", "JPY", dec!(191.37), 1),
            entry("USD", "INR", dec!(83.125), 1),
        ])
        .unwrap();
    let tolerance = dec!(0.000000000000000001);
    for (a, b) in [("USD", "EUR"), ("GBP", "JPY"), ("USD", "INR")] {
        let product = table.get_rate(a, b).unwrap() * table.get_rate(b, a).unwrap();
        assert!((product - Decimal::ONE).abs() < tolerance, "{a}/{b}: {product}");
    }
    assert_eq!(table.len(), 6);
}

#[test]
fn same_currency_rate_is_one_even_when_empty() {
    let table = RateTable::new();
    assert_eq!(table.get_rate("CHF", "CHF"), Some(Decimal::ONE));
    assert_eq!(table.get_rate("CHF", "USD"), None);
    assert!(table.is_empty());
}

#[test]
fn latest_observation_wins_per_pair() {
    let table = RateTable::from_entries(vec![
        entry("USD", "EUR", dec!(0.95), 5),
        entry("USD", "EUR", dec!(0.90), 1),
        entry("EUR", "USD", dec!(1.25), 3),
    ])
    .unwrap();
    assert_eq!(table.get_rate("USD", "EUR"), Some(dec!(0.95)));
    assert_eq!(table.entry("EUR", "USD").unwrap().observed_at, at(5));
}

#[test]
fn update_replaces_the_whole_table() {
    let mut table = RateTable::from_entries(vec![entry("USD", "EUR", dec!(0.9), 1)]).unwrap();
    table
        .update_rates(vec![entry("USD", "GBP", dec!(0.8), 2)])
        .unwrap();
    assert!(!table.has_rate("USD", "EUR"));
    assert!(table.has_rate("GBP", "USD"));
}

#[test]
fn non_positive_rate_rejects_batch_and_keeps_table() {
    let mut table = RateTable::from_entries(vec![entry("USD", "EUR", dec!(0.9), 1)]).unwrap();
    let bad = ExchangeRateEntry {
        from_currency: "USD".into(),
        to_currency: "GBP".into(),
        rate: dec!(0),
        observed_at: at(2),
        source: "test".into(),
    };
    let err = table
        .update_rates(vec![entry("USD", "JPY", dec!(150), 2), bad])
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidExchangeRate { .. }));
    assert_eq!(table.get_rate("USD", "EUR"), Some(dec!(0.9)));
    assert!(!table.has_rate("USD", "JPY"));

    assert!(ExchangeRateEntry::new("USD", "EUR", dec!(-1), at(1), "x").is_err());
}

#[test]
fn sum_skips_currencies_without_a_rate() {
    let table = RateTable::from_entries(vec![entry("USD", "JPY", dec!(150), 1)]).unwrap();
    let converter = CurrencyConverter::new(&table);
    let amounts = vec![usd(dec!(100)), Money::new(dec!(50), "EUR").unwrap()];

    let agg = converter.sum(&amounts, "JPY").unwrap();
    assert_eq!(agg.total.currency(), "JPY");
    assert_eq!(agg.total.amount(), dec!(15000));
    assert!(!agg.is_complete());
    assert_eq!(agg.skipped.iter().collect::<Vec<_>>(), vec!["EUR"]);
}

#[test]
fn sum_of_nothing_is_zero_in_base() {
    let table = RateTable::new();
    let agg = CurrencyConverter::new(&table).sum(&[], "usd").unwrap();
    assert!(agg.total.is_zero());
    assert_eq!(agg.total.currency(), "USD");
    assert!(agg.is_complete());
}

#[test]
fn sort_by_value_ranks_in_base_and_falls_back_to_raw_magnitude() {
    let table = RateTable::from_entries(vec![entry("EUR", "USD", dec!(1.10), 1)]).unwrap();
    let converter = CurrencyConverter::new(&table);
    let amounts = vec![
        usd(dec!(100)),
        Money::new(dec!(95), "EUR").unwrap(),  // 104.50 USD
        Money::new(dec!(102), "CHF").unwrap(), // no rate, ranks as 102
        usd(dec!(5)),
    ];
    let ranked = converter.sort_by_value(amounts, "USD").unwrap();
    let order: Vec<String> = ranked.items.iter().map(|m| m.to_string()).collect();
    assert_eq!(order, vec!["95 EUR", "102 CHF", "100 USD", "5 USD"]);
    assert!(ranked.skipped.contains("CHF"));
}

#[test]
fn percentage_converts_part_into_total_currency() {
    let table = RateTable::from_entries(vec![entry("EUR", "USD", dec!(1.25), 1)]).unwrap();
    let converter = CurrencyConverter::new(&table);
    let part = Money::new(dec!(20), "EUR").unwrap();
    assert_eq!(converter.percentage(&part, &usd(dec!(100))).unwrap(), dec!(25));
    assert_eq!(converter.percentage(&part, &usd(dec!(0))).unwrap(), dec!(0));
}

#[test]
fn percentage_without_rate_fails() {
    let table = RateTable::new();
    let converter = CurrencyConverter::new(&table);
    let part = Money::new(dec!(100), "JPY").unwrap();
    let err = converter.percentage(&part, &usd(dec!(100))).unwrap_err();
    assert!(matches!(err, LedgerError::MissingExchangeRate { .. }));
}

#[test]
fn percentage_reports_overflow_instead_of_panicking() {
    let table = RateTable::new();
    let converter = CurrencyConverter::new(&table);
    let huge = usd(dec!(1000000000000000000000000000));
    let err = converter.percentage(&huge, &usd(dec!(1))).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount(ref m) if m.contains("overflow")));
    assert_eq!(err.status_code(), 400);
}
