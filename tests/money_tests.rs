// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hearthbook::{LedgerError, Money};
use rust_decimal_macros::dec;

#[test]
fn currency_codes_are_normalized_and_validated() {
    let m = Money::new(dec!(10), "usd").unwrap();
    assert_eq!(m.currency(), "USD");

    for bad in ["US", "USDX", "U$D", ""] {
        let err = Money::new(dec!(1), bad).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedCurrency(_)), "{bad}: {err:?}");
    }
}

#[test]
fn same_currency_arithmetic_needs_no_rate() {
    let a = Money::new(dec!(10.25), "EUR").unwrap();
    let b = Money::new(dec!(0.75), "EUR").unwrap();
    assert_eq!(a.add(&b, None).unwrap().amount(), dec!(11.00));
    assert_eq!(a.subtract(&b, None).unwrap().amount(), dec!(9.50));
    assert_eq!(a.multiply(dec!(2)).unwrap().amount(), dec!(20.50));
    assert_eq!(a.divide(dec!(4)).unwrap().amount(), dec!(2.5625));
    assert_eq!(a.negate().amount(), dec!(-10.25));
    assert_eq!(a.negate().abs(), a);
}

#[test]
fn cross_currency_arithmetic_requires_a_positive_rate() {
    let usd = Money::new(dec!(100), "USD").unwrap();
    let eur = Money::new(dec!(50), "EUR").unwrap();

    let err = usd.add(&eur, None).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::MissingExchangeRate { ref from, ref to } if from == "EUR" && to == "USD"
    ));

    let sum = usd.add(&eur, Some(dec!(1.10))).unwrap();
    assert_eq!(sum.currency(), "USD");
    assert_eq!(sum.amount(), dec!(155.00));

    let err = usd.subtract(&eur, Some(dec!(0))).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidExchangeRate { .. }));
}

#[test]
fn divide_by_zero_is_an_error() {
    let m = Money::new(dec!(5), "USD").unwrap();
    assert!(matches!(m.divide(dec!(0)), Err(LedgerError::DivisionByZero)));
}

#[test]
fn converting_into_own_currency_ignores_the_rate() {
    let m = Money::new(dec!(42.42), "GBP").unwrap();
    for rate in [dec!(0), dec!(-3), dec!(1), dec!(123.456)] {
        let same = m.convert_to("gbp", rate).unwrap();
        assert!(same.equals(&m));
    }
}

#[test]
fn convert_to_multiplies_by_rate() {
    let m = Money::new(dec!(100), "USD").unwrap();
    let jpy = m.convert_to("JPY", dec!(151.5)).unwrap();
    assert_eq!(jpy.currency(), "JPY");
    assert_eq!(jpy.amount(), dec!(15150.0));
    assert!(matches!(
        m.convert_to("JPY", dec!(0)),
        Err(LedgerError::InvalidExchangeRate { .. })
    ));
}

#[test]
fn equality_is_numeric_and_currency_bound() {
    let a = Money::new(dec!(1.0), "USD").unwrap();
    let b = Money::new(dec!(1.00), "USD").unwrap();
    let c = Money::new(dec!(1.00), "CAD").unwrap();
    assert!(a.equals(&b));
    assert!(!a.equals(&c));
}

#[test]
fn comparisons_convert_the_operand() {
    let usd = Money::new(dec!(100), "USD").unwrap();
    let eur = Money::new(dec!(95), "EUR").unwrap();
    assert!(usd.less_than(&eur, Some(dec!(1.10))).unwrap());
    assert!(usd.greater_than(&eur, Some(dec!(1.0))).unwrap());
    assert!(usd.less_than(&eur, None).is_err());
}

#[test]
fn formats_per_locale_with_half_up_rounding() {
    let m = Money::new(dec!(1234.565), "USD").unwrap();
    assert_eq!(m.format("en-US"), "$1,234.57");

    let eur = Money::new(dec!(1234.5), "EUR").unwrap();
    assert_eq!(eur.format("de-DE"), "1.234,50 €");
    assert_eq!(eur.format("fr-FR"), "1\u{202f}234,50 €");

    let brl = Money::new(dec!(99.9), "BRL").unwrap();
    assert_eq!(brl.format("pt-BR"), "R$ 99,90");
}

#[test]
fn zero_decimal_currencies_round_to_whole_units() {
    let yen = Money::new(dec!(1234.5), "JPY").unwrap();
    assert_eq!(yen.format("ja-JP"), "¥1,235");

    let dinar = Money::new(dec!(1.2345), "KWD").unwrap();
    assert_eq!(dinar.format("en-US"), "KD1.235");
}

#[test]
fn negative_amounts_carry_a_leading_sign() {
    let m = Money::new(dec!(-5), "USD").unwrap();
    assert_eq!(m.format("en-US"), "-$5.00");
}

#[test]
fn unknown_locale_and_currency_fall_back() {
    let m = Money::new(dec!(1000), "USD").unwrap();
    assert_eq!(m.format("xx-YY"), "$1,000.00");
    // language match
    let eur = Money::new(dec!(1000), "EUR").unwrap();
    assert_eq!(eur.format("de-AT"), "1.000,00 €");

    let odd = Money::new(dec!(12.345), "XYZ").unwrap();
    assert_eq!(odd.format("en-US"), "12.35 XYZ");
}

#[test]
fn display_is_code_suffixed() {
    let m = Money::new(dec!(12.50), "EUR").unwrap();
    assert_eq!(m.to_string(), "12.5 EUR");
}
