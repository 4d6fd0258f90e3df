// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Currency-bound decimal amounts.
//!
//! A [`Money`] never changes after construction; every operation hands back a
//! new value. Arithmetic between two currencies only happens when the caller
//! supplies the rate that turns the operand into the receiver's currency.

use crate::error::{LedgerError, LedgerResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// (code, symbol, fraction digits)
const CURRENCIES: &[(&str, &str, u32)] = &[
    ("USD", "$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("JPY", "¥", 0),
    ("KRW", "₩", 0),
    ("VND", "₫", 0),
    ("CLP", "CLP$", 0),
    ("ISK", "kr", 0),
    ("CNY", "CN¥", 2),
    ("INR", "₹", 2),
    ("CHF", "CHF", 2),
    ("CAD", "CA$", 2),
    ("AUD", "A$", 2),
    ("NZD", "NZ$", 2),
    ("HKD", "HK$", 2),
    ("SGD", "S$", 2),
    ("TWD", "NT$", 2),
    ("SEK", "kr", 2),
    ("NOK", "kr", 2),
    ("DKK", "kr", 2),
    ("PLN", "zł", 2),
    ("BRL", "R$", 2),
    ("MXN", "MX$", 2),
    ("ZAR", "R", 2),
    ("THB", "฿", 2),
    ("KWD", "KD", 3),
    ("BHD", "BD", 3),
];

#[derive(Clone, Copy)]
enum SymbolPosition {
    Prefix,
    PrefixSpaced,
    Suffix,
}

struct LocaleFormat {
    group: &'static str,
    decimal: &'static str,
    position: SymbolPosition,
}

static LOCALES: &[(&str, LocaleFormat)] = &[
    ("en-US", LocaleFormat { group: ",", decimal: ".", position: SymbolPosition::Prefix }),
    ("en-GB", LocaleFormat { group: ",", decimal: ".", position: SymbolPosition::Prefix }),
    ("en-IN", LocaleFormat { group: ",", decimal: ".", position: SymbolPosition::Prefix }),
    ("ja-JP", LocaleFormat { group: ",", decimal: ".", position: SymbolPosition::Prefix }),
    ("ko-KR", LocaleFormat { group: ",", decimal: ".", position: SymbolPosition::Prefix }),
    ("zh-CN", LocaleFormat { group: ",", decimal: ".", position: SymbolPosition::Prefix }),
    ("de-DE", LocaleFormat { group: ".", decimal: ",", position: SymbolPosition::Suffix }),
    ("es-ES", LocaleFormat { group: ".", decimal: ",", position: SymbolPosition::Suffix }),
    ("it-IT", LocaleFormat { group: ".", decimal: ",", position: SymbolPosition::Suffix }),
    ("fr-FR", LocaleFormat { group: "\u{202f}", decimal: ",", position: SymbolPosition::Suffix }),
    ("pt-BR", LocaleFormat { group: ".", decimal: ",", position: SymbolPosition::PrefixSpaced }),
];

/// Uppercases and validates an ISO-4217 style code.
pub fn normalize_currency(code: &str) -> LedgerResult<String> {
    let upper = code.trim().to_uppercase();
    if CURRENCY_CODE.is_match(&upper) {
        Ok(upper)
    } else {
        Err(LedgerError::MalformedCurrency(code.to_string()))
    }
}

/// Minor-unit digits used when displaying `code`; unknown codes get 2.
pub fn fraction_digits(code: &str) -> u32 {
    CURRENCIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, d)| *d)
        .unwrap_or(2)
}

fn symbol_for(code: &str) -> Option<&'static str> {
    CURRENCIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, s, _)| *s)
}

fn locale_format(locale: &str) -> &'static LocaleFormat {
    let exact = LOCALES
        .iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(locale));
    let by_language = || {
        let lang = locale.split(['-', '_']).next().unwrap_or_default();
        LOCALES
            .iter()
            .find(|(tag, _)| tag.split('-').next() == Some(lang))
    };
    exact
        .or_else(by_language)
        .map(|(_, f)| f)
        .unwrap_or(&LOCALES[0].1)
}

/// Rounds half away from zero and pins the scale so trailing zeros print.
fn round_half_up(amount: Decimal, dp: u32) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

fn group_digits(digits: &str, sep: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * sep.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> LedgerResult<Self> {
        Ok(Self {
            amount,
            currency: normalize_currency(currency)?,
        })
    }

    pub fn zero(currency: &str) -> LedgerResult<Self> {
        Self::new(Decimal::ZERO, currency)
    }

    /// Builds a value from parts that were already validated, e.g. read back
    /// from the store.
    pub(crate) fn from_parts(amount: Decimal, currency: String) -> Self {
        Self { amount, currency }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn negate(&self) -> Money {
        Money::from_parts(-self.amount, self.currency.clone())
    }

    pub fn abs(&self) -> Money {
        Money::from_parts(self.amount.abs(), self.currency.clone())
    }

    /// Magnitude of `other` expressed in this value's currency.
    fn operand(&self, other: &Money, rate: Option<Decimal>) -> LedgerResult<Decimal> {
        if other.currency == self.currency {
            return Ok(other.amount);
        }
        match rate {
            Some(r) if r > Decimal::ZERO => other
                .amount
                .checked_mul(r)
                .ok_or_else(|| LedgerError::InvalidAmount("overflow during conversion".into())),
            Some(r) => Err(LedgerError::InvalidExchangeRate {
                from: other.currency.clone(),
                to: self.currency.clone(),
                rate: r,
            }),
            None => Err(LedgerError::MissingExchangeRate {
                from: other.currency.clone(),
                to: self.currency.clone(),
            }),
        }
    }

    /// Adds `other`; `rate` converts `other`'s currency into ours and is only
    /// consulted when the currencies differ.
    pub fn add(&self, other: &Money, rate: Option<Decimal>) -> LedgerResult<Money> {
        let rhs = self.operand(other, rate)?;
        let sum = self
            .amount
            .checked_add(rhs)
            .ok_or_else(|| LedgerError::InvalidAmount("overflow during addition".into()))?;
        Ok(Money::from_parts(sum, self.currency.clone()))
    }

    pub fn subtract(&self, other: &Money, rate: Option<Decimal>) -> LedgerResult<Money> {
        let rhs = self.operand(other, rate)?;
        let diff = self
            .amount
            .checked_sub(rhs)
            .ok_or_else(|| LedgerError::InvalidAmount("overflow during subtraction".into()))?;
        Ok(Money::from_parts(diff, self.currency.clone()))
    }

    pub fn multiply(&self, factor: Decimal) -> LedgerResult<Money> {
        let product = self
            .amount
            .checked_mul(factor)
            .ok_or_else(|| LedgerError::InvalidAmount("overflow during multiplication".into()))?;
        Ok(Money::from_parts(product, self.currency.clone()))
    }

    pub fn divide(&self, divisor: Decimal) -> LedgerResult<Money> {
        if divisor.is_zero() {
            return Err(LedgerError::DivisionByZero);
        }
        let quotient = self
            .amount
            .checked_div(divisor)
            .ok_or_else(|| LedgerError::InvalidAmount("overflow during division".into()))?;
        Ok(Money::from_parts(quotient, self.currency.clone()))
    }

    /// Re-expresses this value in `currency` as `amount * rate`. Returns an
    /// unchanged copy when already in `currency`, whatever the rate.
    pub fn convert_to(&self, currency: &str, rate: Decimal) -> LedgerResult<Money> {
        let target = normalize_currency(currency)?;
        if target == self.currency {
            return Ok(self.clone());
        }
        if rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate {
                from: self.currency.clone(),
                to: target,
                rate,
            });
        }
        let converted = self
            .amount
            .checked_mul(rate)
            .ok_or_else(|| LedgerError::InvalidAmount("overflow during conversion".into()))?;
        Ok(Money::from_parts(converted, target))
    }

    /// Same currency and numerically equal magnitude.
    pub fn equals(&self, other: &Money) -> bool {
        self == other
    }

    fn compare(&self, other: &Money, rate: Option<Decimal>) -> LedgerResult<Ordering> {
        let rhs = self.operand(other, rate)?;
        Ok(self.amount.cmp(&rhs))
    }

    pub fn greater_than(&self, other: &Money, rate: Option<Decimal>) -> LedgerResult<bool> {
        Ok(self.compare(other, rate)? == Ordering::Greater)
    }

    pub fn less_than(&self, other: &Money, rate: Option<Decimal>) -> LedgerResult<bool> {
        Ok(self.compare(other, rate)? == Ordering::Less)
    }

    /// Locale-aware display string. Currencies missing from the formatting
    /// table render as `"<amount> <CODE>"`.
    pub fn format(&self, locale: &str) -> String {
        let Some(symbol) = symbol_for(&self.currency) else {
            return format!("{} {}", round_half_up(self.amount, 2), self.currency);
        };
        let fmt = locale_format(locale);
        let dp = fraction_digits(&self.currency);
        let rounded = round_half_up(self.amount.abs(), dp).to_string();
        let (int_part, frac_part) = match rounded.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (rounded.as_str(), None),
        };
        let mut number = group_digits(int_part, fmt.group);
        if let Some(f) = frac_part {
            number.push_str(fmt.decimal);
            number.push_str(f);
        }
        let sign = if round_half_up(self.amount, dp) < Decimal::ZERO { "-" } else { "" };
        match fmt.position {
            SymbolPosition::Prefix => format!("{sign}{symbol}{number}"),
            SymbolPosition::PrefixSpaced => format!("{sign}{symbol} {number}"),
            SymbolPosition::Suffix => format!("{sign}{number} {symbol}"),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.currency)
    }
}
