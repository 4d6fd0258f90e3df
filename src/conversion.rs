// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cross-currency aggregation on top of a [`RateTable`].
//!
//! `sum` and `sort_by_value` are best-effort: amounts whose currency has no
//! rate into the base are left out of the total (or ranked by raw magnitude)
//! and their currency is reported back in `skipped`.

use crate::error::{LedgerError, LedgerResult};
use crate::money::{Money, normalize_currency};
use crate::rates::RateTable;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub total: Money,
    pub skipped: BTreeSet<String>,
}

impl Aggregate {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// Descending by value in the base currency.
    pub items: Vec<Money>,
    pub skipped: BTreeSet<String>,
}

pub struct CurrencyConverter<'a> {
    rates: &'a RateTable,
}

impl<'a> CurrencyConverter<'a> {
    pub fn new(rates: &'a RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        self.rates
    }

    pub fn sum(&self, amounts: &[Money], base: &str) -> LedgerResult<Aggregate> {
        let base = normalize_currency(base)?;
        let mut total = Money::zero(&base)?;
        let mut skipped = BTreeSet::new();
        for amount in amounts {
            match self.rates.convert(amount, &base) {
                Some(converted) => total = total.add(&converted, None)?,
                None => {
                    skipped.insert(amount.currency().to_string());
                }
            }
        }
        if !skipped.is_empty() {
            warn!(?skipped, %base, "sum skipped amounts without an exchange rate");
        }
        Ok(Aggregate { total, skipped })
    }

    pub fn sort_by_value(&self, amounts: Vec<Money>, base: &str) -> LedgerResult<Ranked> {
        let base = normalize_currency(base)?;
        let mut skipped = BTreeSet::new();
        let mut keyed: Vec<(Decimal, Money)> = amounts
            .into_iter()
            .map(|m| match self.rates.convert(&m, &base) {
                Some(converted) => (converted.amount(), m),
                None => {
                    skipped.insert(m.currency().to_string());
                    (m.amount(), m)
                }
            })
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        if !skipped.is_empty() {
            warn!(?skipped, %base, "ranking fell back to unconverted magnitudes");
        }
        Ok(Ranked {
            items: keyed.into_iter().map(|(_, m)| m).collect(),
            skipped,
        })
    }

    /// `part / total * 100`, with `part` converted into `total`'s currency.
    /// A zero total yields zero; a missing rate is an error.
    pub fn percentage(&self, part: &Money, total: &Money) -> LedgerResult<Decimal> {
        if total.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let converted = self.rates.convert(part, total.currency()).ok_or_else(|| {
            LedgerError::MissingExchangeRate {
                from: part.currency().to_string(),
                to: total.currency().to_string(),
            }
        })?;
        converted
            .amount()
            .checked_div(total.amount())
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!("overflow computing {part} as a share of {total}"))
            })
    }
}
