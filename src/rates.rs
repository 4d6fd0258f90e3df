// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::money::{Money, normalize_currency};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One observed rate: 1 `from_currency` = `rate` `to_currency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateEntry {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub observed_at: DateTime<Utc>,
    pub source: String,
}

impl ExchangeRateEntry {
    pub fn new(
        from_currency: &str,
        to_currency: &str,
        rate: Decimal,
        observed_at: DateTime<Utc>,
        source: &str,
    ) -> LedgerResult<Self> {
        let from_currency = normalize_currency(from_currency)?;
        let to_currency = normalize_currency(to_currency)?;
        if rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate {
                from: from_currency,
                to: to_currency,
                rate,
            });
        }
        Ok(Self {
            from_currency,
            to_currency,
            rate,
            observed_at,
            source: source.to_string(),
        })
    }

    pub fn reciprocal(&self) -> Self {
        Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
            observed_at: self.observed_at,
            source: self.source.clone(),
        }
    }
}

/// Latest-rate lookup keyed by ordered currency pair.
///
/// Every inserted entry also lands as its reciprocal, so the table is always
/// symmetric. When several entries hit the same pair the most recently
/// observed one wins.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<(String, String), ExchangeRateEntry>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ExchangeRateEntry>) -> LedgerResult<Self> {
        let mut table = Self::new();
        table.update_rates(entries)?;
        Ok(table)
    }

    /// Replaces the whole table with `entries`. A non-positive rate anywhere
    /// in the batch rejects it and leaves the current table untouched.
    pub fn update_rates(&mut self, entries: Vec<ExchangeRateEntry>) -> LedgerResult<()> {
        let mut next: HashMap<(String, String), ExchangeRateEntry> = HashMap::new();
        let supplied = entries.len();
        for entry in entries {
            if entry.rate <= Decimal::ZERO {
                return Err(LedgerError::InvalidExchangeRate {
                    from: entry.from_currency,
                    to: entry.to_currency,
                    rate: entry.rate,
                });
            }
            if entry.from_currency == entry.to_currency {
                continue;
            }
            let reciprocal = entry.reciprocal();
            insert_latest(&mut next, entry);
            insert_latest(&mut next, reciprocal);
        }
        debug!(supplied, pairs = next.len(), "rebuilt exchange rate table");
        self.rates = next;
        Ok(())
    }

    /// `Some(1)` for identical currencies, `None` when no rate is known.
    pub fn get_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .map(|e| e.rate)
    }

    pub fn has_rate(&self, from: &str, to: &str) -> bool {
        self.get_rate(from, to).is_some()
    }

    /// Converts `value` into `to`; `None` when the pair is unknown.
    pub fn convert(&self, value: &Money, to: &str) -> Option<Money> {
        let rate = self.get_rate(value.currency(), to)?;
        value.convert_to(to, rate).ok()
    }

    pub fn entry(&self, from: &str, to: &str) -> Option<&ExchangeRateEntry> {
        self.rates.get(&(from.to_string(), to.to_string()))
    }

    /// All directed entries, ordered by pair for stable listings.
    pub fn entries(&self) -> Vec<&ExchangeRateEntry> {
        let mut out: Vec<&ExchangeRateEntry> = self.rates.values().collect();
        out.sort_by(|a, b| {
            (&a.from_currency, &a.to_currency).cmp(&(&b.from_currency, &b.to_currency))
        });
        out
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn insert_latest(map: &mut HashMap<(String, String), ExchangeRateEntry>, entry: ExchangeRateEntry) {
    let key = (entry.from_currency.clone(), entry.to_currency.clone());
    match map.get(&key) {
        Some(existing) if existing.observed_at > entry.observed_at => {}
        _ => {
            map.insert(key, entry);
        }
    }
}
