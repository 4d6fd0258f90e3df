// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod conversion;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod money;
pub mod notify;
pub mod policy;
pub mod rates;
pub mod recurrence;
pub mod store;
pub mod utils;

pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use money::Money;
