// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod budgets;
pub mod cards;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod fx;
pub mod reminders;
pub mod reports;
pub mod scheduled;
pub mod transactions;
pub mod users;
