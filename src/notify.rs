// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reminder records for scheduled transactions. Delivery is someone else's
//! job; this module only decides what is due and what to say about it.

use crate::models::{ScheduleStatus, ScheduledTransaction};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

pub const DEFAULT_HORIZON_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
}

/// One notification per open schedule that is overdue or due within
/// `horizon_days` of `today`, most urgent first.
pub fn reminders(
    scheduled: &[ScheduledTransaction],
    today: NaiveDate,
    horizon_days: i64,
) -> Vec<Notification> {
    let mut due: Vec<&ScheduledTransaction> = scheduled
        .iter()
        .filter(|st| st.status == ScheduleStatus::Pending)
        .filter(|st| (st.due_date - today).num_days() <= horizon_days)
        .collect();
    due.sort_by_key(|st| (st.due_date, st.id));
    due.into_iter().map(|st| reminder(st, today)).collect()
}

fn reminder(st: &ScheduledTransaction, today: NaiveDate) -> Notification {
    let status = st.effective_status(today);
    let days = (st.due_date - today).num_days();
    let title = match status {
        ScheduleStatus::Overdue => format!("Overdue: {}", st.description),
        _ => format!("Upcoming: {}", st.description),
    };
    let message = match days {
        d if d < 0 => format!(
            "{} {} of {} was due on {} ({} days ago)",
            st.kind,
            st.amount,
            st.description,
            st.due_date,
            -d
        ),
        0 => format!("{} {} of {} is due today", st.kind, st.amount, st.description),
        1 => format!("{} {} of {} is due tomorrow", st.kind, st.amount, st.description),
        d => format!(
            "{} {} of {} is due on {} (in {} days)",
            st.kind, st.amount, st.description, st.due_date, d
        ),
    };
    Notification {
        title,
        message,
        payload: json!({
            "scheduled_transaction_id": st.id,
            "account_id": st.account_id,
            "type": st.kind.as_str(),
            "amount": st.amount.amount().to_string(),
            "currency": st.amount.currency(),
            "due_date": st.due_date.to_string(),
            "status": status.as_str(),
            "recurring": st.is_recurring,
        }),
    }
}
