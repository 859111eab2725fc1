use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::PaymentRecord;
use crate::types::Money;

/// Principal and interest paid within one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    pub principal_paid: Money,
    pub interest_paid: Money,
}

impl YearlySummary {
    pub fn total_paid(&self) -> Money {
        self.principal_paid.saturating_add(self.interest_paid)
    }
}

/// Group records by the calendar year of their payment date, ascending.
pub fn aggregate_by_year(schedule: &[PaymentRecord]) -> Vec<YearlySummary> {
    let mut by_year: BTreeMap<i32, (Money, Money)> = BTreeMap::new();
    for record in schedule {
        let entry = by_year
            .entry(record.payment_date.year())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = entry.0.saturating_add(record.principal_portion);
        entry.1 = entry.1.saturating_add(record.interest_portion);
    }

    by_year
        .into_iter()
        .map(|(year, (principal_paid, interest_paid))| YearlySummary {
            year,
            principal_paid,
            interest_paid,
        })
        .collect()
}
