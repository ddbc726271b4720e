use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationRow;
use crate::decimal::Money;

/// position of a schedule at a cut-off date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingPosition {
    pub cutoff: NaiveDate,
    /// principal still owed: opening balance of the first unpaid row
    pub outstanding_principal: Money,
    /// unpaid installments due on or before the cut-off
    pub installments_due: u32,
    pub amount_due: Money,
    /// first unpaid installment falling after the cut-off
    pub next_installment: Option<AmortizationRow>,
}

impl OutstandingPosition {
    pub fn as_of(rows: &[AmortizationRow], cutoff: NaiveDate) -> Self {
        let mut outstanding_principal = None;
        let mut installments_due = 0;
        let mut amount_due = Money::ZERO;
        let mut next_installment = None;

        for row in rows.iter().filter(|r| r.status.is_unpaid()) {
            outstanding_principal.get_or_insert(row.opening_balance);

            if row.due_date <= cutoff {
                installments_due += 1;
                amount_due += row.installment;
            } else if next_installment.is_none() {
                next_installment = Some(row.clone());
            }
        }

        Self {
            cutoff,
            outstanding_principal: outstanding_principal.unwrap_or(Money::ZERO),
            installments_due,
            amount_due: amount_due.round_cents(),
            next_installment,
        }
    }

    /// position as of the provider's current date
    pub fn now(rows: &[AmortizationRow], time_provider: &SafeTimeProvider) -> Self {
        Self::as_of(rows, time_provider.now().date_naive())
    }

    pub fn is_in_arrears(&self) -> bool {
        self.installments_due > 0
    }
}
