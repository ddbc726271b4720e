use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationRow;
use crate::config::{EngineConfig, LatePaymentConfig, TaxConfig};
use crate::decimal::{Money, Rate};

/// moratorium charge on a late installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatePaymentCharge {
    pub installment: Money,
    pub days_overdue: u32,
    pub daily_rate: Rate,
    pub penalty: Money,
    pub penalty_tax: Money,
    /// installment + penalty + tax on penalty
    pub total_due: Money,
}

/// engine for late-payment interest on installments
#[derive(Debug, Clone, Default)]
pub struct LatePaymentCalculator {
    late_payment: LatePaymentConfig,
    tax: TaxConfig,
}

impl LatePaymentCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            late_payment: config.late_payment,
            tax: config.tax,
        }
    }

    /// penalty = installment × daily rate × days, taxed like ordinary interest
    pub fn charge(&self, installment: Money, days_overdue: u32, border_zone: bool) -> LatePaymentCharge {
        let daily_rate = self.late_payment.daily_rate;
        let penalty = installment.at_rate(daily_rate) * Decimal::from(days_overdue);
        let penalty_tax = penalty.at_rate(self.tax.rate_for(border_zone));

        LatePaymentCharge {
            installment,
            days_overdue,
            daily_rate,
            penalty: penalty.round_cents(),
            penalty_tax: penalty_tax.round_cents(),
            total_due: (installment + penalty + penalty_tax).round_cents(),
        }
    }

    /// charge for a scheduled row as of `cutoff`; `None` unless it is unpaid and past due
    pub fn charge_for_row(
        &self,
        row: &AmortizationRow,
        cutoff: NaiveDate,
        border_zone: bool,
    ) -> Option<LatePaymentCharge> {
        if !row.status.is_unpaid() || cutoff <= row.due_date {
            return None;
        }
        let days = (cutoff - row.due_date).num_days();
        let days_overdue = u32::try_from(days).ok()?;
        Some(self.charge(row.installment, days_overdue, border_zone))
    }
}
