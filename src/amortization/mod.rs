pub mod engine;
pub mod outstanding;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::terms::LoanTerms;
use crate::types::{AmortizationSystem, LoanId, PaymentStatus};

pub use engine::AmortizationEngine;
pub use outstanding::OutstandingPosition;

/// one installment of a repayment schedule, amounts rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based installment number
    pub period: u32,
    pub due_date: NaiveDate,
    pub opening_balance: Money,
    /// principal + interest + tax on interest
    pub installment: Money,
    pub principal: Money,
    pub interest: Money,
    pub interest_tax: Money,
    pub closing_balance: Money,
    pub status: PaymentStatus,
}

impl AmortizationRow {
    /// installment before tax on interest
    pub fn installment_before_tax(&self) -> Money {
        self.principal + self.interest
    }
}

/// schedule totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_tax: Money,
    pub total_payable: Money,
    pub average_installment: Money,
}

/// full repayment schedule for a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTable {
    pub loan_id: Option<LoanId>,
    pub system: AmortizationSystem,
    pub periodic_rate: Rate,
    pub rows: Vec<AmortizationRow>,
    pub summary: AmortizationSummary,
}

impl AmortizationTable {
    /// validate terms and generate the schedule for their amortization system
    pub fn generate(terms: &LoanTerms) -> Result<Self> {
        terms.validate()?;

        let engine = AmortizationEngine::new(terms.system);
        let (rows, summary) = engine.calculate_schedule(terms)?;

        Ok(Self {
            loan_id: terms.loan_id,
            system: terms.system,
            periodic_rate: terms.periodic_rate(),
            rows,
            summary,
        })
    }

    /// get row for a 1-based period
    pub fn get_row(&self, period: u32) -> Option<&AmortizationRow> {
        period
            .checked_sub(1)
            .and_then(|index| self.rows.get(index as usize))
    }

    pub fn outstanding_as_of(&self, cutoff: NaiveDate) -> OutstandingPosition {
        OutstandingPosition::as_of(&self.rows, cutoff)
    }
}

/// build the repayment schedule for `terms`
pub fn build_schedule(terms: &LoanTerms) -> Result<AmortizationTable> {
    AmortizationTable::generate(terms)
}

/// level installment of an annuity: `P·r(1+r)^n / ((1+r)^n − 1)`, or `P/n` at a zero rate
pub fn level_installment(principal: Money, rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return principal;
    }

    let r = rate.as_decimal();
    if r.is_zero() {
        return principal / Decimal::from(periods);
    }

    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        match compound.checked_mul(base) {
            Some(next) => compound = next,
            // factor too large to represent; the annuity has converged to P·r
            None => return Money::from_decimal(principal.as_decimal() * r),
        }
    }

    // (1+r)^n / ((1+r)^n − 1) stays near 1, keeping P·r from overflowing
    let growth = compound / (compound - Decimal::ONE);

    Money::from_decimal(principal.as_decimal() * r * growth)
}
