use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::amortization::{level_installment, AmortizationRow, AmortizationSummary};
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::terms::LoanTerms;
use crate::types::{AmortizationSystem, PaymentFrequency, PaymentStatus};

/// schedule generator for one amortization system
///
/// every figure on a row is rounded to cents when the row is emitted, while the
/// running balance keeps full working precision. the last row always takes the
/// remaining balance as its principal portion and closes at exactly zero.
#[derive(Debug, Clone, Copy)]
pub struct AmortizationEngine {
    system: AmortizationSystem,
}

impl AmortizationEngine {
    pub fn new(system: AmortizationSystem) -> Self {
        Self { system }
    }

    /// calculate rows and totals for already validated terms
    pub fn calculate_schedule(&self, terms: &LoanTerms) -> Result<(Vec<AmortizationRow>, AmortizationSummary)> {
        match self.system {
            AmortizationSystem::EqualInstallment => self.calculate_equal_installment(terms),
            AmortizationSystem::ConstantAmortization => self.calculate_constant_amortization(terms),
            AmortizationSystem::Flat => self.calculate_flat(terms),
        }
    }

    /// french system: fixed installment, interest on the declining balance
    fn calculate_equal_installment(&self, terms: &LoanTerms) -> Result<(Vec<AmortizationRow>, AmortizationSummary)> {
        let rate = terms.periodic_rate();
        let installment = level_installment(terms.principal, rate, terms.term);

        let mut rows = Vec::with_capacity(terms.term as usize);
        let mut balance = terms.principal;
        let mut total_interest = Money::ZERO;
        let mut total_tax = Money::ZERO;

        for period in 1..=terms.term {
            let due_date = due_date(terms.frequency, terms.start_date, period)?;
            let interest = balance.at_rate(rate);
            let interest_tax = interest.at_rate(terms.tax_rate);
            let is_last = period == terms.term;

            let (principal_portion, payment, closing) = if is_last {
                (balance, balance + interest, Money::ZERO)
            } else {
                let principal_portion = installment - interest;
                (principal_portion, installment, (balance - principal_portion).max(Money::ZERO))
            };

            rows.push(emit_row(period, due_date, balance, payment + interest_tax, principal_portion, interest, interest_tax, closing));

            total_interest += interest;
            total_tax += interest_tax;
            balance = closing;
        }

        let summary = AmortizationSummary {
            total_principal: terms.principal.round_cents(),
            total_interest: total_interest.round_cents(),
            total_tax: total_tax.round_cents(),
            total_payable: (terms.principal + total_interest + total_tax).round_cents(),
            average_installment: installment.round_cents(),
        };

        Ok((rows, summary))
    }

    /// german system: fixed principal portion, declining installments
    fn calculate_constant_amortization(&self, terms: &LoanTerms) -> Result<(Vec<AmortizationRow>, AmortizationSummary)> {
        let rate = terms.periodic_rate();
        let principal_payment = terms.principal / Decimal::from(terms.term);

        let mut rows = Vec::with_capacity(terms.term as usize);
        let mut balance = terms.principal;
        let mut total_interest = Money::ZERO;
        let mut total_tax = Money::ZERO;
        let mut total_installments = Money::ZERO;

        for period in 1..=terms.term {
            let due_date = due_date(terms.frequency, terms.start_date, period)?;
            let interest = balance.at_rate(rate);
            let interest_tax = interest.at_rate(terms.tax_rate);

            let (principal_portion, closing) = if period == terms.term {
                (balance, Money::ZERO)
            } else {
                (principal_payment, (balance - principal_payment).max(Money::ZERO))
            };
            let installment = principal_portion + interest + interest_tax;

            rows.push(emit_row(period, due_date, balance, installment, principal_portion, interest, interest_tax, closing));

            total_interest += interest;
            total_tax += interest_tax;
            total_installments += installment;
            balance = closing;
        }

        let summary = AmortizationSummary {
            total_principal: terms.principal.round_cents(),
            total_interest: total_interest.round_cents(),
            total_tax: total_tax.round_cents(),
            total_payable: total_installments.round_cents(),
            average_installment: (total_installments / Decimal::from(terms.term)).round_cents(),
        };

        Ok((rows, summary))
    }

    /// flat: interest on the original principal, computed once and spread evenly
    ///
    /// the installment stays uniform on every row, the last included. row
    /// components are rounded on their own, so when the term does not divide
    /// the amounts evenly they can sum to a cent less or more than the installment.
    fn calculate_flat(&self, terms: &LoanTerms) -> Result<(Vec<AmortizationRow>, AmortizationSummary)> {
        let flat_rate = terms.flat_rate.unwrap_or(Rate::ZERO);
        let periods = Decimal::from(terms.term);

        let total_interest = terms.principal.at_rate(flat_rate);
        let total_tax = total_interest.at_rate(terms.tax_rate);
        let total_payable = terms.principal + total_interest + total_tax;

        let installment = total_payable / periods;
        let principal_payment = terms.principal / periods;
        let interest_per_period = total_interest / periods;
        let tax_per_period = total_tax / periods;

        let mut rows = Vec::with_capacity(terms.term as usize);
        let mut balance = terms.principal;

        for period in 1..=terms.term {
            let due_date = due_date(terms.frequency, terms.start_date, period)?;

            let (principal_portion, closing) = if period == terms.term {
                (balance, Money::ZERO)
            } else {
                (principal_payment, (balance - principal_payment).max(Money::ZERO))
            };

            rows.push(emit_row(period, due_date, balance, installment, principal_portion, interest_per_period, tax_per_period, closing));

            balance = closing;
        }

        let summary = AmortizationSummary {
            total_principal: terms.principal.round_cents(),
            total_interest: total_interest.round_cents(),
            total_tax: total_tax.round_cents(),
            total_payable: total_payable.round_cents(),
            average_installment: installment.round_cents(),
        };

        Ok((rows, summary))
    }
}

fn due_date(frequency: PaymentFrequency, start: NaiveDate, period: u32) -> Result<NaiveDate> {
    frequency.due_date(start, period).ok_or_else(|| {
        EngineError::terms(format!("due date of period {period} from {start} is out of range"))
    })
}

#[allow(clippy::too_many_arguments)]
fn emit_row(
    period: u32,
    due_date: NaiveDate,
    opening: Money,
    installment: Money,
    principal: Money,
    interest: Money,
    interest_tax: Money,
    closing: Money,
) -> AmortizationRow {
    AmortizationRow {
        period,
        due_date,
        opening_balance: opening.round_cents(),
        installment: installment.round_cents(),
        principal: principal.round_cents(),
        interest: interest.round_cents(),
        interest_tax: interest_tax.round_cents(),
        closing_balance: closing.round_cents(),
        status: PaymentStatus::Pending,
    }
}
