use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TaxConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::{AmortizationSystem, LoanId, PaymentFrequency};

/// contractual terms of a consumer loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_id: Option<LoanId>,
    pub principal: Money,
    /// contract rate quoted per month; takes precedence over `annual_rate`
    pub monthly_rate: Option<Rate>,
    /// nominal annual rate, split evenly across the periods of a year
    pub annual_rate: Option<Rate>,
    /// total simple-interest rate over the life of a flat loan
    pub flat_rate: Option<Rate>,
    pub term: u32,
    pub frequency: PaymentFrequency,
    pub system: AmortizationSystem,
    pub start_date: NaiveDate,
    pub origination_fee: Money,
    /// insurance premium charged with every installment
    pub insurance_per_period: Money,
    /// any other recurring charge added to every installment
    pub other_charges_per_period: Money,
    /// IVA applied to interest
    pub tax_rate: Rate,
}

impl LoanTerms {
    pub fn builder() -> LoanTermsBuilder {
        LoanTermsBuilder::new()
    }

    /// interest rate applied to the balance each period
    ///
    /// a monthly rate is divided by 4.33 for weekly loans and by 2 for
    /// biweekly ones; an annual rate is divided by the periods in a year.
    pub fn periodic_rate(&self) -> Rate {
        match (self.monthly_rate, self.annual_rate) {
            (Some(monthly), _) => Rate::from_decimal(
                monthly.as_decimal() / self.frequency.monthly_rate_divisor(),
            ),
            (None, Some(annual)) => Rate::from_decimal(
                annual.as_decimal() / Decimal::from(self.frequency.periods_per_year()),
            ),
            (None, None) => Rate::ZERO,
        }
    }

    /// amount the borrower actually receives
    pub fn net_disbursement(&self) -> Money {
        self.principal - self.origination_fee
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(EngineError::terms(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if self.term == 0 {
            return Err(EngineError::terms("term must be at least one period"));
        }

        for (label, rate) in [
            ("monthly rate", self.monthly_rate),
            ("annual rate", self.annual_rate),
            ("flat rate", self.flat_rate),
        ] {
            if let Some(rate) = rate {
                if rate.is_negative() {
                    return Err(EngineError::terms(format!("{label} must not be negative, got {rate}")));
                }
            }
        }

        for (label, amount) in [
            ("origination fee", self.origination_fee),
            ("insurance", self.insurance_per_period),
            ("other charges", self.other_charges_per_period),
        ] {
            if amount.is_negative() {
                return Err(EngineError::terms(format!("{label} must not be negative, got {amount}")));
            }
        }

        if self.origination_fee >= self.principal {
            return Err(EngineError::terms(format!(
                "origination fee {} leaves nothing to disburse from {}",
                self.origination_fee, self.principal
            )));
        }

        if self.tax_rate.is_negative() || self.tax_rate > Rate::ONE {
            return Err(EngineError::terms(format!("tax rate {} out of range", self.tax_rate)));
        }

        Ok(())
    }
}

/// builder for [`LoanTerms`]; `build` validates before returning
#[derive(Debug, Clone, Default)]
pub struct LoanTermsBuilder {
    loan_id: Option<LoanId>,
    principal: Option<Money>,
    monthly_rate: Option<Rate>,
    annual_rate: Option<Rate>,
    flat_rate: Option<Rate>,
    term: Option<u32>,
    frequency: Option<PaymentFrequency>,
    system: Option<AmortizationSystem>,
    start_date: Option<NaiveDate>,
    origination_fee: Option<Money>,
    insurance_per_period: Option<Money>,
    other_charges_per_period: Option<Money>,
    tax_rate: Option<Rate>,
    border_zone: bool,
}

impl LoanTermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_id(mut self, id: LoanId) -> Self {
        self.loan_id = Some(id);
        self
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn monthly_rate(mut self, rate: Rate) -> Self {
        self.monthly_rate = Some(rate);
        self
    }

    pub fn annual_rate(mut self, rate: Rate) -> Self {
        self.annual_rate = Some(rate);
        self
    }

    pub fn flat_rate(mut self, rate: Rate) -> Self {
        self.flat_rate = Some(rate);
        self
    }

    pub fn term(mut self, periods: u32) -> Self {
        self.term = Some(periods);
        self
    }

    pub fn frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn system(mut self, system: AmortizationSystem) -> Self {
        self.system = Some(system);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn origination_fee(mut self, fee: Money) -> Self {
        self.origination_fee = Some(fee);
        self
    }

    pub fn insurance_per_period(mut self, premium: Money) -> Self {
        self.insurance_per_period = Some(premium);
        self
    }

    pub fn other_charges_per_period(mut self, charges: Money) -> Self {
        self.other_charges_per_period = Some(charges);
        self
    }

    /// explicit IVA rate; overrides the border-zone flag
    pub fn tax_rate(mut self, rate: Rate) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    /// use the reduced border-zone IVA rate
    pub fn border_zone(mut self, border_zone: bool) -> Self {
        self.border_zone = border_zone;
        self
    }

    pub fn build(self) -> Result<LoanTerms> {
        let principal = self
            .principal
            .ok_or_else(|| EngineError::terms("principal is required"))?;
        let term = self
            .term
            .ok_or_else(|| EngineError::terms("term is required"))?;
        let start_date = self
            .start_date
            .ok_or_else(|| EngineError::terms("start date is required"))?;

        let tax_rate = self
            .tax_rate
            .unwrap_or_else(|| TaxConfig::default().rate_for(self.border_zone));

        let terms = LoanTerms {
            loan_id: self.loan_id,
            principal,
            monthly_rate: self.monthly_rate,
            annual_rate: self.annual_rate,
            flat_rate: self.flat_rate,
            term,
            frequency: self.frequency.unwrap_or(PaymentFrequency::Monthly),
            system: self.system.unwrap_or_default(),
            start_date,
            origination_fee: self.origination_fee.unwrap_or(Money::ZERO),
            insurance_per_period: self.insurance_per_period.unwrap_or(Money::ZERO),
            other_charges_per_period: self.other_charges_per_period.unwrap_or(Money::ZERO),
            tax_rate,
        };

        terms.validate()?;
        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> LoanTermsBuilder {
        LoanTerms::builder()
            .principal(Money::from_major(10_000))
            .term(12)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn test_builder_defaults() {
        let terms = base().monthly_rate(Rate::from_percentage(5)).build().unwrap();
        assert_eq!(terms.frequency, PaymentFrequency::Monthly);
        assert_eq!(terms.system, AmortizationSystem::EqualInstallment);
        assert_eq!(terms.tax_rate, Rate::from_percentage(16));
        assert_eq!(terms.origination_fee, Money::ZERO);
        assert_eq!(terms.net_disbursement(), Money::from_major(10_000));
    }

    #[test]
    fn test_border_zone_rate() {
        let terms = base().border_zone(true).build().unwrap();
        assert_eq!(terms.tax_rate, Rate::from_percentage(8));

        let explicit = base().border_zone(true).tax_rate(Rate::from_percentage(10)).build().unwrap();
        assert_eq!(explicit.tax_rate, Rate::from_percentage(10));
    }

    #[test]
    fn test_monthly_rate_takes_precedence() {
        let terms = base()
            .monthly_rate(Rate::from_percentage(3))
            .annual_rate(Rate::from_percentage(60))
            .build()
            .unwrap();
        assert_eq!(terms.periodic_rate(), Rate::from_percentage(3));
    }

    #[test]
    fn test_periodic_rate_conversions() {
        let weekly = base()
            .monthly_rate(Rate::from_percent(dec!(4.33)))
            .frequency(PaymentFrequency::Weekly)
            .build()
            .unwrap();
        assert_eq!(weekly.periodic_rate().as_decimal(), dec!(0.01));

        let biweekly = base()
            .monthly_rate(Rate::from_percentage(6))
            .frequency(PaymentFrequency::Biweekly)
            .build()
            .unwrap();
        assert_eq!(biweekly.periodic_rate(), Rate::from_percentage(3));

        let annual = base()
            .annual_rate(Rate::from_percentage(48))
            .frequency(PaymentFrequency::Biweekly)
            .build()
            .unwrap();
        assert_eq!(annual.periodic_rate(), Rate::from_percentage(2));

        assert_eq!(base().build().unwrap().periodic_rate(), Rate::ZERO);
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let err = base().principal(Money::ZERO).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidLoanTerms { .. }));

        let err = base().principal(Money::from_major(-5)).build().unwrap_err();
        assert!(err.to_string().contains("principal"));
    }

    #[test]
    fn test_rejects_zero_term() {
        let err = base().term(0).build().unwrap_err();
        assert!(err.to_string().contains("term"));
    }

    #[test]
    fn test_rejects_fee_swallowing_principal() {
        let err = base().origination_fee(Money::from_major(10_000)).build().unwrap_err();
        assert!(err.to_string().contains("origination fee"));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let err = base()
            .monthly_rate(Rate::from_decimal(dec!(-0.01)))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("monthly rate"));
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(LoanTerms::builder().term(3).build().is_err());
        assert!(LoanTerms::builder().principal(Money::ONE).build().is_err());
    }
}
