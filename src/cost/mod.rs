//! Annualized total cost (CAT) of a loan.
//!
//! The CAT is the internal rate of return of every cash flow the borrower sees
//! (net disbursement in, installments with insurance and charges out),
//! annualized over 12 periods whatever the payment cadence.

pub mod validation;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::level_installment;
use crate::config::EngineConfig;
use crate::decimal::{round_percent, Money, Rate};
use crate::errors::{EngineError, Result};
use crate::solver::{RateSolver, SolverOutcome};
use crate::terms::LoanTerms;
use crate::types::{AmortizationSystem, LoanCategory};

pub use validation::{validate_cost_rate, CostRateCheck};

/// periods used to annualize the periodic IRR
const ANNUALIZATION_PERIODS: u32 = 12;

/// seed for the flat-loan solver; flat effective rates run small per period
const FLAT_INITIAL_GUESS: Decimal = dec!(0.05);

/// inputs for an amortizing (equal-installment) loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRateInput {
    pub principal: Money,
    /// contract rate per period
    pub periodic_rate: Rate,
    pub term: u32,
    pub origination_fee: Money,
    pub insurance_per_period: Money,
    pub other_charges_per_period: Money,
    /// IVA on interest; the standard rate when absent
    pub tax_rate: Option<Rate>,
}

impl CostRateInput {
    pub fn new(principal: Money, periodic_rate: Rate, term: u32) -> Self {
        Self {
            principal,
            periodic_rate,
            term,
            origination_fee: Money::ZERO,
            insurance_per_period: Money::ZERO,
            other_charges_per_period: Money::ZERO,
            tax_rate: None,
        }
    }

    pub fn with_origination_fee(mut self, fee: Money) -> Self {
        self.origination_fee = fee;
        self
    }

    pub fn with_insurance(mut self, premium: Money) -> Self {
        self.insurance_per_period = premium;
        self
    }

    pub fn with_other_charges(mut self, charges: Money) -> Self {
        self.other_charges_per_period = charges;
        self
    }

    pub fn with_tax_rate(mut self, rate: Rate) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_loan(self.principal, self.term)?;
        if self.periodic_rate.is_negative() {
            return Err(EngineError::terms(format!(
                "periodic rate must not be negative, got {}",
                self.periodic_rate
            )));
        }
        if self.origination_fee.is_negative()
            || self.insurance_per_period.is_negative()
            || self.other_charges_per_period.is_negative()
        {
            return Err(EngineError::terms("fees and recurring charges must not be negative"));
        }
        if self.origination_fee >= self.principal {
            return Err(EngineError::terms(format!(
                "origination fee {} leaves nothing to disburse from {}",
                self.origination_fee, self.principal
            )));
        }
        Ok(())
    }
}

/// inputs for a flat (simple interest) loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatCostRateInput {
    pub principal: Money,
    /// total interest over the whole term as a share of principal
    pub flat_rate: Rate,
    pub term: u32,
    pub tax_rate: Option<Rate>,
}

impl FlatCostRateInput {
    pub fn new(principal: Money, flat_rate: Rate, term: u32) -> Self {
        Self {
            principal,
            flat_rate,
            term,
            tax_rate: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_loan(self.principal, self.term)?;
        if self.flat_rate.is_negative() {
            return Err(EngineError::terms(format!(
                "flat rate must not be negative, got {}",
                self.flat_rate
            )));
        }
        Ok(())
    }
}

/// itemized totals behind the CAT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub principal: Money,
    pub interest: Money,
    pub interest_tax: Money,
    pub fees: Money,
    pub insurance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRateResult {
    /// annualized total cost, percent with one decimal
    pub cat: Decimal,
    /// e.g. "45.6% Sin IVA"
    pub cat_label: String,
    /// periodic IRR found by the solver
    pub periodic_rate: Rate,
    /// contract rate compounded over 12 periods, percent, fees excluded
    pub effective_annual_rate: Decimal,
    pub total_payable: Money,
    pub total_interest: Money,
    pub total_interest_tax: Money,
    /// all-in installment including insurance and charges
    pub installment: Money,
    pub breakdown: CostBreakdown,
    pub solver: SolverOutcome,
}

impl CostRateResult {
    /// whether the CAT is an exact root rather than a best estimate
    pub fn is_exact(&self) -> bool {
        self.solver.converged()
    }
}

/// computes the CAT and its companion figures
#[derive(Debug, Clone, Default)]
pub struct CostRateCalculator {
    config: EngineConfig,
    solver: RateSolver,
}

impl CostRateCalculator {
    pub fn new(config: EngineConfig) -> Self {
        let solver = RateSolver::new(config.solver);
        Self { config, solver }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// CAT of an amortizing loan
    pub fn compute(&self, input: &CostRateInput) -> Result<CostRateResult> {
        input.validate()?;

        let tax_rate = input.tax_rate.unwrap_or(self.config.tax.standard_rate);
        let periods = Decimal::from(input.term);

        let base_installment = level_installment(input.principal, input.periodic_rate, input.term);
        let installment = base_installment + input.insurance_per_period + input.other_charges_per_period;
        let net_disbursed = input.principal - input.origination_fee;

        let effective_annual_rate = round_percent(annualized_raw(input.periodic_rate)?, 2);

        let flows = borrower_flows(net_disbursed, installment, input.term);
        let outcome = self.solver.solve(&flows, input.periodic_rate);
        let cat = annualized_percent(outcome.rate)?;

        let total_payable = installment * periods + input.origination_fee;
        let total_interest = base_installment * periods - input.principal;
        let total_interest_tax = total_interest.at_rate(tax_rate);

        Ok(CostRateResult {
            cat,
            cat_label: cat_label(cat),
            periodic_rate: outcome.rate,
            effective_annual_rate,
            total_payable: total_payable.round_cents(),
            total_interest: total_interest.round_cents(),
            total_interest_tax: total_interest_tax.round_cents(),
            installment: installment.round_cents(),
            breakdown: CostBreakdown {
                principal: input.principal.round_cents(),
                interest: total_interest.round_cents(),
                interest_tax: total_interest_tax.round_cents(),
                fees: input.origination_fee.round_cents(),
                insurance: (input.insurance_per_period * periods).round_cents(),
            },
            solver: outcome,
        })
    }

    /// CAT of a flat loan: interest fixed up front, uniform installments
    pub fn compute_flat(&self, input: &FlatCostRateInput) -> Result<CostRateResult> {
        input.validate()?;

        let tax_rate = input.tax_rate.unwrap_or(self.config.tax.standard_rate);
        let periods = Decimal::from(input.term);

        let total_interest = input.principal.at_rate(input.flat_rate);
        let total_payable = input.principal + total_interest;
        let installment = total_payable / periods;
        let total_interest_tax = total_interest.at_rate(tax_rate);

        let flows = borrower_flows(input.principal, installment, input.term);
        let outcome = self
            .solver
            .solve(&flows, Rate::from_decimal(FLAT_INITIAL_GUESS));
        let annual = annualized_raw(outcome.rate)?;
        let cat = round_percent(annual, 1);

        Ok(CostRateResult {
            cat,
            cat_label: cat_label(cat),
            periodic_rate: outcome.rate,
            // no periodic contract rate exists, so the CAT stands in
            effective_annual_rate: round_percent(annual, 2),
            total_payable: total_payable.round_cents(),
            total_interest: total_interest.round_cents(),
            total_interest_tax: total_interest_tax.round_cents(),
            installment: installment.round_cents(),
            breakdown: CostBreakdown {
                principal: input.principal.round_cents(),
                interest: total_interest.round_cents(),
                interest_tax: total_interest_tax.round_cents(),
                fees: Money::ZERO,
                insurance: Money::ZERO,
            },
            solver: outcome,
        })
    }

    /// CAT for full loan terms, routing flat loans to [`Self::compute_flat`]
    pub fn compute_for_terms(&self, terms: &LoanTerms) -> Result<CostRateResult> {
        terms.validate()?;

        match terms.system {
            AmortizationSystem::Flat => self.compute_flat(&FlatCostRateInput {
                principal: terms.principal,
                flat_rate: terms.flat_rate.unwrap_or(Rate::ZERO),
                term: terms.term,
                tax_rate: Some(terms.tax_rate),
            }),
            AmortizationSystem::EqualInstallment | AmortizationSystem::ConstantAmortization => {
                self.compute(&CostRateInput {
                    principal: terms.principal,
                    periodic_rate: terms.periodic_rate(),
                    term: terms.term,
                    origination_fee: terms.origination_fee,
                    insurance_per_period: terms.insurance_per_period,
                    other_charges_per_period: terms.other_charges_per_period,
                    tax_rate: Some(terms.tax_rate),
                })
            }
        }
    }

    /// advisory check of a CAT against the category's expected band
    pub fn check_range(&self, cat: Decimal, category: LoanCategory) -> CostRateCheck {
        validate_cost_rate(cat, category, &self.config.cost_rate_ranges)
    }
}

fn validate_loan(principal: Money, term: u32) -> Result<()> {
    if !principal.is_positive() {
        return Err(EngineError::terms(format!(
            "principal must be positive, got {principal}"
        )));
    }
    if term == 0 {
        return Err(EngineError::terms("term must be at least one period"));
    }
    Ok(())
}

/// disbursement at t=0, one outbound installment per period after
fn borrower_flows(disbursed: Money, installment: Money, term: u32) -> Vec<Money> {
    let mut flows = Vec::with_capacity(term as usize + 1);
    flows.push(disbursed);
    flows.extend(std::iter::repeat(-installment).take(term as usize));
    flows
}

/// (1 + r)^12 − 1 as a percent; a rate too large to annualize is rejected
fn annualized_raw(periodic: Rate) -> Result<Decimal> {
    periodic
        .compounded(ANNUALIZATION_PERIODS)
        .and_then(|annual| annual.as_decimal().checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| {
            EngineError::terms(format!(
                "periodic rate {} cannot be annualized within decimal range",
                periodic.as_decimal()
            ))
        })
}

/// annualized percent, one decimal
fn annualized_percent(periodic: Rate) -> Result<Decimal> {
    Ok(round_percent(annualized_raw(periodic)?, 1))
}

fn cat_label(cat: Decimal) -> String {
    format!("{cat:.1}% Sin IVA")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Termination;

    #[test]
    fn test_cat_without_fees_matches_contract_rate() {
        let input = CostRateInput::new(Money::from_major(10_000), Rate::from_percentage(2), 12);
        let result = CostRateCalculator::default().compute(&input).unwrap();

        assert!(result.is_exact());
        assert_eq!(result.periodic_rate.as_decimal().round_dp(6), dec!(0.02));
        // 1.02^12 − 1 = 26.824%
        assert_eq!(result.cat, dec!(26.8));
        assert_eq!(result.effective_annual_rate, dec!(26.82));
        assert_eq!(result.cat_label, "26.8% Sin IVA");
    }

    #[test]
    fn test_fees_and_insurance_raise_cat() {
        let plain = CostRateInput::new(Money::from_major(10_000), Rate::from_percentage(3), 12);
        let loaded = plain
            .clone()
            .with_origination_fee(Money::from_major(500))
            .with_insurance(Money::from_major(50))
            .with_other_charges(Money::from_major(25));

        let calculator = CostRateCalculator::default();
        let base = calculator.compute(&plain).unwrap();
        let full = calculator.compute(&loaded).unwrap();

        assert!(full.cat > base.cat);
        assert_eq!(full.effective_annual_rate, base.effective_annual_rate);
        assert_eq!(full.installment, base.installment + Money::from_major(75));
        assert_eq!(full.breakdown.fees, Money::from_major(500));
        assert_eq!(full.breakdown.insurance, Money::from_major(600));
    }

    #[test]
    fn test_totals() {
        let input = CostRateInput::new(Money::from_major(10_000), Rate::from_percentage(20), 12)
            .with_origination_fee(Money::from_major(500))
            .with_insurance(Money::from_major(50));
        let result = CostRateCalculator::default().compute(&input).unwrap();

        // base installment 2252.6496..., all-in 2302.6496...
        assert_eq!(result.installment, Money::from_decimal(dec!(2302.65)));
        assert_eq!(result.total_interest, Money::from_decimal(dec!(17031.80)));
        assert_eq!(result.total_interest_tax, Money::from_decimal(dec!(2725.09)));
        assert_eq!(result.total_payable, Money::from_decimal(dec!(28131.80)));
        assert_eq!(result.breakdown.principal, Money::from_major(10_000));
    }

    #[test]
    fn test_annualization_identity() {
        let input = CostRateInput::new(Money::from_major(25_000), Rate::from_percent(dec!(4.5)), 18)
            .with_origination_fee(Money::from_major(750));
        let result = CostRateCalculator::default().compute(&input).unwrap();

        let expected = round_percent(result.periodic_rate.compounded(12).unwrap().as_percentage(), 1);
        assert_eq!(result.cat, expected);
    }

    #[test]
    fn test_zero_rate_loan() {
        let input = CostRateInput::new(Money::from_major(1_200), Rate::ZERO, 12);
        let result = CostRateCalculator::default().compute(&input).unwrap();

        assert_eq!(result.cat, Decimal::ZERO);
        assert_eq!(result.total_interest, Money::ZERO);
        assert_eq!(result.installment, Money::from_major(100));
    }

    #[test]
    fn test_flat_cat() {
        let input = FlatCostRateInput::new(Money::from_major(15_000), Rate::from_percentage(10), 3);
        let result = CostRateCalculator::default().compute_flat(&input).unwrap();

        assert!(result.is_exact());
        assert_eq!(result.total_interest, Money::from_major(1_500));
        assert_eq!(result.total_interest_tax, Money::from_major(240));
        assert_eq!(result.installment, Money::from_major(5_500));
        assert_eq!(result.total_payable, Money::from_major(16_500));
        assert!((result.effective_annual_rate - result.cat).abs() <= dec!(0.1));
        assert!(result.cat > dec!(0));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let calculator = CostRateCalculator::default();

        let zero_term = CostRateInput::new(Money::from_major(1_000), Rate::from_percentage(2), 0);
        assert!(matches!(calculator.compute(&zero_term), Err(EngineError::InvalidLoanTerms { .. })));

        let big_fee = CostRateInput::new(Money::from_major(1_000), Rate::from_percentage(2), 6)
            .with_origination_fee(Money::from_major(1_000));
        assert!(calculator.compute(&big_fee).is_err());

        let flat = FlatCostRateInput::new(Money::ZERO, Rate::from_percentage(10), 3);
        assert!(calculator.compute_flat(&flat).is_err());
    }

    #[test]
    fn test_rate_too_large_to_annualize_is_rejected() {
        use crate::amortization::build_schedule;
        use chrono::NaiveDate;

        let input = CostRateInput::new(Money::from_major(10_000), Rate::from_decimal(dec!(500)), 12);
        let err = CostRateCalculator::default().compute(&input).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLoanTerms { .. }));

        let terms = LoanTerms::builder()
            .principal(Money::from_major(10_000))
            .monthly_rate(Rate::from_decimal(dec!(500)))
            .term(12)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .build()
            .unwrap();
        assert!(build_schedule(&terms).is_ok());
        assert!(CostRateCalculator::default().compute_for_terms(&terms).is_err());
    }

    #[test]
    fn test_wide_solver_clamp_does_not_panic() {
        // config built directly, never validated
        let mut config = EngineConfig::default();
        config.solver.max_rate = dec!(1000);
        let calculator = CostRateCalculator::new(config);

        let input = FlatCostRateInput::new(Money::from_major(100), Rate::from_percentage(100_000), 1);
        let err = calculator.compute_flat(&input).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLoanTerms { .. }));
    }

    #[test]
    fn test_degenerate_cash_flow_is_reported() {
        let mut config = EngineConfig::default();
        config.solver.max_iterations = 1;
        let calculator = CostRateCalculator::new(config);

        let input = CostRateInput::new(Money::from_major(10_000), Rate::from_percentage(20), 12)
            .with_origination_fee(Money::from_major(4_000));
        let result = calculator.compute(&input).unwrap();

        assert!(!result.is_exact());
        assert_eq!(result.solver.termination, Termination::MaxIterations);
    }

    #[test]
    fn test_compute_for_terms_routes_by_system() {
        use chrono::NaiveDate;

        let builder = LoanTerms::builder()
            .principal(Money::from_major(15_000))
            .monthly_rate(Rate::from_percentage(3))
            .flat_rate(Rate::from_percentage(10))
            .term(3)
            .start_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        let calculator = CostRateCalculator::default();
        let flat = calculator
            .compute_for_terms(&builder.clone().system(AmortizationSystem::Flat).build().unwrap())
            .unwrap();
        assert_eq!(flat.total_interest, Money::from_major(1_500));

        let french = calculator
            .compute_for_terms(&builder.system(AmortizationSystem::EqualInstallment).build().unwrap())
            .unwrap();
        assert_eq!(french.effective_annual_rate, dec!(42.58));
    }
}
