use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{EngineError, Result};
use crate::types::LoanCategory;

/// highest periodic rate the solver may clamp to; (1 + r)^12 as a percent
/// must stay inside decimal range so a solved rate can always be annualized
pub const MAX_SOLVER_RATE: Decimal = dec!(100);

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig,
    pub tax: TaxConfig,
    pub cost_rate_ranges: CostRateRanges,
    pub late_payment: LatePaymentConfig,
}

/// newton-raphson settings for the internal rate of return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// stop once |NPV| falls below this
    pub tolerance: Decimal,
    pub max_iterations: u32,
    /// lower clamp for the periodic rate after every step
    pub min_rate: Decimal,
    /// upper clamp for the periodic rate after every step
    pub max_rate: Decimal,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: dec!(0.0000001),
            max_iterations: 100,
            min_rate: dec!(-0.99),
            max_rate: dec!(10),
        }
    }
}

/// value added tax rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub standard_rate: Rate,
    /// reduced rate for the northern border region
    pub border_zone_rate: Rate,
}

impl TaxConfig {
    pub fn rate_for(&self, border_zone: bool) -> Rate {
        if border_zone {
            self.border_zone_rate
        } else {
            self.standard_rate
        }
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            standard_rate: Rate::from_percentage(16),
            border_zone_rate: Rate::from_percentage(8),
        }
    }
}

/// expected CAT band, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PercentRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }
}

/// expected CAT band per credit product
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRateRanges {
    pub personal: PercentRange,
    pub payroll: PercentRange,
    pub small_business: PercentRange,
    pub mortgage: PercentRange,
}

impl CostRateRanges {
    pub fn for_category(&self, category: LoanCategory) -> PercentRange {
        match category {
            LoanCategory::Personal => self.personal,
            LoanCategory::Payroll => self.payroll,
            LoanCategory::SmallBusiness => self.small_business,
            LoanCategory::Mortgage => self.mortgage,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (LoanCategory, PercentRange)> + '_ {
        [
            LoanCategory::Personal,
            LoanCategory::Payroll,
            LoanCategory::SmallBusiness,
            LoanCategory::Mortgage,
        ]
        .into_iter()
        .map(|category| (category, self.for_category(category)))
    }
}

impl Default for CostRateRanges {
    fn default() -> Self {
        Self {
            personal: PercentRange::new(dec!(20), dec!(150)),
            payroll: PercentRange::new(dec!(15), dec!(80)),
            small_business: PercentRange::new(dec!(18), dec!(100)),
            mortgage: PercentRange::new(dec!(8), dec!(25)),
        }
    }
}

/// moratorium interest settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatePaymentConfig {
    /// charged per day overdue on the installment amount
    pub daily_rate: Rate,
}

impl Default for LatePaymentConfig {
    fn default() -> Self {
        Self {
            daily_rate: Rate::from_percent(dec!(0.1)),
        }
    }
}

impl EngineConfig {
    /// parse a JSON document; missing sections take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let solver = &self.solver;
        if solver.tolerance <= Decimal::ZERO {
            return Err(EngineError::config("solver tolerance must be positive"));
        }
        if solver.max_iterations == 0 {
            return Err(EngineError::config("solver needs at least one iteration"));
        }
        if solver.min_rate <= dec!(-1) {
            return Err(EngineError::config("solver min_rate must be above -100%"));
        }
        if solver.max_rate > MAX_SOLVER_RATE {
            return Err(EngineError::config(format!(
                "solver max_rate {} exceeds {}",
                solver.max_rate, MAX_SOLVER_RATE
            )));
        }
        if solver.min_rate >= solver.max_rate {
            return Err(EngineError::config(format!(
                "solver clamp is inverted: min {} >= max {}",
                solver.min_rate, solver.max_rate
            )));
        }

        for (label, rate) in [
            ("standard", self.tax.standard_rate),
            ("border zone", self.tax.border_zone_rate),
        ] {
            if rate.is_negative() || rate > Rate::ONE {
                return Err(EngineError::config(format!("{label} tax rate {rate} out of range")));
            }
        }

        for (category, range) in self.cost_rate_ranges.iter() {
            if range.min > range.max {
                return Err(EngineError::config(format!(
                    "{} CAT range is inverted: {} > {}",
                    category.label(),
                    range.min,
                    range.max
                )));
            }
        }

        if self.late_payment.daily_rate.is_negative() {
            return Err(EngineError::config("late payment daily rate must not be negative"));
        }

        Ok(())
    }
}
