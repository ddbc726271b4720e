use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// caller-supplied identifier for a loan
pub type LoanId = Uuid;

/// installment cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    /// every 7 days
    Weekly,
    /// every 15 days
    Biweekly,
    /// every calendar month
    Monthly,
}

impl PaymentFrequency {
    /// number of installments in a year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 24,
            PaymentFrequency::Monthly => 12,
        }
    }

    /// divisor turning a monthly rate into a rate for this period.
    /// weekly uses 4.33 weeks per month, an approximation rather than a day count
    pub fn monthly_rate_divisor(&self) -> Decimal {
        match self {
            PaymentFrequency::Weekly => dec!(4.33),
            PaymentFrequency::Biweekly => dec!(2),
            PaymentFrequency::Monthly => Decimal::ONE,
        }
    }

    /// due date of installment `period` (1-based) for a loan starting on `start`
    ///
    /// monthly dates are anchored to the start date and clamp to the last day
    /// of shorter months, so a loan opened on Jan 31 falls due on Feb 28/29,
    /// Mar 31, Apr 30 and so on.
    pub fn due_date(&self, start: NaiveDate, period: u32) -> Option<NaiveDate> {
        match self {
            PaymentFrequency::Weekly => start.checked_add_days(Days::new(7 * period as u64)),
            PaymentFrequency::Biweekly => start.checked_add_days(Days::new(15 * period as u64)),
            PaymentFrequency::Monthly => start.checked_add_months(Months::new(period)),
        }
    }
}

/// amortization system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationSystem {
    /// french: constant installment, interest on declining balance
    #[serde(alias = "french", alias = "frances")]
    EqualInstallment,
    /// german: constant principal portion, declining installments
    #[serde(alias = "german", alias = "aleman")]
    ConstantAmortization,
    /// simple interest computed up front and spread evenly
    #[serde(alias = "simple")]
    Flat,
}

impl AmortizationSystem {
    /// lenient selector; anything unrecognised falls back to equal-installment
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "equal_installment" | "french" | "frances" => AmortizationSystem::EqualInstallment,
            "constant_amortization" | "german" | "aleman" => AmortizationSystem::ConstantAmortization,
            "flat" | "simple" => AmortizationSystem::Flat,
            other => {
                tracing::warn!(
                    selector = other,
                    "unknown amortization system, falling back to equal installment"
                );
                AmortizationSystem::EqualInstallment
            }
        }
    }
}

impl Default for AmortizationSystem {
    fn default() -> Self {
        AmortizationSystem::EqualInstallment
    }
}

/// payment status of a scheduled installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    PartiallyPaid,
}

impl PaymentStatus {
    /// installment still owed in full
    pub fn is_unpaid(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Overdue)
    }
}

/// credit product category used for CAT range checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCategory {
    Personal,
    Payroll,
    SmallBusiness,
    Mortgage,
}

impl LoanCategory {
    pub fn label(&self) -> &'static str {
        match self {
            LoanCategory::Personal => "personal",
            LoanCategory::Payroll => "payroll",
            LoanCategory::SmallBusiness => "small business",
            LoanCategory::Mortgage => "mortgage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_periods_per_year() {
        assert_eq!(PaymentFrequency::Weekly.periods_per_year(), 52);
        assert_eq!(PaymentFrequency::Biweekly.periods_per_year(), 24);
        assert_eq!(PaymentFrequency::Monthly.periods_per_year(), 12);
    }

    #[test]
    fn test_day_based_due_dates() {
        let start = date(2024, 12, 20);
        assert_eq!(PaymentFrequency::Weekly.due_date(start, 2), Some(date(2025, 1, 3)));
        assert_eq!(PaymentFrequency::Biweekly.due_date(start, 1), Some(date(2025, 1, 4)));
    }

    #[test]
    fn test_monthly_due_dates_clamp_and_roll_over() {
        let start = date(2024, 1, 31);
        let monthly = PaymentFrequency::Monthly;
        assert_eq!(monthly.due_date(start, 1), Some(date(2024, 2, 29)));
        assert_eq!(monthly.due_date(start, 2), Some(date(2024, 3, 31)));
        assert_eq!(monthly.due_date(start, 3), Some(date(2024, 4, 30)));
        assert_eq!(monthly.due_date(start, 12), Some(date(2025, 1, 31)));
        assert_eq!(monthly.due_date(start, 13), Some(date(2025, 2, 28)));
    }

    #[test]
    fn test_system_selector() {
        assert_eq!(AmortizationSystem::from_selector("aleman"), AmortizationSystem::ConstantAmortization);
        assert_eq!(AmortizationSystem::from_selector(" Simple "), AmortizationSystem::Flat);
        assert_eq!(AmortizationSystem::from_selector("french"), AmortizationSystem::EqualInstallment);
        assert_eq!(AmortizationSystem::from_selector("balloon"), AmortizationSystem::EqualInstallment);
    }

    #[test]
    fn test_system_serde_aliases() {
        let system: AmortizationSystem = serde_json::from_str("\"aleman\"").unwrap();
        assert_eq!(system, AmortizationSystem::ConstantAmortization);
        let json = serde_json::to_string(&AmortizationSystem::Flat).unwrap();
        assert_eq!(json, "\"flat\"");
    }

    #[test]
    fn test_unpaid_statuses() {
        assert!(PaymentStatus::Pending.is_unpaid());
        assert!(PaymentStatus::Overdue.is_unpaid());
        assert!(!PaymentStatus::Paid.is_unpaid());
        assert!(!PaymentStatus::PartiallyPaid.is_unpaid());
    }
}
