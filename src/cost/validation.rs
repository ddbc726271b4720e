use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{CostRateRanges, PercentRange};
use crate::types::LoanCategory;

/// advisory result of checking a CAT against its product band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRateCheck {
    pub is_within_range: bool,
    pub warning: Option<String>,
    pub expected_range: PercentRange,
}

/// compare a CAT (percent) with the expected band for `category`; never blocks
pub fn validate_cost_rate(cat: Decimal, category: LoanCategory, ranges: &CostRateRanges) -> CostRateCheck {
    let expected_range = ranges.for_category(category);
    let is_within_range = expected_range.contains(cat);

    let warning = if is_within_range {
        None
    } else if cat < expected_range.min {
        Some(format!(
            "CAT of {cat:.1}% looks too low for a {} loan, verify the inputs",
            category.label()
        ))
    } else {
        Some(format!(
            "CAT of {cat:.1}% exceeds the typical range for {} loans, consider reviewing the conditions",
            category.label()
        ))
    };

    if let Some(message) = &warning {
        tracing::debug!(%cat, ?category, warning = %message, "CAT outside expected range");
    }

    CostRateCheck {
        is_within_range,
        warning,
        expected_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_within_range() {
        let check = validate_cost_rate(dec!(45.6), LoanCategory::Personal, &CostRateRanges::default());
        assert!(check.is_within_range);
        assert!(check.warning.is_none());
        assert_eq!(check.expected_range, PercentRange::new(dec!(20), dec!(150)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let ranges = CostRateRanges::default();
        assert!(validate_cost_rate(dec!(8), LoanCategory::Mortgage, &ranges).is_within_range);
        assert!(validate_cost_rate(dec!(25), LoanCategory::Mortgage, &ranges).is_within_range);
    }

    #[test]
    fn test_agrees_with_range_membership() {
        let ranges = CostRateRanges::default();
        for cat in [dec!(14.9), dec!(15), dec!(47.5), dec!(80), dec!(80.1)] {
            let check = validate_cost_rate(cat, LoanCategory::Payroll, &ranges);
            assert_eq!(check.is_within_range, ranges.payroll.contains(cat));
            assert_eq!(check.warning.is_none(), check.is_within_range);
        }
    }

    #[test]
    fn test_too_low() {
        let check = validate_cost_rate(dec!(12.5), LoanCategory::Payroll, &CostRateRanges::default());
        assert!(!check.is_within_range);
        let warning = check.warning.unwrap();
        assert!(warning.contains("too low"));
        assert!(warning.contains("payroll"));
    }

    #[test]
    fn test_too_high() {
        let check = validate_cost_rate(dec!(140), LoanCategory::SmallBusiness, &CostRateRanges::default());
        assert!(!check.is_within_range);
        assert!(check.warning.unwrap().contains("exceeds"));
        assert_eq!(check.expected_range.max, dec!(100));
    }
}
