use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// internal precision kept between emission points
const WORKING_DP: u32 = 8;

/// currency amount, carried at 8 decimal places and emitted at cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(WORKING_DP))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(WORKING_DP)))
    }

    /// create from whole pesos
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from centavos
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, 2))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to cents, half away from zero
    pub fn round_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// apply a rate (e.g., interest = balance.at_rate(r))
    pub fn at_rate(&self, rate: Rate) -> Self {
        Money((self.0 * rate.as_decimal()).round_dp(WORKING_DP))
    }

    /// format as mexican pesos, e.g. `$12,345.67`
    pub fn format_mxn(&self) -> String {
        let cents = self.round_cents().0;
        let text = format!("{:.2}", cents.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if cents < Decimal::ZERO { "-" } else { "" };
        format!("{sign}${grouped}.{fraction}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(WORKING_DP))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(WORKING_DP);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(WORKING_DP))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(WORKING_DP);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(WORKING_DP))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(WORKING_DP))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

/// rate type for interest rates, tax rates and ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from whole percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from a fractional percentage (e.g., 3.5 for 3.5%)
    pub fn from_percent(p: Decimal) -> Self {
        Rate(p / Decimal::from(100))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// effective rate after compounding this periodic rate `periods` times;
    /// `None` when the growth factor leaves decimal range
    pub fn compounded(&self, periods: u32) -> Option<Rate> {
        let factor = compound_factor(Decimal::ONE.checked_add(self.0)?, periods)?;
        Some(Rate(factor - Decimal::ONE))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

/// base^n by repeated checked multiplication
pub fn compound_factor(base: Decimal, n: u32) -> Option<Decimal> {
    (0..n).try_fold(Decimal::ONE, |factor, _| factor.checked_mul(base))
}

/// round a percent figure, half away from zero
pub fn round_percent(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.123456789").unwrap();
        assert_eq!(m.to_string(), "100.12345679");
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(2.345)).round_cents(), Money::from_minor(235));
        assert_eq!(Money::from_decimal(dec!(2.335)).round_cents(), Money::from_minor(234));
        assert_eq!(Money::from_decimal(dec!(-2.345)).round_cents(), Money::from_minor(-235));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(150_000), Money::from_major(1_500));
        assert_eq!(Money::from_minor(1), Money::CENT);
    }

    #[test]
    fn test_format_mxn() {
        assert_eq!(Money::from_decimal(dec!(1234567.891)).format_mxn(), "$1,234,567.89");
        assert_eq!(Money::from_major(500).format_mxn(), "$500.00");
        assert_eq!(Money::from_decimal(dec!(-1000.5)).format_mxn(), "-$1,000.50");
        assert_eq!(Money::ZERO.format_mxn(), "$0.00");
    }

    #[test]
    fn test_rate_construction() {
        assert_eq!(Rate::from_percentage(16).as_decimal(), dec!(0.16));
        assert_eq!(Rate::from_percent(dec!(3.5)).as_decimal(), dec!(0.035));
        assert_eq!(Rate::from_percentage(8).as_percentage(), dec!(8));
    }

    #[test]
    fn test_compounded_rate() {
        let monthly = Rate::from_percentage(1);
        let annual = monthly.compounded(12).unwrap();
        assert_eq!(round_percent(annual.as_percentage(), 2), dec!(12.68));
        assert_eq!(Rate::ZERO.compounded(12), Some(Rate::ZERO));
    }

    #[test]
    fn test_compounding_out_of_range() {
        assert!(Rate::from_decimal(dec!(500)).compounded(12).is_none());
        assert_eq!(compound_factor(dec!(501), 12), None);
        assert_eq!(compound_factor(dec!(2), 10), Some(dec!(1024)));
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::from_major(1), Money::from_minor(50), Money::from_minor(25)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_minor(175));
    }
}
