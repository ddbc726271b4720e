//! Newton-Raphson solver for the internal rate of return of a cash-flow series.
//!
//! Flows are indexed by period: `flows[0]` is the initial (usually inbound)
//! amount and `flows[1..]` the periodic payments. The solver looks for the
//! periodic rate `r` at which `Σ flows[t] / (1 + r)^t` is zero.
//!
//! Failing to converge is not an error. The solver always hands back a finite
//! rate inside the configured clamp together with a [`Termination`] reason,
//! and callers decide how much to trust an approximate answer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::decimal::{Money, Rate};

/// why the iteration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// |NPV| dropped below the tolerance
    Converged,
    /// the NPV curve is flat at the current estimate
    ZeroDerivative,
    /// iteration cap reached
    MaxIterations,
    /// discounting overflowed decimal range at the current estimate
    Overflow,
}

/// rate found by the solver plus diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub rate: Rate,
    /// NPV at `rate`, or at the last estimate that could be evaluated
    pub npv: Decimal,
    pub iterations: u32,
    pub termination: Termination,
}

impl SolverOutcome {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

/// internal rate of return solver
#[derive(Debug, Clone, Default)]
pub struct RateSolver {
    config: SolverConfig,
}

impl RateSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// solve for the periodic rate that zeroes the NPV of `flows`
    pub fn solve(&self, flows: &[Money], guess: Rate) -> SolverOutcome {
        let tolerance = self.config.tolerance;
        let mut rate = self.clamp(guess.as_decimal());
        let mut last_npv = Decimal::ZERO;

        for iteration in 0..self.config.max_iterations {
            let Some((value, derivative)) = npv_with_derivative(flows, rate) else {
                return self.finish(rate, last_npv, iteration, Termination::Overflow);
            };
            last_npv = value;

            if value.abs() < tolerance {
                return self.finish(rate, value, iteration, Termination::Converged);
            }

            if derivative.is_zero() {
                return self.finish(rate, value, iteration, Termination::ZeroDerivative);
            }

            let Some(next) = value
                .checked_div(derivative)
                .and_then(|step| rate.checked_sub(step))
            else {
                return self.finish(rate, value, iteration, Termination::Overflow);
            };
            rate = self.clamp(next);
        }

        let final_npv = npv(flows, Rate::from_decimal(rate)).unwrap_or(last_npv);
        self.finish(rate, final_npv, self.config.max_iterations, Termination::MaxIterations)
    }

    fn clamp(&self, rate: Decimal) -> Decimal {
        rate.max(self.config.min_rate).min(self.config.max_rate)
    }

    fn finish(&self, rate: Decimal, npv: Decimal, iterations: u32, termination: Termination) -> SolverOutcome {
        if termination == Termination::Converged {
            tracing::debug!(%rate, iterations, "rate solver converged");
        } else {
            tracing::warn!(
                %rate,
                %npv,
                iterations,
                ?termination,
                "rate solver stopped without converging, returning best estimate"
            );
        }

        SolverOutcome {
            rate: Rate::from_decimal(rate),
            npv,
            iterations,
            termination,
        }
    }
}

/// net present value of `flows` at a periodic `rate`; `None` when the
/// discount factors leave decimal range
pub fn npv(flows: &[Money], rate: Rate) -> Option<Decimal> {
    npv_with_derivative(flows, rate.as_decimal()).map(|(value, _)| value)
}

/// NPV and dNPV/dr, discounting with v = 1 / (1 + r)
fn npv_with_derivative(flows: &[Money], rate: Decimal) -> Option<(Decimal, Decimal)> {
    let v = Decimal::ONE.checked_div(Decimal::ONE.checked_add(rate)?)?;

    let mut discount = Decimal::ONE;
    let mut value = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;

    for (t, flow) in flows.iter().enumerate() {
        let cf = flow.as_decimal();
        value = value.checked_add(cf.checked_mul(discount)?)?;

        let next = discount.checked_mul(v)?;
        if t > 0 {
            let term = Decimal::from(t as u64).checked_mul(cf)?.checked_mul(next)?;
            derivative = derivative.checked_sub(term)?;
        }
        discount = next;
    }

    Some((value, derivative))
}
