//! Finance engine for mexican consumer loans.
//!
//! Three cooperating calculators over the same loan terms:
//!
//! - [`AmortizationTable`] builds a repayment schedule under the french,
//!   german or flat system.
//! - [`CostRateCalculator`] derives the CAT (annualized total cost) from the
//!   borrower's cash flows with a Newton-Raphson [`RateSolver`].
//! - [`TaxBreakdownCalculator`] itemizes IVA over principal, interest, fees and
//!   insurance.
//!
//! Every operation is a pure function of its inputs. Amounts are decimal and
//! rounded to cents where they are emitted.

pub mod amortization;
pub mod config;
pub mod cost;
pub mod decimal;
pub mod errors;
pub mod penalty;
pub mod solver;
pub mod tax;
pub mod terms;
pub mod types;

// re-export key types
pub use amortization::{
    build_schedule, level_installment, AmortizationEngine, AmortizationRow, AmortizationSummary,
    AmortizationTable, OutstandingPosition,
};
pub use config::{
    CostRateRanges, EngineConfig, LatePaymentConfig, PercentRange, SolverConfig, TaxConfig, MAX_SOLVER_RATE,
};
pub use cost::{
    validate_cost_rate, CostBreakdown, CostRateCalculator, CostRateCheck, CostRateInput, CostRateResult,
    FlatCostRateInput,
};
pub use decimal::{Money, Rate};
pub use errors::{EngineError, Result};
pub use penalty::{LatePaymentCalculator, LatePaymentCharge};
pub use solver::{npv, RateSolver, SolverOutcome, Termination};
pub use tax::{
    fiscal_legend, is_border_municipality, validate_rfc, RfcValidation, TaxBreakdown, TaxBreakdownCalculator,
    TaxConcept, TaxLineItem, TaxpayerKind,
};
pub use terms::{LoanTerms, LoanTermsBuilder};
pub use types::{AmortizationSystem, LoanCategory, LoanId, PaymentFrequency, PaymentStatus};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
