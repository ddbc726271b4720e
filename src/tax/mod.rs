//! IVA itemization of a loan.
//!
//! Principal and debtor insurance are exempt. Interest, origination fees and
//! late-payment interest are taxed at the standard rate, or at the reduced
//! rate for the northern border region.

pub mod border;
pub mod rfc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizationSummary;
use crate::config::TaxConfig;
use crate::decimal::{Money, Rate};
use crate::terms::LoanTerms;

pub use border::{is_border_municipality, BORDER_MUNICIPALITIES};
pub use rfc::{fiscal_legend, validate_rfc, RfcValidation, TaxpayerKind};

/// cash-flow component of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxConcept {
    Principal,
    Interest,
    OriginationFee,
    Insurance,
    LateInterest,
}

impl TaxConcept {
    pub fn label(&self) -> &'static str {
        match self {
            TaxConcept::Principal => "Principal",
            TaxConcept::Interest => "Interest",
            TaxConcept::OriginationFee => "Origination fee",
            TaxConcept::Insurance => "Debtor life insurance",
            TaxConcept::LateInterest => "Late-payment interest",
        }
    }

    pub fn is_exempt(&self) -> bool {
        matches!(self, TaxConcept::Principal | TaxConcept::Insurance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLineItem {
    pub concept: TaxConcept,
    pub label: String,
    pub subtotal: Money,
    /// applied rate in percent; zero when exempt
    pub tax_rate: Decimal,
    pub tax_amount: Money,
    pub total: Money,
    pub exempt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub items: Vec<TaxLineItem>,
    pub taxable_subtotal: Money,
    pub exempt_subtotal: Money,
    pub total_tax: Money,
    pub grand_total: Money,
    pub legend: String,
}

impl TaxBreakdown {
    pub fn item(&self, concept: TaxConcept) -> Option<&TaxLineItem> {
        self.items.iter().find(|item| item.concept == concept)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaxBreakdownCalculator {
    config: TaxConfig,
}

impl TaxBreakdownCalculator {
    pub fn new(config: TaxConfig) -> Self {
        Self { config }
    }

    pub fn rate_for(&self, border_zone: bool) -> Rate {
        self.config.rate_for(border_zone)
    }

    /// itemize principal, interest, origination fee and insurance
    pub fn build_breakdown(
        &self,
        principal: Money,
        interest: Money,
        origination_fee: Money,
        insurance_total: Money,
        border_zone: bool,
    ) -> TaxBreakdown {
        self.itemize(
            principal,
            interest,
            origination_fee,
            insurance_total,
            self.rate_for(border_zone),
        )
    }

    /// itemize a generated schedule using the terms' own IVA rate
    pub fn build_for_loan(&self, terms: &LoanTerms, summary: &AmortizationSummary) -> TaxBreakdown {
        let insurance_total = terms.insurance_per_period * Decimal::from(terms.term);
        self.itemize(
            summary.total_principal,
            summary.total_interest,
            terms.origination_fee,
            insurance_total,
            terms.tax_rate,
        )
    }

    /// taxable line for moratorium interest, outside the main breakdown
    pub fn late_interest_line(&self, amount: Money, border_zone: bool) -> TaxLineItem {
        taxable_line(TaxConcept::LateInterest, amount, self.rate_for(border_zone))
    }

    fn itemize(
        &self,
        principal: Money,
        interest: Money,
        origination_fee: Money,
        insurance_total: Money,
        rate: Rate,
    ) -> TaxBreakdown {
        let mut items = vec![exempt_line(TaxConcept::Principal, principal)];

        if interest.is_positive() {
            items.push(taxable_line(TaxConcept::Interest, interest, rate));
        }
        if origination_fee.is_positive() {
            items.push(taxable_line(TaxConcept::OriginationFee, origination_fee, rate));
        }
        if insurance_total.is_positive() {
            items.push(exempt_line(TaxConcept::Insurance, insurance_total));
        }

        let taxable_subtotal: Money = items.iter().filter(|i| !i.exempt).map(|i| i.subtotal).sum();
        let exempt_subtotal: Money = items.iter().filter(|i| i.exempt).map(|i| i.subtotal).sum();
        let total_tax: Money = items.iter().map(|i| i.tax_amount).sum();
        let grand_total: Money = items.iter().map(|i| i.total).sum();

        TaxBreakdown {
            items,
            taxable_subtotal: taxable_subtotal.round_cents(),
            exempt_subtotal: exempt_subtotal.round_cents(),
            total_tax: total_tax.round_cents(),
            grand_total: grand_total.round_cents(),
            legend: format!(
                "IVA calculated at {}% under the current value added tax law.",
                rate.as_percentage().normalize()
            ),
        }
    }
}

/// taxable component; each amount rounded to cents on its own
pub fn taxable_line(concept: TaxConcept, amount: Money, rate: Rate) -> TaxLineItem {
    let tax = amount.at_rate(rate);
    TaxLineItem {
        concept,
        label: concept.label().to_string(),
        subtotal: amount.round_cents(),
        tax_rate: rate.as_percentage().normalize(),
        tax_amount: tax.round_cents(),
        total: (amount + tax).round_cents(),
        exempt: false,
    }
}

/// exempt component: no tax, total equals subtotal
pub fn exempt_line(concept: TaxConcept, amount: Money) -> TaxLineItem {
    let subtotal = amount.round_cents();
    TaxLineItem {
        concept,
        label: concept.label().to_string(),
        subtotal,
        tax_rate: Decimal::ZERO,
        tax_amount: Money::ZERO,
        total: subtotal,
        exempt: true,
    }
}
