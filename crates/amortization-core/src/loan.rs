use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::AmortizationError;
use crate::payment::payment;
use crate::rate::period_rate;
use crate::schedule::{generate_schedule, Schedule, Totals};
use crate::types::*;
use crate::AmortizationResult;

/// Check loan terms and derive the per-period rate.
///
/// A zero period rate from a positive annual rate is rejected here, before
/// any payment is computed.
pub fn validate_terms(terms: &LoanTerms) -> AmortizationResult<Rate> {
    if terms.principal <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "principal".into(),
            reason: "Loan amount must be positive".into(),
        });
    }
    if terms.annual_rate_pct <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Interest rate must be positive".into(),
        });
    }
    if terms.periods == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "periods".into(),
            reason: "Number of payments must be at least 1".into(),
        });
    }
    if terms.insurance_per_period < Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "insurance_per_period".into(),
            reason: "Insurance cannot be negative".into(),
        });
    }

    let rate = period_rate(terms.annual_rate_pct, terms.frequency);
    if rate <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Rate is too small to yield a positive period rate".into(),
        });
    }
    Ok(rate)
}

/// Validated terms with their derived rate, payment and baseline schedule.
#[derive(Debug, Clone)]
pub struct LoanContext {
    pub terms: LoanTerms,
    pub period_rate: Rate,
    pub payment: Money,
    pub baseline: Schedule,
}

impl LoanContext {
    pub fn new(terms: &LoanTerms) -> AmortizationResult<Self> {
        let rate = validate_terms(terms)?;
        let pmt = payment(terms.principal, rate, terms.periods)?;
        let baseline = generate_schedule(
            terms.principal,
            rate,
            pmt,
            terms.periods,
            terms.insurance_per_period,
            None,
        );
        Ok(LoanContext {
            terms: terms.clone(),
            period_rate: rate,
            payment: pmt,
            baseline,
        })
    }
}

/// Headline figures of a loan without extra payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub base_payment: Money,
    pub insurance_per_period: Money,
    /// Base payment plus insurance
    pub total_periodic_payment: Money,
    pub frequency: String,
    pub periods_per_year: u32,
    pub period_rate: Rate,
    pub period_rate_pct: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub summary: PaymentSummary,
    pub schedule: Schedule,
    pub totals: Totals,
    /// Capital + interest + insurance over the life of the loan
    pub total_credit_paid: Money,
}

/// Payment summary and full baseline amortization table for a loan.
pub fn amortize(terms: &LoanTerms) -> AmortizationResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let ctx = LoanContext::new(terms)?;

    let summary = PaymentSummary {
        base_payment: ctx.payment,
        insurance_per_period: terms.insurance_per_period,
        total_periodic_payment: ctx.payment + terms.insurance_per_period,
        frequency: terms.frequency.label().to_string(),
        periods_per_year: terms.frequency.periods_per_year(),
        period_rate: ctx.period_rate,
        period_rate_pct: (ctx.period_rate * dec!(100)).round_dp(4),
    };

    let totals = ctx.baseline.totals.clone();
    let output = AmortizationOutput {
        summary,
        total_credit_paid: totals.total_paid(),
        totals,
        schedule: ctx.baseline,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-instalment (French) amortization with effective period rate",
        &loan_assumptions(terms, ctx.period_rate),
        Vec::new(),
        elapsed,
        output,
    ))
}
