//! Extra-payment strategies.
//!
//! Every strategy is a value of [`StrategyRequest`]; [`run_strategy`]
//! validates it against the loan, builds the matching schedule and reports
//! savings against the baseline (no extra payments) schedule.

pub mod comparative;
pub mod extra_payment;
pub mod installment_reduction;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::AmortizationError;
use crate::loan::LoanContext;
use crate::schedule::{Schedule, Totals};
use crate::types::*;
use crate::AmortizationResult;

pub use comparative::ComparativeResult;

/// One extra payment of a multi-payment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledExtra {
    pub period: u32,
    pub amount: Money,
}

/// A what-if scenario to evaluate against the baseline schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyRequest {
    /// Lump-sum capital reduction at one period, same instalment
    Single { at_period: u32, amount: Money },
    /// Same extra capital every period from `from_period`
    Recurring { from_period: u32, amount: Money },
    /// Extra capital for each period of an inclusive window
    Windowed {
        from_period: u32,
        to_period: u32,
        amount: Money,
    },
    /// Lump sum that lowers the instalment and keeps the term
    InstallmentReduction { at_period: u32, amount: Money },
    /// Several lump sums at distinct periods
    ScheduledMultiple { payments: Vec<ScheduledExtra> },
    /// Single vs installment reduction vs baseline
    Comparative { at_period: u32, amount: Money },
}

impl StrategyRequest {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyRequest::Single { .. } => "Single extra payment",
            StrategyRequest::Recurring { .. } => "Recurring extra payment",
            StrategyRequest::Windowed { .. } => "Windowed extra payment",
            StrategyRequest::InstallmentReduction { .. } => "Installment reduction",
            StrategyRequest::ScheduledMultiple { .. } => "Scheduled extra payments",
            StrategyRequest::Comparative { .. } => "Term vs installment reduction",
        }
    }
}

/// Schedule produced by a strategy plus its deltas against the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: String,
    pub schedule: Schedule,
    pub totals: Totals,
    pub baseline_totals: Totals,
    pub original_payment: Money,
    /// Instalment in force at the end of the schedule
    pub new_payment: Money,
    /// `original_payment - new_payment`, floored at zero
    pub periodic_saving: Money,
    pub original_final_period: u32,
    pub new_final_period: u32,
    pub periods_saved: u32,
    pub interest_saved: Money,
}

impl StrategyResult {
    pub(crate) fn from_schedule(
        strategy: &str,
        ctx: &LoanContext,
        schedule: Schedule,
        new_payment: Money,
    ) -> Self {
        let baseline = &ctx.baseline;
        let new_final_period = schedule.final_period();
        let original_final_period = baseline.final_period();
        StrategyResult {
            strategy: strategy.to_string(),
            totals: schedule.totals.clone(),
            baseline_totals: baseline.totals.clone(),
            original_payment: ctx.payment,
            new_payment,
            periodic_saving: (ctx.payment - new_payment).max(Decimal::ZERO),
            original_final_period,
            new_final_period,
            periods_saved: original_final_period.saturating_sub(new_final_period),
            interest_saved: baseline.totals.interest_paid - schedule.totals.interest_paid,
            schedule,
        }
    }
}

/// Result of [`run_strategy`]: one schedule, or the three-way comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyOutcome {
    Strategy(StrategyResult),
    Comparative(ComparativeResult),
}

impl StrategyOutcome {
    /// Strategy schedules contained in the outcome (two for a comparison).
    pub fn into_results(self) -> Vec<StrategyResult> {
        match self {
            StrategyOutcome::Strategy(r) => vec![r],
            StrategyOutcome::Comparative(c) => vec![c.reduce_term, c.reduce_installment],
        }
    }

    fn schedules(&self) -> Vec<&Schedule> {
        match self {
            StrategyOutcome::Strategy(r) => vec![&r.schedule],
            StrategyOutcome::Comparative(c) => {
                vec![&c.reduce_term.schedule, &c.reduce_installment.schedule]
            }
        }
    }
}

/// Evaluate one strategy for a loan.
pub fn run_strategy(
    terms: &LoanTerms,
    request: &StrategyRequest,
) -> AmortizationResult<ComputationOutput<StrategyOutcome>> {
    let start = Instant::now();
    let ctx = LoanContext::new(terms)?;
    let outcome = evaluate(&ctx, request)?;

    let mut warnings: Vec<String> = Vec::new();
    for schedule in outcome.schedules() {
        if !schedule.is_fully_amortized() {
            warnings.push(format!(
                "Schedule ended at period {} with {} outstanding; the final period should retire the balance",
                schedule.final_period(),
                schedule.outstanding_balance()
            ));
        }
    }

    let mut assumptions = loan_assumptions(terms, ctx.period_rate);
    assumptions["strategy"] = serde_json::to_value(request)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        request.label(),
        &assumptions,
        warnings,
        elapsed,
        outcome,
    ))
}

/// Evaluate a request against an already validated loan.
pub fn evaluate(
    ctx: &LoanContext,
    request: &StrategyRequest,
) -> AmortizationResult<StrategyOutcome> {
    if let Err(e) = validate_request(request, ctx.terms.periods) {
        tracing::warn!(strategy = request.label(), error = %e, "strategy rejected");
        return Err(e);
    }

    let label = request.label();
    let outcome = match request {
        StrategyRequest::Single { at_period, amount } => {
            StrategyOutcome::Strategy(extra_payment::single(ctx, label, *at_period, *amount))
        }
        StrategyRequest::Recurring {
            from_period,
            amount,
        } => StrategyOutcome::Strategy(extra_payment::recurring(ctx, label, *from_period, *amount)),
        StrategyRequest::Windowed {
            from_period,
            to_period,
            amount,
        } => StrategyOutcome::Strategy(extra_payment::windowed(
            ctx,
            label,
            *from_period,
            *to_period,
            *amount,
        )),
        StrategyRequest::InstallmentReduction { at_period, amount } => StrategyOutcome::Strategy(
            installment_reduction::reduce_installment(ctx, label, *at_period, *amount)?,
        ),
        StrategyRequest::ScheduledMultiple { payments } => {
            StrategyOutcome::Strategy(extra_payment::scheduled(ctx, label, payments)?)
        }
        StrategyRequest::Comparative { at_period, amount } => {
            StrategyOutcome::Comparative(comparative::compare_term_and_installment(
                ctx, *at_period, *amount,
            )?)
        }
    };
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_request(request: &StrategyRequest, periods: u32) -> AmortizationResult<()> {
    match request {
        StrategyRequest::Single { at_period, amount }
        | StrategyRequest::InstallmentReduction { at_period, amount }
        | StrategyRequest::Comparative { at_period, amount } => {
            check_amount("amount", *amount)?;
            check_period("at_period", *at_period, periods)
        }
        StrategyRequest::Recurring {
            from_period,
            amount,
        } => {
            check_amount("amount", *amount)?;
            check_period("from_period", *from_period, periods)
        }
        StrategyRequest::Windowed {
            from_period,
            to_period,
            amount,
        } => {
            check_amount("amount", *amount)?;
            check_period("from_period", *from_period, periods)?;
            check_period("to_period", *to_period, periods)?;
            if to_period <= from_period {
                return Err(AmortizationError::InvalidInput {
                    field: "to_period".into(),
                    reason: format!(
                        "End period ({to_period}) must be after start period ({from_period})"
                    ),
                });
            }
            Ok(())
        }
        StrategyRequest::ScheduledMultiple { payments } => {
            extra_payment::validate_scheduled(payments, periods)
        }
    }
}

pub(crate) fn check_amount(field: &str, amount: Money) -> AmortizationResult<()> {
    if amount <= Decimal::ZERO {
        return Err(AmortizationError::invalid(field, "Extra payment must be positive"));
    }
    Ok(())
}

pub(crate) fn check_period(field: &str, period: u32, periods: u32) -> AmortizationResult<()> {
    if period == 0 || period > periods {
        return Err(AmortizationError::invalid(
            field,
            format!("Period must be between 1 and {periods}, got {period}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms() -> LoanTerms {
        LoanTerms::new(dec!(1000000), dec!(12), 12, PaymentFrequency::Monthly)
    }

    #[test]
    fn test_request_deserializes_from_tagged_json() {
        let req: StrategyRequest = serde_json::from_str(
            r#"{"kind": "windowed", "from_period": 2, "to_period": 6, "amount": "25000"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            StrategyRequest::Windowed {
                from_period: 2,
                to_period: 6,
                amount: dec!(25000)
            }
        );
    }

    #[test]
    fn test_zero_amount_rejected() {
        let req = StrategyRequest::Single {
            at_period: 3,
            amount: Decimal::ZERO,
        };
        assert!(run_strategy(&terms(), &req).is_err());
    }

    #[test]
    fn test_period_outside_term_rejected() {
        let req = StrategyRequest::Recurring {
            from_period: 13,
            amount: dec!(1000),
        };
        let err = run_strategy(&terms(), &req).unwrap_err();
        assert!(matches!(
            err,
            AmortizationError::InvalidInput { ref field, .. } if field == "from_period"
        ));
    }

    #[test]
    fn test_windowed_requires_end_after_start() {
        let req = StrategyRequest::Windowed {
            from_period: 4,
            to_period: 4,
            amount: dec!(1000),
        };
        assert!(run_strategy(&terms(), &req).is_err());
    }

    #[test]
    fn test_invalid_loan_rejected_before_strategy() {
        let mut t = terms();
        t.annual_rate_pct = Decimal::ZERO;
        let req = StrategyRequest::Single {
            at_period: 3,
            amount: dec!(1000),
        };
        assert!(run_strategy(&t, &req).is_err());
    }

    #[test]
    fn test_envelope_echoes_strategy() {
        let req = StrategyRequest::Single {
            at_period: 3,
            amount: dec!(1000),
        };
        let out = run_strategy(&terms(), &req).unwrap();
        assert_eq!(out.assumptions["strategy"]["kind"], "single");
        assert_eq!(out.methodology, "Single extra payment");
        assert!(out.warnings.is_empty());
    }
}
