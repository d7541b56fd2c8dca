use rust_decimal::Decimal;

use crate::error::AmortizationError;
use crate::loan::LoanContext;
use crate::payment::payment;
use crate::schedule::{build_schedule, ExtraPaymentPolicy, ExtraTiming, PaymentPlan};
use crate::types::Money;
use crate::AmortizationResult;

use super::{check_period, StrategyResult};

/// Lump sum at `at_period` that lowers the instalment instead of the term.
///
/// The balance left after period `at_period - 1` of the original schedule,
/// minus `amount`, is re-amortized over the `periods - at_period + 1`
/// remaining periods at the same rate. Periods before `at_period` pay the
/// original instalment, periods from `at_period` on pay the new one. The lump
/// sum comes off the balance at the start of `at_period`, so that period's
/// interest accrues on the reduced balance the new instalment was sized for.
pub fn reduce_installment(
    ctx: &LoanContext,
    label: &str,
    at_period: u32,
    amount: Money,
) -> AmortizationResult<StrategyResult> {
    let terms = &ctx.terms;
    check_period("at_period", at_period, terms.periods)?;
    let balance_before = ctx
        .baseline
        .balance_after(at_period.saturating_sub(1))
        .ok_or_else(|| {
            AmortizationError::invalid(
                "at_period",
                format!("Loan is already repaid before period {at_period}"),
            )
        })?;

    let reduced_balance = balance_before - amount;
    let remaining_periods = terms.periods - at_period + 1;
    let new_payment = if reduced_balance > Decimal::ZERO {
        payment(reduced_balance, ctx.period_rate, remaining_periods)?
    } else {
        Decimal::ZERO
    };

    let plan = PaymentPlan::Stepped {
        initial: ctx.payment,
        from_period: at_period,
        revised: new_payment,
    };
    let policy = ExtraPaymentPolicy::SingleShot { at_period, amount };
    let schedule = build_schedule(
        terms.principal,
        ctx.period_rate,
        plan,
        terms.periods,
        terms.insurance_per_period,
        Some(&policy),
        ExtraTiming::BeforeInterest,
    );

    tracing::debug!(
        at_period,
        original = %ctx.payment,
        revised = %new_payment,
        "instalment recomputed"
    );

    Ok(StrategyResult::from_schedule(label, ctx, schedule, new_payment))
}
