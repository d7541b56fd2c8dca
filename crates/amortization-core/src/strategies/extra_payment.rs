use std::collections::BTreeMap;

use crate::error::AmortizationError;
use crate::loan::LoanContext;
use crate::schedule::{generate_schedule, ExtraPaymentPolicy};
use crate::types::Money;
use crate::AmortizationResult;

use super::{check_amount, check_period, ScheduledExtra, StrategyResult};

/// Run the baseline instalment with an extra-payment policy on top.
/// The instalment never changes; extra capital shortens the term.
pub fn with_policy(ctx: &LoanContext, label: &str, policy: &ExtraPaymentPolicy) -> StrategyResult {
    let terms = &ctx.terms;
    let schedule = generate_schedule(
        terms.principal,
        ctx.period_rate,
        ctx.payment,
        terms.periods,
        terms.insurance_per_period,
        Some(policy),
    );
    StrategyResult::from_schedule(label, ctx, schedule, ctx.payment)
}

pub fn single(ctx: &LoanContext, label: &str, at_period: u32, amount: Money) -> StrategyResult {
    with_policy(
        ctx,
        label,
        &ExtraPaymentPolicy::SingleShot { at_period, amount },
    )
}

pub fn recurring(
    ctx: &LoanContext,
    label: &str,
    from_period: u32,
    amount: Money,
) -> StrategyResult {
    with_policy(
        ctx,
        label,
        &ExtraPaymentPolicy::Recurring {
            from_period,
            amount,
        },
    )
}

pub fn windowed(
    ctx: &LoanContext,
    label: &str,
    from_period: u32,
    to_period: u32,
    amount: Money,
) -> StrategyResult {
    with_policy(
        ctx,
        label,
        &ExtraPaymentPolicy::Windowed {
            from_period,
            to_period,
            amount,
        },
    )
}

/// Several lump sums. An amount larger than the balance left at its period
/// only retires that balance and ends the schedule there.
pub fn scheduled(
    ctx: &LoanContext,
    label: &str,
    payments: &[ScheduledExtra],
) -> AmortizationResult<StrategyResult> {
    let policy = ExtraPaymentPolicy::Scheduled(to_lookup(payments)?);
    Ok(with_policy(ctx, label, &policy))
}

/// Period -> amount lookup; duplicate periods are an error, never merged.
pub fn to_lookup(payments: &[ScheduledExtra]) -> AmortizationResult<BTreeMap<u32, Money>> {
    let mut lookup = BTreeMap::new();
    for p in payments {
        if lookup.insert(p.period, p.amount).is_some() {
            return Err(AmortizationError::InvalidInput {
                field: "payments".into(),
                reason: format!("Period {} appears more than once", p.period),
            });
        }
    }
    Ok(lookup)
}

pub(crate) fn validate_scheduled(
    payments: &[ScheduledExtra],
    periods: u32,
) -> AmortizationResult<()> {
    if payments.is_empty() {
        return Err(AmortizationError::invalid(
            "payments",
            "At least one scheduled extra payment is required",
        ));
    }
    for p in payments {
        check_period("payments.period", p.period, periods)?;
        check_amount("payments.amount", p.amount)?;
    }
    to_lookup(payments).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LoanTerms, PaymentFrequency};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn ctx() -> LoanContext {
        LoanContext::new(&LoanTerms::new(
            dec!(150000000),
            dec!(10),
            180,
            PaymentFrequency::Monthly,
        ))
        .unwrap()
    }

    #[test]
    fn test_single_keeps_instalment_and_shortens_term() {
        let ctx = ctx();
        let r = single(&ctx, "single", 24, dec!(20000000));
        assert_eq!(r.new_payment, ctx.payment);
        assert_eq!(r.periodic_saving, Decimal::ZERO);
        assert!(r.new_final_period < 180);
        assert_eq!(r.periods_saved, 180 - r.new_final_period);
        assert!(r.interest_saved > Decimal::ZERO);
        assert_eq!(r.totals.extra_paid, dec!(20000000));
    }

    #[test]
    fn test_recurring_applies_every_period_from_start() {
        let ctx = ctx();
        let r = recurring(&ctx, "recurring", 10, dec!(500000));
        let rows = &r.schedule.rows;
        assert_eq!(rows[9].extra, Decimal::ZERO);
        assert_eq!(rows[10].extra, dec!(500000));
        assert_eq!(rows[50].extra, dec!(500000));
    }

    #[test]
    fn test_windowed_stops_after_window() {
        let ctx = ctx();
        let r = windowed(&ctx, "windowed", 5, 8, dec!(1000000));
        assert_eq!(r.totals.extra_paid, dec!(4000000));
        assert_eq!(r.schedule.rows[9].extra, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_periods_rejected() {
        let payments = vec![
            ScheduledExtra {
                period: 5,
                amount: dec!(1000),
            },
            ScheduledExtra {
                period: 5,
                amount: dec!(2000),
            },
        ];
        let err = scheduled(&ctx(), "scheduled", &payments).unwrap_err();
        assert!(err.to_string().contains("Period 5"));
    }

    #[test]
    fn test_scheduled_overrun_retires_balance() {
        let ctx = ctx();
        let payments = vec![
            ScheduledExtra {
                period: 12,
                amount: dec!(10000000),
            },
            ScheduledExtra {
                period: 36,
                amount: dec!(900000000),
            },
            ScheduledExtra {
                period: 48,
                amount: dec!(1000),
            },
        ];
        let r = scheduled(&ctx, "scheduled", &payments).unwrap();
        assert_eq!(r.new_final_period, 36);
        let last = r.schedule.rows.last().unwrap();
        assert_eq!(last.extra, last.initial_balance);
        assert!(r.schedule.is_fully_amortized());
    }

    #[test]
    fn test_validate_scheduled_bounds() {
        let out_of_range = vec![ScheduledExtra {
            period: 181,
            amount: dec!(1),
        }];
        assert!(validate_scheduled(&out_of_range, 180).is_err());
        assert!(validate_scheduled(&[], 180).is_err());
    }
}
