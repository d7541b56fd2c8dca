use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Money, Rate};

/// Balances closer to zero than one currency unit are treated as paid off.
pub const ROUNDING_UNIT: Money = Decimal::ONE;

/// Extra capital paid on top of the regular instalment.
///
/// Each variant is a pure function of `(period, balance)`; see
/// [`ExtraPaymentPolicy::extra_for`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPaymentPolicy {
    /// One extra payment at exactly `at_period`
    SingleShot { at_period: u32, amount: Money },
    /// The same extra payment every period from `from_period` onward
    Recurring { from_period: u32, amount: Money },
    /// Extra payment for every period in `from_period..=to_period`
    Windowed {
        from_period: u32,
        to_period: u32,
        amount: Money,
    },
    /// Arbitrary period -> amount lookup
    Scheduled(BTreeMap<u32, Money>),
}

impl ExtraPaymentPolicy {
    /// Amount requested by the policy for `period`, before clamping.
    pub fn requested(&self, period: u32) -> Money {
        match self {
            ExtraPaymentPolicy::SingleShot { at_period, amount } => {
                if period == *at_period {
                    *amount
                } else {
                    Decimal::ZERO
                }
            }
            ExtraPaymentPolicy::Recurring {
                from_period,
                amount,
            } => {
                if period >= *from_period {
                    *amount
                } else {
                    Decimal::ZERO
                }
            }
            ExtraPaymentPolicy::Windowed {
                from_period,
                to_period,
                amount,
            } => {
                if (*from_period..=*to_period).contains(&period) {
                    *amount
                } else {
                    Decimal::ZERO
                }
            }
            ExtraPaymentPolicy::Scheduled(extras) => {
                extras.get(&period).copied().unwrap_or(Decimal::ZERO)
            }
        }
    }

    /// Extra actually applied in `period`: never negative and never more
    /// than the outstanding `balance`.
    pub fn extra_for(&self, period: u32, balance: Money) -> Money {
        self.requested(period)
            .max(Decimal::ZERO)
            .min(balance.max(Decimal::ZERO))
    }
}

/// One line of the amortization table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: u32,
    pub initial_balance: Money,
    pub base_payment: Money,
    pub interest: Money,
    pub capital: Money,
    pub extra: Money,
    pub insurance: Money,
    pub total_cashflow: Money,
    pub ending_balance: Money,
}

impl ScheduleRow {
    /// Synthetic period-0 row carrying the opening balance.
    fn opening(principal: Money) -> Self {
        ScheduleRow {
            period: 0,
            initial_balance: principal,
            base_payment: Decimal::ZERO,
            interest: Decimal::ZERO,
            capital: Decimal::ZERO,
            extra: Decimal::ZERO,
            insurance: Decimal::ZERO,
            total_cashflow: Decimal::ZERO,
            ending_balance: principal,
        }
    }
}

/// Accumulated flows over a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub interest_paid: Money,
    /// Regular capital plus extra payments
    pub capital_paid: Money,
    pub insurance_paid: Money,
    pub extra_paid: Money,
}

impl Totals {
    /// Principal + interest + insurance.
    pub fn total_paid(&self) -> Money {
        self.capital_paid + self.interest_paid + self.insurance_paid
    }

    fn accumulate(&mut self, row: &ScheduleRow) {
        self.interest_paid += row.interest;
        self.capital_paid += row.capital + row.extra;
        self.insurance_paid += row.insurance;
        self.extra_paid += row.extra;
    }
}

/// Period-by-period amortization table; row 0 first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub rows: Vec<ScheduleRow>,
    pub totals: Totals,
}

impl Schedule {
    /// Last period with a payment (0 for an empty schedule).
    pub fn final_period(&self) -> u32 {
        self.rows.last().map(|r| r.period).unwrap_or(0)
    }

    /// Instalment charged in period 1.
    pub fn first_payment(&self) -> Money {
        self.rows
            .get(1)
            .map(|r| r.base_payment)
            .unwrap_or(Decimal::ZERO)
    }

    /// Instalment charged in the final period.
    pub fn last_payment(&self) -> Money {
        self.rows
            .iter()
            .skip(1)
            .last()
            .map(|r| r.base_payment)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn outstanding_balance(&self) -> Money {
        self.rows
            .last()
            .map(|r| r.ending_balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_fully_amortized(&self) -> bool {
        self.outstanding_balance().is_zero()
    }

    /// Balance left after `period` has been paid (principal for period 0).
    pub fn balance_after(&self, period: u32) -> Option<Money> {
        self.rows
            .iter()
            .find(|r| r.period == period)
            .map(|r| r.ending_balance)
    }
}

/// Instalment charged per period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PaymentPlan {
    Fixed(Money),
    /// `initial` before `from_period`, `revised` from `from_period` on
    Stepped {
        initial: Money,
        from_period: u32,
        revised: Money,
    },
}

impl PaymentPlan {
    fn payment_for(&self, period: u32) -> Money {
        match *self {
            PaymentPlan::Fixed(p) => p,
            PaymentPlan::Stepped {
                initial,
                from_period,
                revised,
            } => {
                if period < from_period {
                    initial
                } else {
                    revised
                }
            }
        }
    }
}

/// Whether a period's extra payment is taken off before or after interest accrues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExtraTiming {
    /// Interest on the full opening balance (prepayment during the period)
    AfterInterest,
    /// Interest on the opening balance net of the extra (prepayment at period start)
    BeforeInterest,
}

/// Generate an amortization schedule.
///
/// For each period: interest accrues on the opening balance, the policy's
/// extra payment (if any) is taken off the balance, then the regular capital
/// portion `payment - interest` is applied. The final period, or any period
/// where the capital portion would overpay, retires exactly the remaining
/// balance, so the schedule always closes at zero.
///
/// `period_rate` and `payment` are expected to come from
/// [`crate::rate::period_rate`] and [`crate::payment::payment`].
pub fn generate_schedule(
    principal: Money,
    period_rate: Rate,
    payment: Money,
    periods: u32,
    insurance_per_period: Money,
    policy: Option<&ExtraPaymentPolicy>,
) -> Schedule {
    build_schedule(
        principal,
        period_rate,
        PaymentPlan::Fixed(payment),
        periods,
        insurance_per_period,
        policy,
        ExtraTiming::AfterInterest,
    )
}

pub(crate) fn build_schedule(
    principal: Money,
    period_rate: Rate,
    plan: PaymentPlan,
    periods: u32,
    insurance_per_period: Money,
    policy: Option<&ExtraPaymentPolicy>,
    timing: ExtraTiming,
) -> Schedule {
    let mut rows = Vec::with_capacity(periods as usize + 1);
    let mut totals = Totals::default();
    let mut balance = principal;

    rows.push(ScheduleRow::opening(principal));

    for period in 1..=periods {
        if balance <= Decimal::ZERO {
            break;
        }
        let opening = balance;
        let payment = plan.payment_for(period);

        let extra = policy
            .map(|p| p.extra_for(period, opening))
            .unwrap_or(Decimal::ZERO);
        let remaining = opening - extra;

        let interest = match timing {
            ExtraTiming::AfterInterest => opening * period_rate,
            ExtraTiming::BeforeInterest => remaining * period_rate,
        };

        // No negative amortization: an instalment below the interest due
        // leaves the balance untouched rather than growing it.
        let scheduled_capital = (payment - interest).max(Decimal::ZERO);
        let mut capital = if period < periods
            && remaining >= ROUNDING_UNIT
            && remaining > scheduled_capital
        {
            scheduled_capital
        } else {
            remaining
        };

        let mut ending = remaining - capital;
        if ending > Decimal::ZERO && ending < ROUNDING_UNIT {
            capital += ending;
            ending = Decimal::ZERO;
        }
        debug_assert!(ending >= Decimal::ZERO, "negative balance in period {period}");

        let row = ScheduleRow {
            period,
            initial_balance: opening,
            base_payment: payment,
            interest,
            capital,
            extra,
            insurance: insurance_per_period,
            total_cashflow: payment + insurance_per_period + extra,
            ending_balance: ending,
        };
        totals.accumulate(&row);
        rows.push(row);

        balance = ending;
    }

    let schedule = Schedule { rows, totals };
    if !schedule.is_fully_amortized() && periods > 0 {
        tracing::warn!(
            final_period = schedule.final_period(),
            outstanding = %schedule.outstanding_balance(),
            "schedule ended with an outstanding balance"
        );
    } else {
        tracing::debug!(
            final_period = schedule.final_period(),
            interest = %schedule.totals.interest_paid,
            "schedule generated"
        );
    }
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::payment;
    use crate::rate::period_rate;
    use crate::types::PaymentFrequency;
    use rust_decimal_macros::dec;

    fn small_loan() -> (Money, Rate, Money) {
        let rate = period_rate(dec!(12), PaymentFrequency::Monthly);
        let pmt = payment(dec!(1000000), rate, 12).unwrap();
        (dec!(1000000), rate, pmt)
    }

    #[test]
    fn test_opening_row() {
        let (principal, rate, pmt) = small_loan();
        let sched = generate_schedule(principal, rate, pmt, 12, Decimal::ZERO, None);
        let first = &sched.rows[0];
        assert_eq!(first.period, 0);
        assert_eq!(first.ending_balance, principal);
        assert_eq!(first.total_cashflow, Decimal::ZERO);
    }

    #[test]
    fn test_baseline_runs_full_term_and_closes_at_zero() {
        let (principal, rate, pmt) = small_loan();
        let sched = generate_schedule(principal, rate, pmt, 12, Decimal::ZERO, None);
        assert_eq!(sched.rows.len(), 13);
        assert_eq!(sched.final_period(), 12);
        assert!(sched.is_fully_amortized());
        assert!((sched.totals.capital_paid - principal).abs() < dec!(0.000001));
    }

    #[test]
    fn test_row_balance_identity() {
        let (principal, rate, pmt) = small_loan();
        let policy = ExtraPaymentPolicy::Recurring {
            from_period: 3,
            amount: dec!(50000),
        };
        let sched = generate_schedule(principal, rate, pmt, 12, dec!(2500), Some(&policy));
        for row in &sched.rows {
            let identity = row.initial_balance - row.capital - row.extra - row.ending_balance;
            assert!(identity.abs() < dec!(0.000001), "period {}", row.period);
            assert!(row.ending_balance >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_insurance_in_cashflow_not_principal() {
        let (principal, rate, pmt) = small_loan();
        let plain = generate_schedule(principal, rate, pmt, 12, Decimal::ZERO, None);
        let insured = generate_schedule(principal, rate, pmt, 12, dec!(10000), None);
        assert_eq!(insured.rows[1].total_cashflow, pmt + dec!(10000));
        assert_eq!(insured.totals.insurance_paid, dec!(120000));
        assert_eq!(insured.totals.interest_paid, plain.totals.interest_paid);
    }

    #[test]
    fn test_overrun_is_clamped_and_terminates() {
        let (principal, rate, pmt) = small_loan();
        let policy = ExtraPaymentPolicy::SingleShot {
            at_period: 2,
            amount: dec!(5000000),
        };
        let sched = generate_schedule(principal, rate, pmt, 12, Decimal::ZERO, Some(&policy));
        assert_eq!(sched.final_period(), 2);
        let row = &sched.rows[2];
        assert_eq!(row.extra, row.initial_balance);
        assert_eq!(row.capital, Decimal::ZERO);
        assert_eq!(row.ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_windowed_bounds_inclusive() {
        let policy = ExtraPaymentPolicy::Windowed {
            from_period: 3,
            to_period: 5,
            amount: dec!(100),
        };
        assert_eq!(policy.requested(2), Decimal::ZERO);
        assert_eq!(policy.requested(3), dec!(100));
        assert_eq!(policy.requested(5), dec!(100));
        assert_eq!(policy.requested(6), Decimal::ZERO);
    }

    #[test]
    fn test_scheduled_lookup() {
        let mut extras = BTreeMap::new();
        extras.insert(4, dec!(300));
        extras.insert(9, dec!(700));
        let policy = ExtraPaymentPolicy::Scheduled(extras);
        assert_eq!(policy.extra_for(4, dec!(1000)), dec!(300));
        assert_eq!(policy.extra_for(9, dec!(500)), dec!(500));
        assert_eq!(policy.extra_for(5, dec!(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_extra_before_interest_accrues_on_reduced_balance() {
        let (principal, rate, pmt) = small_loan();
        let policy = ExtraPaymentPolicy::SingleShot {
            at_period: 1,
            amount: dec!(400000),
        };
        let sched = build_schedule(
            principal,
            rate,
            PaymentPlan::Fixed(pmt),
            12,
            Decimal::ZERO,
            Some(&policy),
            ExtraTiming::BeforeInterest,
        );
        assert_eq!(sched.rows[1].interest, dec!(600000) * rate);
        assert_eq!(sched.rows[1].initial_balance, principal);
    }

    #[test]
    fn test_stepped_plan_switches_payment() {
        let plan = PaymentPlan::Stepped {
            initial: dec!(100),
            from_period: 4,
            revised: dec!(80),
        };
        assert_eq!(plan.payment_for(3), dec!(100));
        assert_eq!(plan.payment_for(4), dec!(80));
    }

    #[test]
    fn test_zero_periods_yields_opening_row_only() {
        let sched = generate_schedule(dec!(1000), dec!(0.01), dec!(100), 0, Decimal::ZERO, None);
        assert_eq!(sched.rows.len(), 1);
        assert_eq!(sched.final_period(), 0);
        assert_eq!(sched.first_payment(), Decimal::ZERO);
    }
}
