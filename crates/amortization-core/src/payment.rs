use rust_decimal::Decimal;

use crate::error::AmortizationError;
use crate::math::checked_pow_int;
use crate::types::{Money, Rate};
use crate::AmortizationResult;

/// Fixed instalment of an annuity-style loan.
///
/// `principal * r * (1 + r)^n / ((1 + r)^n - 1)`, evaluated as
/// `principal * r / (1 - (1 + r)^-n)`. A growth factor beyond the Decimal
/// range discounts to zero, leaving the interest-only payment.
///
/// The caller is expected to have validated `period_rate > 0` and
/// `periods > 0`; violating either is reported as an error instead of
/// producing a degenerate payment.
pub fn payment(principal: Money, period_rate: Rate, periods: u32) -> AmortizationResult<Money> {
    if periods == 0 {
        return Err(AmortizationError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if period_rate <= Decimal::ZERO {
        return Err(AmortizationError::InvalidInput {
            field: "period_rate".into(),
            reason: "Period rate must be > 0 to compute an annuity payment".into(),
        });
    }

    let discount = checked_pow_int(Decimal::ONE + period_rate, periods)
        .and_then(|factor| Decimal::ONE.checked_div(factor))
        .unwrap_or(Decimal::ZERO);
    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Err(AmortizationError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    principal
        .checked_mul(period_rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| {
            AmortizationError::FinancialImpossibility(format!(
                "Payment for {principal} at {period_rate} per period exceeds the representable range"
            ))
        })
}
