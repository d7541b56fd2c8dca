use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::math::compound_factor;
use crate::types::{PaymentFrequency, Percent, Rate};

/// Effective per-period rate from a nominal annual percentage.
///
/// `(1 + annual/100)^(1/periods_per_year) - 1`. This is an effective-rate
/// conversion, not `annual / periods_per_year`.
///
/// A non-positive annual rate yields zero, which callers must treat as
/// "no valid rate" before computing a payment.
pub fn period_rate(annual_rate_pct: Percent, frequency: PaymentFrequency) -> Rate {
    if annual_rate_pct <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let annual = annual_rate_pct / dec!(100);
    let exponent = Decimal::ONE / Decimal::from(frequency.periods_per_year());
    compound_factor(annual, exponent) - Decimal::ONE
}

/// Same as [`period_rate`] for callers holding a raw frequency label.
pub fn period_rate_for_label(annual_rate_pct: Percent, frequency: &str) -> Rate {
    period_rate(annual_rate_pct, PaymentFrequency::from_label(frequency))
}

/// Accept a rate typed with either a comma or a dot as decimal separator.
///
/// Returns `None` when the text is not a number. Sign checks are left to
/// [`period_rate`] and input validation.
pub fn normalize_rate_input(raw: &str) -> Option<Percent> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .trim()
        .replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate_from_ten_percent() {
        let r = period_rate(dec!(10), PaymentFrequency::Monthly);
        // (1.10)^(1/12) - 1 = 0.00797414042890376...
        assert!((r - dec!(0.0079741404289037)).abs() < dec!(0.0000000000001));
    }

    #[test]
    fn test_semiannual_rate() {
        let r = period_rate(dec!(21), PaymentFrequency::Semiannual);
        // sqrt(1.21) - 1 = 0.10
        assert!((r - dec!(0.10)).abs() < dec!(0.0000000000001));
    }

    #[test]
    fn test_effective_not_nominal_division() {
        let r = period_rate(dec!(12), PaymentFrequency::Monthly);
        assert!(r < dec!(0.01));
        assert!(r > dec!(0.0094));
    }

    #[test]
    fn test_non_positive_rate_returns_zero() {
        assert_eq!(period_rate(Decimal::ZERO, PaymentFrequency::Monthly), Decimal::ZERO);
        assert_eq!(period_rate(dec!(-5), PaymentFrequency::Quarterly), Decimal::ZERO);
    }

    #[test]
    fn test_unknown_label_uses_twelve_periods() {
        assert_eq!(
            period_rate_for_label(dec!(10), "fortnightly"),
            period_rate(dec!(10), PaymentFrequency::Monthly)
        );
    }

    #[test]
    fn test_normalize_rate_input() {
        assert_eq!(normalize_rate_input("10,5"), Some(dec!(10.5)));
        assert_eq!(normalize_rate_input(" 9.75 "), Some(dec!(9.75)));
        assert_eq!(normalize_rate_input("12%"), Some(dec!(12)));
        assert_eq!(normalize_rate_input("abc"), None);
        assert_eq!(normalize_rate_input(""), None);
    }
}
