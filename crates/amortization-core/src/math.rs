use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Decimal math helpers (no f64)
// ---------------------------------------------------------------------------

const SERIES_TOLERANCE: Decimal = dec!(0.00000000000000000001);
const LN2: Decimal = dec!(0.6931471805599453094172321);
const TWO: Decimal = dec!(2);

/// Raise `base` to an integer power by square-and-multiply, or `None` when
/// the result leaves the Decimal range.
pub fn checked_pow_int(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut b = base;
    let mut exp = n;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(b)?;
        }
        exp >>= 1;
        if exp > 0 {
            b = b.checked_mul(b)?;
        }
    }
    Some(result)
}

/// Saturating [`checked_pow_int`]: overflow yields `Decimal::MAX`.
pub fn pow_int(base: Decimal, n: u32) -> Decimal {
    checked_pow_int(base, n).unwrap_or(Decimal::MAX)
}

/// Taylor-series exponential with range reduction x = k*ln2 + r.
pub fn exp_decimal(x: Decimal) -> Decimal {
    let mut k: i64 = 0;
    let mut r = x;
    if r.abs() > TWO {
        k = (x / LN2).round().to_i64().unwrap_or(0);
        r = x - Decimal::from(k) * LN2;
    }

    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1u32..=40 {
        term *= r / Decimal::from(n);
        sum += term;
        if term.abs() < SERIES_TOLERANCE {
            break;
        }
    }

    if k >= 0 {
        sum * pow_int(TWO, k as u32)
    } else {
        sum / pow_int(TWO, (-k) as u32)
    }
}

/// ln(1+x) for x > -1 through the atanh identity ln(1+x) = 2*atanh(x/(x+2)).
pub fn ln_one_plus(x: Decimal) -> Decimal {
    if x <= dec!(-1) {
        return Decimal::ZERO;
    }
    if x > Decimal::ONE {
        // Halve the argument until the series converges quickly.
        let mut val = Decimal::ONE + x;
        let mut k: i64 = 0;
        while val > TWO {
            val /= TWO;
            k += 1;
        }
        return ln_one_plus(val - Decimal::ONE) + Decimal::from(k) * LN2;
    }
    let y = x / (x + TWO);
    two_atanh(y)
}

/// 2*atanh(y) = 2*(y + y^3/3 + y^5/5 + ...) for |y| < 1.
fn two_atanh(y: Decimal) -> Decimal {
    let y2 = y * y;
    let mut term = y;
    let mut sum = y;
    for k in 1u32..=60 {
        term *= y2;
        let contribution = term / Decimal::from(2 * k + 1);
        sum += contribution;
        if contribution.abs() < SERIES_TOLERANCE {
            break;
        }
    }
    TWO * sum
}

/// (1 + rate)^t for a fractional exponent, via exp(t * ln(1 + rate)).
pub fn compound_factor(rate: Decimal, t: Decimal) -> Decimal {
    if t.is_zero() {
        return Decimal::ONE;
    }
    if t.fract().is_zero() && t > Decimal::ZERO {
        if let Some(n) = t.to_u32() {
            return pow_int(Decimal::ONE + rate, n);
        }
    }
    exp_decimal(t * ln_one_plus(rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_int() {
        assert_eq!(pow_int(dec!(1.1), 0), Decimal::ONE);
        assert_eq!(pow_int(dec!(2), 10), dec!(1024));
        assert_eq!(pow_int(dec!(1.1), 2), dec!(1.21));
    }

    #[test]
    fn test_checked_pow_int_reports_overflow() {
        let ten_pow_28 = Decimal::from_i128_with_scale(10i128.pow(28), 0);
        assert_eq!(checked_pow_int(dec!(10), 28), Some(ten_pow_28));
        assert_eq!(checked_pow_int(dec!(10), 29), None);
        assert_eq!(checked_pow_int(dec!(1.2211), 600), None);
        assert_eq!(pow_int(dec!(10), 40), Decimal::MAX);
    }

    #[test]
    fn test_exp_decimal_accuracy() {
        // e^1 = 2.718281828459045235360287...
        let e = exp_decimal(Decimal::ONE);
        assert!((e - dec!(2.7182818284590452353602874)).abs() < dec!(0.000000000000001));
        // Range-reduced branch
        let e5 = exp_decimal(dec!(5));
        assert!((e5 - dec!(148.41315910257660342111558)).abs() < dec!(0.0000000001));
        let e_neg3 = exp_decimal(dec!(-3));
        assert!((e_neg3 - dec!(0.049787068367863942979342)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_ln_one_plus() {
        assert_eq!(ln_one_plus(Decimal::ZERO), Decimal::ZERO);
        // ln(1.1) = 0.0953101798043248600439521...
        let ln_1_1 = ln_one_plus(dec!(0.1));
        assert!((ln_1_1 - dec!(0.0953101798043248600439521)).abs() < dec!(0.0000000000000001));
        // ln(4) = 1.3862943611198906188344642...
        let ln_4 = ln_one_plus(dec!(3));
        assert!((ln_4 - dec!(1.3862943611198906188344642)).abs() < dec!(0.0000000000000001));
    }

    #[test]
    fn test_compound_factor_roundtrip() {
        // ((1.10)^(1/12))^12 == 1.10
        let monthly = compound_factor(dec!(0.10), Decimal::ONE / dec!(12));
        let annual = pow_int(monthly, 12);
        assert!((annual - dec!(1.10)).abs() < dec!(0.0000000000001));
    }

    #[test]
    fn test_compound_factor_integer_exponent_is_exact() {
        assert_eq!(compound_factor(dec!(0.05), dec!(3)), dec!(1.157625));
    }
}
