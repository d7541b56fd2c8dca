use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates quoted as percentages (10 = 10%), as entered by a borrower.
pub type Percent = Decimal;

/// How often instalments fall due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Bimonthly,
    Quarterly,
    Semiannual,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Bimonthly => 6,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::Semiannual => 2,
        }
    }

    /// Parse a frequency label. Unknown or empty labels fall back to monthly.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "bimonthly" => PaymentFrequency::Bimonthly,
            "quarterly" => PaymentFrequency::Quarterly,
            "semiannual" => PaymentFrequency::Semiannual,
            _ => PaymentFrequency::Monthly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentFrequency::Monthly => "Monthly",
            PaymentFrequency::Bimonthly => "Bimonthly",
            PaymentFrequency::Quarterly => "Quarterly",
            PaymentFrequency::Semiannual => "Semiannual",
        }
    }
}

impl From<String> for PaymentFrequency {
    fn from(label: String) -> Self {
        PaymentFrequency::from_label(&label)
    }
}

/// A named optional insurance charged every period (life, fire, unemployment...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceLine {
    pub name: String,
    pub amount: Money,
}

/// Sum of every insurance line item, i.e. the fixed per-period add-on.
pub fn total_insurance(lines: &[InsuranceLine]) -> Money {
    lines.iter().map(|l| l.amount).sum()
}

/// Loan parameters supplied by the caller. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate in percent (10 = 10%)
    pub annual_rate_pct: Percent,
    pub periods: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub insurance_per_period: Money,
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        annual_rate_pct: Percent,
        periods: u32,
        frequency: PaymentFrequency,
    ) -> Self {
        LoanTerms {
            principal,
            annual_rate_pct,
            periods,
            frequency,
            insurance_per_period: Decimal::ZERO,
        }
    }

    pub fn with_insurance(mut self, insurance_per_period: Money) -> Self {
        self.insurance_per_period = insurance_per_period;
        self
    }

    pub fn with_insurance_lines(self, lines: &[InsuranceLine]) -> Self {
        self.with_insurance(total_insurance(lines))
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Assumptions echoed back in every loan computation envelope.
pub(crate) fn loan_assumptions(terms: &LoanTerms, period_rate: Rate) -> serde_json::Value {
    serde_json::json!({
        "principal": terms.principal.to_string(),
        "annual_rate_pct": terms.annual_rate_pct.to_string(),
        "periods": terms.periods,
        "frequency": terms.frequency.label(),
        "insurance_per_period": terms.insurance_per_period.to_string(),
        "period_rate": period_rate.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_frequency_table() {
        assert_eq!(PaymentFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(PaymentFrequency::Bimonthly.periods_per_year(), 6);
        assert_eq!(PaymentFrequency::Quarterly.periods_per_year(), 4);
        assert_eq!(PaymentFrequency::Semiannual.periods_per_year(), 2);
    }

    #[test]
    fn test_unknown_label_defaults_to_monthly() {
        assert_eq!(PaymentFrequency::from_label("weekly"), PaymentFrequency::Monthly);
        assert_eq!(PaymentFrequency::from_label(""), PaymentFrequency::Monthly);
        assert_eq!(
            PaymentFrequency::from_label(" Quarterly "),
            PaymentFrequency::Quarterly
        );
    }

    #[test]
    fn test_insurance_lines_sum() {
        let lines = vec![
            InsuranceLine { name: "Life".into(), amount: dec!(20000) },
            InsuranceLine { name: "Fire".into(), amount: dec!(15500) },
        ];
        let terms = LoanTerms::new(dec!(1000000), dec!(12), 12, PaymentFrequency::Monthly)
            .with_insurance_lines(&lines);
        assert_eq!(terms.insurance_per_period, dec!(35500));
    }

    #[test]
    fn test_loan_terms_deserialize_defaults() {
        let terms: LoanTerms = serde_json::from_str(
            r#"{"principal": "1000", "annual_rate_pct": "10", "periods": 12}"#,
        )
        .unwrap();
        assert_eq!(terms.frequency, PaymentFrequency::Monthly);
        assert_eq!(terms.insurance_per_period, Decimal::ZERO);

        let weekly: LoanTerms = serde_json::from_str(
            r#"{"principal": "1000", "annual_rate_pct": "10", "periods": 12, "frequency": "weekly"}"#,
        )
        .unwrap();
        assert_eq!(weekly.frequency, PaymentFrequency::Monthly);
    }
}
