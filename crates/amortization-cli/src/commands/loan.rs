use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use amortization_core::loan::{amortize, validate_terms};
use amortization_core::payment::payment;
use amortization_core::rate::{normalize_rate_input, period_rate};
use amortization_core::{InsuranceLine, LoanTerms, PaymentFrequency};

use crate::config::Settings;
use crate::input;

/// Loan parameters shared by every loan-based command
#[derive(Args, Debug, Clone)]
pub struct LoanArgs {
    /// Loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Nominal annual rate in percent ("10.5" or "10,5")
    #[arg(long)]
    pub rate: Option<String>,

    /// Number of payments
    #[arg(long)]
    pub term: Option<u32>,

    /// Payment frequency: monthly, bimonthly, quarterly or semiannual
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// Optional insurance charged every period, as NAME=AMOUNT (repeatable)
    #[arg(long = "insurance", value_parser = parse_insurance_line)]
    pub insurance: Vec<InsuranceLine>,
}

impl LoanArgs {
    /// Terms built from flags, or `None` when a required flag is missing.
    pub fn to_terms(&self) -> Result<Option<LoanTerms>, Box<dyn std::error::Error>> {
        let (Some(amount), Some(rate), Some(term)) = (self.amount, self.rate.as_deref(), self.term)
        else {
            return Ok(None);
        };
        let rate = parse_rate(rate)?;
        let frequency = PaymentFrequency::from_label(&self.frequency);
        let terms =
            LoanTerms::new(amount, rate, term, frequency).with_insurance_lines(&self.insurance);
        Ok(Some(terms))
    }
}

fn parse_rate(raw: &str) -> Result<Decimal, Box<dyn std::error::Error>> {
    normalize_rate_input(raw).ok_or_else(|| format!("--rate '{raw}' is not a number").into())
}

/// `NAME=AMOUNT`, or a bare amount for an unnamed line.
fn parse_insurance_line(raw: &str) -> Result<InsuranceLine, String> {
    let (name, amount) = match raw.split_once('=') {
        Some((name, amount)) => (name.trim().to_string(), amount.trim()),
        None => ("insurance".to_string(), raw.trim()),
    };
    let amount: Decimal = amount
        .parse()
        .map_err(|e| format!("invalid insurance amount '{amount}': {e}"))?;
    if amount < Decimal::ZERO {
        return Err(format!("insurance '{name}' cannot be negative"));
    }
    Ok(InsuranceLine { name, amount })
}

/// Terms from `--input`, then flags, then piped stdin.
pub fn resolve_terms(
    input_path: Option<&str>,
    loan: &LoanArgs,
    settings: &Settings,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    let terms = if let Some(path) = input_path {
        input::file::read_structured(path)?
    } else if let Some(terms) = loan.to_terms()? {
        terms
    } else {
        input::load::<LoanTerms>(None)?
            .ok_or("--amount, --rate and --term are required (or provide --input)")?
    };
    settings.check_terms(&terms)?;
    Ok(terms)
}

/// Arguments for period rate conversion
#[derive(Args)]
pub struct RateArgs {
    /// Nominal annual rate in percent ("10.5" or "10,5")
    #[arg(long)]
    pub rate: String,

    /// Payment frequency: monthly, bimonthly, quarterly or semiannual
    #[arg(long, default_value = "monthly")]
    pub frequency: String,
}

pub fn run_rate(args: RateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let annual = parse_rate(&args.rate)?;
    let frequency = PaymentFrequency::from_label(&args.frequency);
    let rate = period_rate(annual, frequency);
    if rate.is_zero() {
        return Err("rate must be positive".into());
    }
    Ok(json!({
        "result": {
            "period_rate": rate.to_string(),
            "period_rate_pct": (rate * Decimal::ONE_HUNDRED).round_dp(4).to_string(),
            "frequency": frequency.label(),
            "periods_per_year": frequency.periods_per_year(),
        }
    }))
}

/// Arguments for the fixed payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to a JSON or YAML loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_payment(
    args: PaymentArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = resolve_terms(args.input.as_deref(), &args.loan, settings)?;
    let rate = validate_terms(&terms)?;
    let base = payment(terms.principal, rate, terms.periods)?;
    Ok(json!({
        "result": {
            "payment": base.round_dp(2).to_string(),
            "insurance_per_period": terms.insurance_per_period.to_string(),
            "total_periodic_payment": (base + terms.insurance_per_period).round_dp(2).to_string(),
            "period_rate": rate.to_string(),
        }
    }))
}

/// Arguments for the amortization table
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_schedule(
    args: ScheduleArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = resolve_terms(args.input.as_deref(), &args.loan, settings)?;
    let result = amortize(&terms)?;
    Ok(serde_json::to_value(result)?)
}
