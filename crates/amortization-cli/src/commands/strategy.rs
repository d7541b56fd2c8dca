use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use amortization_core::comparison::run_comparison;
use amortization_core::strategies::{self, ScheduledExtra, StrategyRequest};
use amortization_core::LoanTerms;

use crate::commands::loan::{resolve_terms, LoanArgs};
use crate::config::Settings;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyKind {
    Single,
    Recurring,
    Windowed,
    InstallmentReduction,
    ScheduledMultiple,
    Comparative,
}

/// Arguments for a single extra-payment strategy
#[derive(Args)]
pub struct StrategyArgs {
    /// Path to a JSON or YAML file holding `loan` and `strategy`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Strategy to evaluate
    #[arg(long)]
    pub kind: Option<StrategyKind>,

    /// Period of the lump sum (single, installment-reduction, comparative)
    #[arg(long)]
    pub at_period: Option<u32>,

    /// First period with an extra payment (recurring, windowed)
    #[arg(long)]
    pub from_period: Option<u32>,

    /// Last period with an extra payment (windowed)
    #[arg(long)]
    pub to_period: Option<u32>,

    /// Extra payment amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// PERIOD:AMOUNT pairs for scheduled-multiple (comma-separated, e.g. "12:5000000,24:3000000")
    #[arg(long, value_delimiter = ',', value_parser = parse_scheduled_extra)]
    pub payments: Option<Vec<ScheduledExtra>>,
}

#[derive(Deserialize)]
struct StrategyFile {
    loan: LoanTerms,
    strategy: StrategyRequest,
}

fn parse_scheduled_extra(raw: &str) -> Result<ScheduledExtra, String> {
    let (period, amount) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PERIOD:AMOUNT, got '{raw}'"))?;
    let period: u32 = period
        .trim()
        .parse()
        .map_err(|e| format!("invalid period '{period}': {e}"))?;
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|e| format!("invalid amount '{amount}': {e}"))?;
    Ok(ScheduledExtra { period, amount })
}

impl StrategyArgs {
    fn request(&self, kind: StrategyKind) -> Result<StrategyRequest, Box<dyn std::error::Error>> {
        let amount = || self.amount.ok_or("--amount is required for this strategy");
        let at_period = || self.at_period.ok_or("--at-period is required for this strategy");
        let from_period = || self.from_period.ok_or("--from-period is required for this strategy");

        let request = match kind {
            StrategyKind::Single => StrategyRequest::Single {
                at_period: at_period()?,
                amount: amount()?,
            },
            StrategyKind::Recurring => StrategyRequest::Recurring {
                from_period: from_period()?,
                amount: amount()?,
            },
            StrategyKind::Windowed => StrategyRequest::Windowed {
                from_period: from_period()?,
                to_period: self
                    .to_period
                    .ok_or("--to-period is required for a windowed strategy")?,
                amount: amount()?,
            },
            StrategyKind::InstallmentReduction => StrategyRequest::InstallmentReduction {
                at_period: at_period()?,
                amount: amount()?,
            },
            StrategyKind::ScheduledMultiple => StrategyRequest::ScheduledMultiple {
                payments: self
                    .payments
                    .clone()
                    .ok_or("--payments is required for scheduled-multiple")?,
            },
            StrategyKind::Comparative => StrategyRequest::Comparative {
                at_period: at_period()?,
                amount: amount()?,
            },
        };
        Ok(request)
    }
}

pub fn run_strategy(
    args: StrategyArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (terms, request) = match (&args.input, args.kind) {
        (Some(path), _) => {
            let file: StrategyFile = input::file::read_structured(path)?;
            settings.check_terms(&file.loan)?;
            (file.loan, file.strategy)
        }
        (None, Some(kind)) => {
            let terms = resolve_terms(None, &args.loan, settings)?;
            (terms, args.request(kind)?)
        }
        (None, None) => {
            let file: StrategyFile = input::load(None)?
                .ok_or("--kind with loan flags, --input <file>, or stdin required")?;
            settings.check_terms(&file.loan)?;
            (file.loan, file.strategy)
        }
    };

    let result = strategies::run_strategy(&terms, &request)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a side-by-side comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON or YAML file holding `loan` and `strategies`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct CompareFile {
    loan: LoanTerms,
    #[serde(default)]
    strategies: Vec<StrategyRequest>,
}

pub fn run_compare(
    args: CompareArgs,
    settings: &Settings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let file: CompareFile = input::load(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for a comparison")?;
    settings.check_terms(&file.loan)?;

    let result = run_comparison(&file.loan, &file.strategies)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(kind: StrategyKind) -> StrategyArgs {
        StrategyArgs {
            input: None,
            loan: LoanArgs {
                amount: Some(dec!(1000000)),
                rate: Some("12".into()),
                term: Some(12),
                frequency: "monthly".into(),
                insurance: vec![],
            },
            kind: Some(kind),
            at_period: Some(3),
            from_period: Some(1),
            to_period: None,
            amount: Some(dec!(100000)),
            payments: None,
        }
    }

    #[test]
    fn test_scheduled_extra_parsing() {
        let extra = parse_scheduled_extra("12: 5000000").unwrap();
        assert_eq!(extra.period, 12);
        assert_eq!(extra.amount, dec!(5000000));
        assert!(parse_scheduled_extra("12").is_err());
    }

    #[test]
    fn test_windowed_requires_to_period() {
        let a = args(StrategyKind::Windowed);
        let err = a.request(StrategyKind::Windowed).unwrap_err();
        assert!(err.to_string().contains("--to-period"));
    }

    #[test]
    fn test_recurring_from_flags() {
        let value = run_strategy(args(StrategyKind::Recurring), &Settings::default()).unwrap();
        let final_period = value["result"]["new_final_period"].as_u64().unwrap();
        assert!(final_period < 12);
    }

    #[test]
    fn test_comparative_from_flags() {
        let value = run_strategy(args(StrategyKind::Comparative), &Settings::default()).unwrap();
        assert_eq!(value["result"]["table"]["rows"].as_array().unwrap().len(), 3);
    }
}
