use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use amortization_core::schedule::ExtraPaymentPolicy;
use amortization_core::strategies::{StrategyRequest, StrategyResult};
use amortization_core::LoanTerms;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| napi::Error::from_reason(format!("{field}: {e}")))
}

// ---------------------------------------------------------------------------
// Rate and payment
// ---------------------------------------------------------------------------

/// Period rate as a decimal string; "0" when the rate is not positive.
#[napi]
pub fn compute_period_rate(annual_rate_pct: String, frequency: String) -> NapiResult<String> {
    let rate = amortization_core::rate::normalize_rate_input(&annual_rate_pct).ok_or_else(|| {
        napi::Error::from_reason(format!("annual_rate_pct: '{annual_rate_pct}' is not a number"))
    })?;
    Ok(amortization_core::rate::period_rate_for_label(rate, &frequency).to_string())
}

#[napi]
pub fn compute_payment(principal: String, period_rate: String, periods: u32) -> NapiResult<String> {
    let principal = parse_decimal("principal", &principal)?;
    let period_rate = parse_decimal("period_rate", &period_rate)?;
    let payment = amortization_core::payment::payment(principal, period_rate, periods)
        .map_err(to_napi_error)?;
    Ok(payment.to_string())
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleInput {
    principal: Decimal,
    period_rate: Decimal,
    payment: Decimal,
    periods: u32,
    #[serde(default)]
    insurance_per_period: Decimal,
    #[serde(default)]
    policy: Option<ExtraPaymentPolicy>,
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = amortization_core::schedule::generate_schedule(
        input.principal,
        input.period_rate,
        input.payment,
        input.periods,
        input.insurance_per_period,
        input.policy.as_ref(),
    );
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let terms: LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::loan::amortize(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StrategyInput {
    loan: LoanTerms,
    strategy: StrategyRequest,
}

#[napi]
pub fn run_strategy(input_json: String) -> NapiResult<String> {
    let input: StrategyInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::strategies::run_strategy(&input.loan, &input.strategy)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ComparisonInput {
    loan: LoanTerms,
    strategies: Vec<StrategyRequest>,
}

#[napi]
pub fn run_comparison(input_json: String) -> NapiResult<String> {
    let input: ComparisonInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::comparison::run_comparison(&input.loan, &input.strategies)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ProjectionInput {
    baseline: amortization_core::schedule::Schedule,
    results: Vec<StrategyResult>,
}

/// Tabulate already computed results without re-running any schedule.
#[napi]
pub fn compare_strategies(input_json: String) -> NapiResult<String> {
    let input: ProjectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let table = amortization_core::comparison::compare_strategies(&input.baseline, &input.results);
    serde_json::to_string(&table).map_err(to_napi_error)
}
