use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::LoanContext;
use crate::schedule::Schedule;
use crate::strategies::{evaluate, StrategyRequest, StrategyResult};
use crate::types::*;
use crate::AmortizationResult;

/// One scenario line of a side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub scenario: String,
    pub term_periods: u32,
    pub periodic_payment: Money,
    /// Instalment in force at the last period (differs after an installment reduction)
    pub final_payment: Money,
    pub total_interest: Money,
    pub total_insurance: Money,
    /// Principal + interest + insurance
    pub total_paid: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Scenario paying the least overall.
    pub fn cheapest(&self) -> Option<&ComparisonRow> {
        self.rows.iter().min_by_key(|r| r.total_paid)
    }

    /// Scenario finishing first.
    pub fn shortest(&self) -> Option<&ComparisonRow> {
        self.rows.iter().min_by_key(|r| r.term_periods)
    }
}

fn row(scenario: &str, schedule: &Schedule) -> ComparisonRow {
    ComparisonRow {
        scenario: scenario.to_string(),
        term_periods: schedule.final_period(),
        periodic_payment: schedule.first_payment(),
        final_payment: schedule.last_payment(),
        total_interest: schedule.totals.interest_paid,
        total_insurance: schedule.totals.insurance_paid,
        total_paid: schedule.totals.total_paid(),
    }
}

/// Baseline first, then one row per strategy in the given order.
pub fn compare_strategies(baseline: &Schedule, results: &[StrategyResult]) -> ComparisonTable {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(row("Baseline", baseline));
    rows.extend(results.iter().map(|r| row(&r.strategy, &r.schedule)));
    ComparisonTable { rows }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub table: ComparisonTable,
    pub results: Vec<StrategyResult>,
}

/// Run several strategies on one loan and tabulate them against the baseline.
/// A comparative request contributes both of its schedules.
pub fn run_comparison(
    terms: &LoanTerms,
    requests: &[StrategyRequest],
) -> AmortizationResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let ctx = LoanContext::new(terms)?;

    let mut results = Vec::new();
    for request in requests {
        results.extend(evaluate(&ctx, request)?.into_results());
    }
    let table = compare_strategies(&ctx.baseline, &results);

    let mut warnings = Vec::new();
    if requests.is_empty() {
        warnings.push("No strategies supplied; table contains the baseline only".to_string());
    }

    let mut assumptions = loan_assumptions(terms, ctx.period_rate);
    assumptions["strategies"] = serde_json::to_value(requests)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Side-by-side strategy comparison",
        &assumptions,
        warnings,
        elapsed,
        ComparisonOutput { table, results },
    ))
}
