use serde::{Deserialize, Serialize};

use crate::comparison::{compare_strategies, ComparisonTable};
use crate::loan::LoanContext;
use crate::schedule::Totals;
use crate::types::Money;
use crate::AmortizationResult;

use super::{extra_payment, installment_reduction, StrategyResult};

/// Same lump sum applied two ways, next to the untouched loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeResult {
    pub baseline_payment: Money,
    pub baseline_final_period: u32,
    pub baseline_totals: Totals,
    /// Lump sum kept as capital reduction (shorter term)
    pub reduce_term: StrategyResult,
    /// Lump sum used to lower the instalment (same term)
    pub reduce_installment: StrategyResult,
    pub table: ComparisonTable,
}

pub fn compare_term_and_installment(
    ctx: &LoanContext,
    at_period: u32,
    amount: Money,
) -> AmortizationResult<ComparativeResult> {
    let reduce_term = extra_payment::single(ctx, "Reduce term", at_period, amount);
    let reduce_installment =
        installment_reduction::reduce_installment(ctx, "Reduce installment", at_period, amount)?;

    let table = compare_strategies(
        &ctx.baseline,
        &[reduce_term.clone(), reduce_installment.clone()],
    );

    Ok(ComparativeResult {
        baseline_payment: ctx.payment,
        baseline_final_period: ctx.baseline.final_period(),
        baseline_totals: ctx.baseline.totals.clone(),
        reduce_term,
        reduce_installment,
        table,
    })
}
