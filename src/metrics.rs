use crate::record::Table;
use rust_decimal::Decimal;
use serde::Serialize;

/// Total budget injected into the project, in local currency units.
pub const DEFAULT_BUDGET: i64 = 126_000_000;

/// Budget execution summary over the whole, unfiltered table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub budget: Decimal,
    pub executed: Decimal,
    pub balance: Decimal,
    /// Executed over budget as a fraction; zero when the budget is not positive.
    pub execution_ratio: Decimal,
}

impl Kpis {
    /// `None` when a figure, or the ratio as a percentage, leaves the
    /// `Decimal` range.
    pub fn compute(table: &Table, budget: Decimal) -> Option<Self> {
        let executed = table
            .iter()
            .try_fold(Decimal::ZERO, |acc, record| acc.checked_add(record.amount))?;
        let execution_ratio = if budget > Decimal::ZERO {
            executed.checked_div(budget)?
        } else {
            Decimal::ZERO
        };
        execution_ratio.checked_mul(Decimal::ONE_HUNDRED)?;

        Some(Kpis {
            budget,
            executed,
            balance: budget.checked_sub(executed)?,
            execution_ratio,
        })
    }

    pub fn execution_percent(&self) -> Decimal {
        self.execution_ratio * Decimal::ONE_HUNDRED
    }
}
