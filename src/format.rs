//! Display formatting for KPI tiles and tables.

use crate::metrics::Kpis;
use rust_decimal::Decimal;
use serde::Serialize;

pub const DEFAULT_CURRENCY: &str = "CLP";

/// Whole currency units with thousands separators, e.g. `$126,000,000 CLP`.
///
/// The minus sign follows the dollar sign: `$-2,500,000 CLP`.
pub fn format_currency(amount: Decimal, unit: &str) -> String {
    format!("${} {}", format_amount(amount), unit)
}

/// Whole units with thousands separators and a leading minus when negative.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(0);
    format!("{}{}", sign(rounded), group_thousands(&rounded.abs().trunc().to_string()))
}

/// A ratio rendered as a percentage with one decimal, e.g. `35.0 %`.
pub fn format_percent(ratio: Decimal) -> String {
    let percent = ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(if ratio.is_sign_negative() { Decimal::MIN } else { Decimal::MAX })
        .round_dp(1);
    let whole = percent.abs().trunc();
    let tenths = ((percent.abs() - whole) * Decimal::TEN).trunc();
    format!(
        "{}{}.{} %",
        sign(percent),
        group_thousands(&whole.to_string()),
        tenths
    )
}

fn sign(value: Decimal) -> &'static str {
    if value < Decimal::ZERO { "-" } else { "" }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// The four KPI tiles as display strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormattedKpis {
    pub budget: String,
    pub executed: String,
    pub balance: String,
    pub execution: String,
}

impl FormattedKpis {
    pub fn new(kpis: &Kpis, unit: &str) -> Self {
        FormattedKpis {
            budget: format_currency(kpis.budget, unit),
            executed: format_currency(kpis.executed, unit),
            balance: format_currency(kpis.balance, unit),
            execution: format_percent(kpis.execution_ratio),
        }
    }
}
