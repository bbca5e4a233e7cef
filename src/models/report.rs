use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-side aggregate per category; totals and percentages are trusted
/// verbatim, the client never recomputes them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category: String,
    pub r#type: String,
    pub total: Decimal,
    pub percentage: Decimal,
}

/// Server-side income/expense aggregate per user.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub user_id: i64,
    pub user_name: String,
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

/// Chart-ready series keyed by category label: one bar per category,
/// magnitude only (terminal bars have no negative direction), largest first.
pub fn category_chart_data(report: &[CategoryReport]) -> Vec<(String, u64)> {
    let mut series: Vec<(String, u64)> = report
        .iter()
        .map(|r| {
            let magnitude: u64 = r.total.abs().round().try_into().unwrap_or(0);
            (r.category.clone(), magnitude)
        })
        .collect();
    series.sort_by(|a, b| b.1.cmp(&a.1));
    series
}
