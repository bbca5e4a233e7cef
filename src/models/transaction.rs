use chrono::{DateTime, Utc};
use ratatui::{
    style::{Color, Style},
    text::Span,
    widgets::{Cell, Row},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::user::User;

/// A single dated monetary movement tied to a user and a category. The sign
/// of `amount` distinguishes income (non-negative) from expense (negative)
/// for display coloring only; nothing is enforced client-side.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Body for POST/PUT `/api/transactions`; the server's update DTO is
/// field-identical to its create DTO so one payload serves both.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
}

impl Transaction {
    pub fn amount_style(&self) -> Style {
        if self.amount < Decimal::ZERO {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        }
    }

    pub fn user_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("#{}", self.user_id))
    }

    pub fn category_name(&self) -> String {
        self.category
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{}", self.category_id))
    }

    pub fn to_row(&self) -> Row {
        Row::new(vec![
            Cell::from(self.date.format("%Y-%m-%d").to_string()),
            Cell::from(self.description.clone()),
            Cell::from(self.user_name()),
            Cell::from(self.category_name()),
            Cell::from(Span::styled(
                format!("{:>12}", self.amount.round_dp(2)),
                self.amount_style(),
            )),
        ])
    }
}
