use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::BudgetApi;
use super::query::{TransactionQuery, TypeFilter};
use crate::models::category::{Category, CategoryPayload, TransactionType, TransactionTypePayload};
use crate::models::report::{CategoryReport, UserReport};
use crate::models::transaction::{Transaction, TransactionPayload};
use crate::models::user::{User, UserPayload};
use crate::utils::date;

/// In-memory stand-in for the remote service: id assignment, joined records,
/// and the filter dimensions of the transaction list. Controller tests drive
/// the real `App` against this.
#[derive(Default)]
pub struct MockApi {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    categories: Vec<Category>,
    types: Vec<TransactionType>,
    transactions: Vec<Transaction>,
    next_id: i64,
    queries: Vec<TransactionQuery>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn join_category(&self, id: i64) -> Option<Category> {
        self.categories.iter().find(|c| c.id == id).cloned()
    }

    fn join_user(&self, id: i64) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }
}

impl MockApi {
    /// Every `list_transactions` call in arrival order, for asserting what
    /// the filter synchronizer actually sent.
    pub fn recorded_queries(&self) -> Vec<TransactionQuery> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn list_request_count(&self) -> usize {
        self.state.lock().unwrap().queries.len()
    }
}

fn matches_type(transaction: &Transaction, filter: TypeFilter) -> bool {
    let wanted = match filter {
        TypeFilter::All => return true,
        TypeFilter::Income => "income",
        TypeFilter::Expense => "expense",
    };
    match transaction
        .category
        .as_ref()
        .and_then(|c| c.transaction_type.as_ref())
    {
        Some(t) => t.name.eq_ignore_ascii_case(wanted),
        None => match filter {
            TypeFilter::Income => transaction.amount >= Decimal::ZERO,
            _ => transaction.amount < Decimal::ZERO,
        },
    }
}

fn matches_query(transaction: &Transaction, query: &TransactionQuery) -> bool {
    if !matches_type(transaction, query.type_filter) {
        return false;
    }
    let search = query.search.trim().to_lowercase();
    if !search.is_empty() && !transaction.description.to_lowercase().contains(&search) {
        return false;
    }
    if let Some(start) = query.start_date {
        if transaction.date < date::to_datetime(start) {
            return false;
        }
    }
    if let Some(end) = query.end_date {
        if transaction.date > date::to_datetime(end) {
            return false;
        }
    }
    if let Some(id) = query.category_id {
        if transaction.category_id != id {
            return false;
        }
    }
    true
}

#[async_trait]
impl BudgetApi for MockApi {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn get_user(&self, id: i64) -> Result<User> {
        self.state
            .lock()
            .unwrap()
            .join_user(id)
            .ok_or_else(|| anyhow!("user {id} not found"))
    }

    async fn create_user(&self, payload: &UserPayload) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        let user = User {
            id: state.next_id(),
            name: payload.name.clone(),
            email: payload.email.clone(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow!("user {id} not found"))?;
        user.name = payload.name.clone();
        user.email = payload.email.clone();
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        self.state.lock().unwrap().users.retain(|u| u.id != id);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn get_category(&self, id: i64) -> Result<Category> {
        self.state
            .lock()
            .unwrap()
            .join_category(id)
            .ok_or_else(|| anyhow!("category {id} not found"))
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category> {
        let mut state = self.state.lock().unwrap();
        let transaction_type = state
            .types
            .iter()
            .find(|t| t.id == payload.transaction_type_id)
            .cloned()
            .ok_or_else(|| anyhow!("transaction type {} not found", payload.transaction_type_id))?;
        let category = Category {
            id: state.next_id(),
            name: payload.name.clone(),
            transaction_type_id: payload.transaction_type_id,
            transaction_type: Some(transaction_type),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<Category> {
        let mut state = self.state.lock().unwrap();
        let transaction_type = state
            .types
            .iter()
            .find(|t| t.id == payload.transaction_type_id)
            .cloned();
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow!("category {id} not found"))?;
        category.name = payload.name.clone();
        category.transaction_type_id = payload.transaction_type_id;
        category.transaction_type = transaction_type;
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        self.state.lock().unwrap().categories.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_transaction_types(&self) -> Result<Vec<TransactionType>> {
        Ok(self.state.lock().unwrap().types.clone())
    }

    async fn get_transaction_type(&self, id: i64) -> Result<TransactionType> {
        self.state
            .lock()
            .unwrap()
            .types
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("transaction type {id} not found"))
    }

    async fn create_transaction_type(
        &self,
        payload: &TransactionTypePayload,
    ) -> Result<TransactionType> {
        let mut state = self.state.lock().unwrap();
        let transaction_type = TransactionType {
            id: state.next_id(),
            name: payload.name.clone(),
        };
        state.types.push(transaction_type.clone());
        Ok(transaction_type)
    }

    async fn delete_transaction_type(&self, id: i64) -> Result<()> {
        self.state.lock().unwrap().types.retain(|t| t.id != id);
        Ok(())
    }

    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.clone());
        Ok(state
            .transactions
            .iter()
            .filter(|t| matches_query(t, query))
            .cloned()
            .collect())
    }

    async fn get_transaction(&self, id: i64) -> Result<Transaction> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("transaction {id} not found"))
    }

    async fn create_transaction(&self, payload: &TransactionPayload) -> Result<Transaction> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .join_user(payload.user_id)
            .ok_or_else(|| anyhow!("user {} not found", payload.user_id))?;
        let category = state
            .join_category(payload.category_id)
            .ok_or_else(|| anyhow!("category {} not found", payload.category_id))?;
        let transaction = Transaction {
            id: state.next_id(),
            amount: payload.amount,
            date: payload.date,
            description: payload.description.clone(),
            user_id: payload.user_id,
            category_id: payload.category_id,
            user: Some(user),
            category: Some(category),
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        id: i64,
        payload: &TransactionPayload,
    ) -> Result<Transaction> {
        let mut state = self.state.lock().unwrap();
        let user = state.join_user(payload.user_id);
        let category = state.join_category(payload.category_id);
        let transaction = state
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("transaction {id} not found"))?;
        transaction.amount = payload.amount;
        transaction.date = payload.date;
        transaction.description = payload.description.clone();
        transaction.user_id = payload.user_id;
        transaction.category_id = payload.category_id;
        transaction.user = user;
        transaction.category = category;
        Ok(transaction.clone())
    }

    async fn delete_transaction(&self, id: i64) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .retain(|t| t.id != id);
        Ok(())
    }

    async fn balance(&self) -> Result<Decimal> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .map(|t| t.amount)
            .sum())
    }

    async fn report_by_categories(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategoryReport>> {
        let state = self.state.lock().unwrap();
        let range = TransactionQuery {
            start_date: start,
            end_date: end,
            ..Default::default()
        };
        let mut totals: Vec<CategoryReport> = Vec::new();
        for transaction in state.transactions.iter().filter(|t| matches_query(t, &range)) {
            let name = transaction.category_name();
            let type_name = transaction
                .category
                .as_ref()
                .map(|c| c.type_name().to_string())
                .unwrap_or_default();
            match totals.iter_mut().find(|r| r.category == name) {
                Some(report) => report.total += transaction.amount,
                None => totals.push(CategoryReport {
                    category: name,
                    r#type: type_name,
                    total: transaction.amount,
                    percentage: Decimal::ZERO,
                }),
            }
        }
        let grand: Decimal = totals.iter().map(|r| r.total.abs()).sum();
        if grand > Decimal::ZERO {
            for report in &mut totals {
                report.percentage = report.total.abs() * Decimal::from(100) / grand;
            }
        }
        Ok(totals)
    }

    async fn report_by_users(&self) -> Result<Vec<UserReport>> {
        let state = self.state.lock().unwrap();
        let mut reports: Vec<UserReport> = Vec::new();
        for transaction in &state.transactions {
            let report = match reports.iter_mut().find(|r| r.user_id == transaction.user_id) {
                Some(report) => report,
                None => {
                    reports.push(UserReport {
                        user_id: transaction.user_id,
                        user_name: transaction.user_name(),
                        total_income: Decimal::ZERO,
                        total_expense: Decimal::ZERO,
                    });
                    reports.last_mut().expect("just pushed")
                }
            };
            if transaction.amount >= Decimal::ZERO {
                report.total_income += transaction.amount;
            } else {
                report.total_expense += transaction.amount.abs();
            }
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn get_returns_the_created_record_and_errors_on_unknown_ids() {
        let api = MockApi::default();
        let kind = api
            .create_transaction_type(&TransactionTypePayload { name: "Expense".into() })
            .await
            .unwrap();
        let user = api
            .create_user(&UserPayload { name: "Ann".into(), email: "ann@home".into() })
            .await
            .unwrap();
        let category = api
            .create_category(&CategoryPayload {
                name: "Groceries".into(),
                transaction_type_id: kind.id,
            })
            .await
            .unwrap();
        let transaction = api
            .create_transaction(&TransactionPayload {
                amount: Decimal::from(-12),
                date: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
                description: "bread".into(),
                user_id: user.id,
                category_id: category.id,
            })
            .await
            .unwrap();

        assert_eq!(api.get_transaction_type(kind.id).await.unwrap(), kind);
        assert_eq!(api.get_user(user.id).await.unwrap(), user);
        assert_eq!(api.get_category(category.id).await.unwrap(), category);
        assert_eq!(api.get_transaction(transaction.id).await.unwrap(), transaction);
        assert!(api.get_transaction(9999).await.is_err());
    }

    #[tokio::test]
    async fn creating_a_transaction_against_missing_references_fails() {
        let api = MockApi::default();
        let result = api
            .create_transaction(&TransactionPayload {
                amount: Decimal::ONE,
                date: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
                description: "orphan".into(),
                user_id: 1,
                category_id: 1,
            })
            .await;
        assert!(result.is_err());
    }
}
