use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::category::{Category, CategoryPayload, TransactionType, TransactionTypePayload};
use crate::models::report::{CategoryReport, UserReport};
use crate::models::transaction::{Transaction, TransactionPayload};
use crate::models::user::{User, UserPayload};

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod query;

pub use http::HttpApi;
pub use query::{TransactionQuery, TypeFilter};

/// The remote budgeting service contract, one method per endpoint. The front
/// end holds only transient copies of server state; everything it shows comes
/// through this trait and every mutation is followed by a full list re-fetch.
#[async_trait]
pub trait BudgetApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn get_user(&self, id: i64) -> Result<User>;
    async fn create_user(&self, payload: &UserPayload) -> Result<User>;
    async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<()>;
    async fn delete_user(&self, id: i64) -> Result<()>;

    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, id: i64) -> Result<Category>;
    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category>;
    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<Category>;
    async fn delete_category(&self, id: i64) -> Result<()>;

    async fn list_transaction_types(&self) -> Result<Vec<TransactionType>>;
    async fn get_transaction_type(&self, id: i64) -> Result<TransactionType>;
    async fn create_transaction_type(
        &self,
        payload: &TransactionTypePayload,
    ) -> Result<TransactionType>;
    async fn delete_transaction_type(&self, id: i64) -> Result<()>;

    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;
    async fn get_transaction(&self, id: i64) -> Result<Transaction>;
    async fn create_transaction(&self, payload: &TransactionPayload) -> Result<Transaction>;
    async fn update_transaction(
        &self,
        id: i64,
        payload: &TransactionPayload,
    ) -> Result<Transaction>;
    async fn delete_transaction(&self, id: i64) -> Result<()>;

    async fn balance(&self) -> Result<Decimal>;
    async fn report_by_categories(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategoryReport>>;
    async fn report_by_users(&self) -> Result<Vec<UserReport>>;
}
