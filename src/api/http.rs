use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::query::TransactionQuery;
use super::BudgetApi;
use crate::models::category::{Category, CategoryPayload, TransactionType, TransactionTypePayload};
use crate::models::report::{CategoryReport, UserReport};
use crate::models::transaction::{Transaction, TransactionPayload};
use crate::models::user::{User, UserPayload};
use crate::utils::date;

/// Resource client over the remote HTTP/JSON service. One shared
/// `reqwest::Client`, no retries, no timeout tuning; any non-2xx response
/// surfaces as an error from `error_for_status`.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_with(path, &[]).await
    }

    async fn get_json_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(path, ?query, "GET");
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {path}"))?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "POST");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "PUT");
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {path}"))?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// PUT for endpoints that answer with an empty body.
    async fn put_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        debug!(path, "PUT");
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {path}"))?
            .error_for_status()?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        debug!(path, "DELETE");
        self.client
            .delete(self.url(path))
            .send()
            .await
            .with_context(|| format!("DELETE {path}"))?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl BudgetApi for HttpApi {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.get_json("users").await
    }

    async fn get_user(&self, id: i64) -> Result<User> {
        self.get_json(&format!("users/{id}")).await
    }

    async fn create_user(&self, payload: &UserPayload) -> Result<User> {
        self.post_json("users", payload).await
    }

    async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<()> {
        self.put_unit(&format!("users/{id}"), payload).await
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        self.delete(&format!("users/{id}")).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.get_json("categories").await
    }

    async fn get_category(&self, id: i64) -> Result<Category> {
        self.get_json(&format!("categories/{id}")).await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<Category> {
        self.post_json("categories", payload).await
    }

    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<Category> {
        self.put_json(&format!("categories/{id}"), payload).await
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        self.delete(&format!("categories/{id}")).await
    }

    async fn list_transaction_types(&self) -> Result<Vec<TransactionType>> {
        self.get_json("transactiontypes").await
    }

    async fn get_transaction_type(&self, id: i64) -> Result<TransactionType> {
        self.get_json(&format!("transactiontypes/{id}")).await
    }

    async fn create_transaction_type(
        &self,
        payload: &TransactionTypePayload,
    ) -> Result<TransactionType> {
        self.post_json("transactiontypes", payload).await
    }

    async fn delete_transaction_type(&self, id: i64) -> Result<()> {
        self.delete(&format!("transactiontypes/{id}")).await
    }

    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.get_json_with("transactions", &query.to_query_pairs())
            .await
    }

    async fn get_transaction(&self, id: i64) -> Result<Transaction> {
        self.get_json(&format!("transactions/{id}")).await
    }

    async fn create_transaction(&self, payload: &TransactionPayload) -> Result<Transaction> {
        self.post_json("transactions", payload).await
    }

    async fn update_transaction(
        &self,
        id: i64,
        payload: &TransactionPayload,
    ) -> Result<Transaction> {
        self.put_json(&format!("transactions/{id}"), payload).await
    }

    async fn delete_transaction(&self, id: i64) -> Result<()> {
        self.delete(&format!("transactions/{id}")).await
    }

    async fn balance(&self) -> Result<Decimal> {
        self.get_json("transactions/balance").await
    }

    async fn report_by_categories(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategoryReport>> {
        let mut query = Vec::new();
        if let Some(start) = start {
            query.push(("startDate", date::to_timestamp(start)));
        }
        if let Some(end) = end {
            query.push(("endDate", date::to_timestamp(end)));
        }
        self.get_json_with("transactions/by-categories", &query)
            .await
    }

    async fn report_by_users(&self) -> Result<Vec<UserReport>> {
        self.get_json("transactions/by-users").await
    }
}
