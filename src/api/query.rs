use chrono::NaiveDate;

use crate::utils::date;

/// Transaction type tab. `All` is the unfiltered default and serializes to
/// nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Income => "income",
            TypeFilter::Expense => "expense",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TypeFilter::All => TypeFilter::Income,
            TypeFilter::Income => TypeFilter::Expense,
            TypeFilter::Expense => TypeFilter::All,
        }
    }
}

/// The five user-adjustable filter dimensions of the transaction list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionQuery {
    pub type_filter: TypeFilter,
    pub search: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<i64>,
}

impl TransactionQuery {
    /// Exactly the non-empty dimensions become query parameters; the server
    /// treats absent ones as unfiltered. Dates go out as normalized ISO-8601
    /// UTC timestamps no matter how they were entered.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match self.type_filter {
            TypeFilter::All => {}
            filter => pairs.push(("type", filter.as_str().to_string())),
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", date::to_timestamp(start)));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", date::to_timestamp(end)));
        }
        if let Some(id) = self.category_id {
            pairs.push(("categoryId", id.to_string()));
        }
        pairs
    }
}
