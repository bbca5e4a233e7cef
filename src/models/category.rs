use ratatui::{
    text::{Line, Span},
    widgets::ListItem,
};
use serde::{Deserialize, Serialize};

/// Income/expense classifier owned by the server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTypePayload {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Must reference an existing TransactionType; the server validates it,
    /// the client only defaults it from a loaded type list.
    pub transaction_type_id: i64,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

/// Body for POST/PUT `/api/categories`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    pub transaction_type_id: i64,
}

impl Category {
    pub fn type_name(&self) -> &str {
        self.transaction_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("-")
    }

    pub fn to_list_item(&self) -> ListItem {
        ListItem::new(Line::from(vec![
            Span::raw(format!("{:<24} ", self.name)),
            Span::raw(format!("[{}]", self.type_name())),
        ]))
    }
}
