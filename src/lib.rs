pub mod api;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used items
pub use api::{BudgetApi, HttpApi, TransactionQuery, TypeFilter};
pub use models::category::{Category, TransactionType};
pub use models::transaction::Transaction;
pub use models::user::User;
pub use ui::app::App;
