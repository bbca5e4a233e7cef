//! Entity form controllers. Each form owns plain string buffers for its
//! fields, populated either from create defaults or from an existing record;
//! `build` validates the buffers into a payload and parks any complaint in
//! the form's `error` slot.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::category::{Category, CategoryPayload, TransactionType, TransactionTypePayload};
use crate::models::transaction::{Transaction, TransactionPayload};
use crate::models::user::{User, UserPayload};
use crate::utils::date;

fn first_index(len: usize) -> Option<usize> {
    if len == 0 { None } else { Some(0) }
}

fn cycle(current: Option<usize>, delta: i32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0) as i32;
    Some((current + delta).rem_euclid(len as i32) as usize)
}

#[derive(Debug, Default, Clone)]
pub struct UserForm {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    // 0: Name, 1: Email
    pub focus: usize,
    pub error: Option<String>,
}

impl UserForm {
    pub const FIELDS: usize = 2;

    pub fn create_default() -> Self {
        Self::default()
    }

    pub fn edit(user: &User) -> Self {
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            ..Self::default()
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + Self::FIELDS - 1) % Self::FIELDS;
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            0 => self.name.push(c),
            _ => self.email.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            0 => {
                self.name.pop();
            }
            _ => {
                self.email.pop();
            }
        }
    }

    pub fn build(&mut self) -> Option<UserPayload> {
        if self.name.trim().is_empty() {
            self.error = Some("Name is required".into());
            return None;
        }
        if self.email.trim().is_empty() {
            self.error = Some("Email is required".into());
            return None;
        }
        self.error = None;
        Some(UserPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct CategoryForm {
    pub id: Option<i64>,
    pub name: String,
    /// Index into the loaded transaction type list; stays unset when the
    /// list is empty and blocks submission instead of sending id 0.
    pub type_sel: Option<usize>,
    // 0: Name, 1: Type
    pub focus: usize,
    pub error: Option<String>,
}

impl CategoryForm {
    pub const FIELDS: usize = 2;

    pub fn create_default(types: &[TransactionType]) -> Self {
        Self {
            type_sel: first_index(types.len()),
            ..Self::default()
        }
    }

    pub fn edit(category: &Category, types: &[TransactionType]) -> Self {
        let type_sel = types
            .iter()
            .position(|t| t.id == category.transaction_type_id)
            .or_else(|| first_index(types.len()));
        Self {
            id: Some(category.id),
            name: category.name.clone(),
            type_sel,
            ..Self::default()
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % Self::FIELDS;
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + Self::FIELDS - 1) % Self::FIELDS;
    }

    pub fn push_char(&mut self, c: char) {
        if self.focus == 0 {
            self.name.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == 0 {
            self.name.pop();
        }
    }

    pub fn cycle_type(&mut self, delta: i32, types_len: usize) {
        if self.focus == 1 {
            self.type_sel = cycle(self.type_sel, delta, types_len);
        }
    }

    pub fn build(&mut self, types: &[TransactionType]) -> Option<CategoryPayload> {
        if self.name.trim().is_empty() {
            self.error = Some("Name is required".into());
            return None;
        }
        let Some(transaction_type) = self.type_sel.and_then(|i| types.get(i)) else {
            self.error = Some("No transaction types loaded".into());
            return None;
        };
        self.error = None;
        Some(CategoryPayload {
            name: self.name.trim().to_string(),
            transaction_type_id: transaction_type.id,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct TransactionTypeForm {
    pub name: String,
    pub error: Option<String>,
}

impl TransactionTypeForm {
    pub fn push_char(&mut self, c: char) {
        self.name.push(c);
    }

    pub fn backspace(&mut self) {
        self.name.pop();
    }

    pub fn build(&mut self) -> Option<TransactionTypePayload> {
        if self.name.trim().is_empty() {
            self.error = Some("Name is required".into());
            return None;
        }
        self.error = None;
        Some(TransactionTypePayload {
            name: self.name.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnField {
    Amount,
    Date,
    Description,
    User,
    Category,
}

impl TxnField {
    fn next(self) -> Self {
        use TxnField::*;
        match self {
            Amount => Date,
            Date => Description,
            Description => User,
            User => Category,
            Category => Amount,
        }
    }

    fn prev(self) -> Self {
        use TxnField::*;
        match self {
            Amount => Category,
            Date => Amount,
            Description => Date,
            User => Description,
            Category => User,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub id: Option<i64>,
    pub amount: String,
    /// YYYY-MM-DD buffer; defaults to today for new transactions.
    pub date: String,
    pub description: String,
    pub user_sel: Option<usize>,
    pub category_sel: Option<usize>,
    pub focus: TxnField,
    pub error: Option<String>,
}

impl TransactionForm {
    pub fn create_default(users: &[User], categories: &[Category]) -> Self {
        Self {
            id: None,
            amount: String::new(),
            date: date::today().format("%Y-%m-%d").to_string(),
            description: String::new(),
            user_sel: first_index(users.len()),
            category_sel: first_index(categories.len()),
            focus: TxnField::Amount,
            error: None,
        }
    }

    pub fn edit(transaction: &Transaction, users: &[User], categories: &[Category]) -> Self {
        let user_sel = users
            .iter()
            .position(|u| u.id == transaction.user_id)
            .or_else(|| first_index(users.len()));
        let category_sel = categories
            .iter()
            .position(|c| c.id == transaction.category_id)
            .or_else(|| first_index(categories.len()));
        Self {
            id: Some(transaction.id),
            amount: transaction.amount.to_string(),
            date: transaction.date.format("%Y-%m-%d").to_string(),
            description: transaction.description.clone(),
            user_sel,
            category_sel,
            focus: TxnField::Amount,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            TxnField::Amount => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    self.amount.push(c);
                }
            }
            TxnField::Date => {
                if c.is_ascii_digit() || c == '-' || c == '.' || c == '/' {
                    self.date.push(c);
                }
            }
            TxnField::Description => self.description.push(c),
            TxnField::User | TxnField::Category => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            TxnField::Amount => {
                self.amount.pop();
            }
            TxnField::Date => {
                self.date.pop();
            }
            TxnField::Description => {
                self.description.pop();
            }
            TxnField::User | TxnField::Category => {}
        }
    }

    pub fn cycle_selection(&mut self, delta: i32, users_len: usize, categories_len: usize) {
        match self.focus {
            TxnField::User => self.user_sel = cycle(self.user_sel, delta, users_len),
            TxnField::Category => self.category_sel = cycle(self.category_sel, delta, categories_len),
            _ => {}
        }
    }

    pub fn build(&mut self, users: &[User], categories: &[Category]) -> Option<TransactionPayload> {
        let Some(user) = self.user_sel.and_then(|i| users.get(i)) else {
            self.error = Some("No users loaded".into());
            return None;
        };
        let Some(category) = self.category_sel.and_then(|i| categories.get(i)) else {
            self.error = Some("No categories loaded".into());
            return None;
        };
        let amount = match Decimal::from_str(self.amount.trim()) {
            Ok(amount) => amount,
            Err(_) => {
                self.error = Some("Invalid amount".into());
                return None;
            }
        };
        let parsed = match date::parse_input_date(&self.date) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };
        self.error = None;
        Some(TransactionPayload {
            amount,
            date: date::to_datetime(parsed),
            description: self.description.trim().to_string(),
            user_id: user.id,
            category_id: category.id,
        })
    }
}
