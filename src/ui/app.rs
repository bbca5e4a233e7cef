use std::sync::Arc;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::{ListState, TableState};
use rust_decimal::Decimal;
use tracing::warn;

use crate::api::{BudgetApi, TransactionQuery};
use crate::models::category::{Category, TransactionType};
use crate::models::report::{self, CategoryReport, UserReport};
use crate::models::transaction::Transaction;
use crate::models::user::User;
use crate::ui::forms::{CategoryForm, TransactionForm, TransactionTypeForm, UserForm};
use crate::utils::{date, export};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Transactions,
    Users,
    Categories,
    Reports,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Searching,
    StartDate,
    EndDate,
    ReportStart,
    ReportEnd,
}

/// Filter synchronizer: the five dimensions of the transaction list plus a
/// revision counter. Every setter bumps the revision; the sync pass refetches
/// when the applied revision falls behind, so several edits arriving between
/// passes coalesce into one request.
#[derive(Debug, Default)]
pub struct Filters {
    query: TransactionQuery,
    revision: u64,
}

impl Filters {
    pub fn query(&self) -> &TransactionQuery {
        &self.query
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cycle_type(&mut self) {
        self.query.type_filter = self.query.type_filter.next();
        self.revision += 1;
    }

    pub fn set_search(&mut self, text: String) {
        self.query.search = text;
        self.revision += 1;
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.query.start_date = date;
        self.revision += 1;
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.query.end_date = date;
        self.revision += 1;
    }

    /// None -> first category -> ... -> last -> None.
    pub fn cycle_category(&mut self, categories: &[Category]) {
        self.query.category_id = match self.query.category_id {
            None => categories.first().map(|c| c.id),
            Some(current) => match categories.iter().position(|c| c.id == current) {
                Some(i) if i + 1 < categories.len() => Some(categories[i + 1].id),
                _ => None,
            },
        };
        self.revision += 1;
    }

    pub fn reset(&mut self) {
        self.query = TransactionQuery::default();
        self.revision += 1;
    }
}

#[derive(Default)]
pub struct TransactionsPage {
    pub rows: Vec<Transaction>,
    pub table: TableState,
    pub loading: bool,
    /// Filter revision the current rows were fetched under; None forces a
    /// fetch on the next sync pass.
    pub applied_revision: Option<u64>,
    pub form: Option<TransactionForm>,
    pub ref_users: Vec<User>,
    pub ref_categories: Vec<Category>,
}

#[derive(Default)]
pub struct UsersPage {
    pub list: Vec<User>,
    pub sel: ListState,
    pub loaded: bool,
    pub form: Option<UserForm>,
}

#[derive(Default)]
pub struct CategoriesPage {
    pub list: Vec<Category>,
    pub types: Vec<TransactionType>,
    pub sel: ListState,
    pub loaded: bool,
    pub form: Option<CategoryForm>,
    pub type_form: Option<TransactionTypeForm>,
}

#[derive(Default)]
pub struct DashboardPage {
    pub balance: Option<Decimal>,
    pub chart: Vec<(String, u64)>,
    pub loaded: bool,
}

#[derive(Default)]
pub struct ReportsPage {
    pub by_category: Vec<CategoryReport>,
    pub by_users: Vec<UserReport>,
    pub chart: Vec<(String, u64)>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub loaded: bool,
}

pub struct App {
    pub api: Arc<dyn BudgetApi>,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub input_mode: InputMode,
    pub input_text: String,
    pub filters: Filters,
    pub dashboard: DashboardPage,
    pub txns: TransactionsPage,
    pub users: UsersPage,
    pub categories: CategoriesPage,
    pub reports: ReportsPage,
}

impl App {
    pub fn new(api: Arc<dyn BudgetApi>) -> Self {
        Self {
            api,
            tab: Tab::Dashboard,
            status: "Tab switch view | ? help | q quit".into(),
            quit: false,
            input_mode: InputMode::Normal,
            input_text: String::new(),
            filters: Filters::default(),
            dashboard: DashboardPage::default(),
            txns: TransactionsPage::default(),
            users: UsersPage::default(),
            categories: CategoriesPage::default(),
            reports: ReportsPage::default(),
        }
    }

    /// One synchronization pass: issue the single fetch the visible tab
    /// needs, if any. Run after every input event and once at startup, so
    /// fetches are sequential and the latest filter state always wins.
    pub async fn sync(&mut self) {
        match self.tab {
            Tab::Dashboard if !self.dashboard.loaded => self.load_dashboard().await,
            Tab::Transactions if self.txns.applied_revision != Some(self.filters.revision()) => {
                self.load_transactions().await
            }
            Tab::Users if !self.users.loaded => self.load_users().await,
            Tab::Categories if !self.categories.loaded => self.load_categories().await,
            Tab::Reports if !self.reports.loaded => self.load_reports().await,
            _ => {}
        }
    }

    async fn load_transactions(&mut self) {
        let revision = self.filters.revision();
        self.txns.loading = true;
        match self.api.list_transactions(self.filters.query()).await {
            Ok(rows) => {
                self.txns.rows = rows;
                let len = self.txns.rows.len();
                match self.txns.table.selected() {
                    Some(i) if i >= len => {
                        self.txns.table.select(if len == 0 { None } else { Some(len - 1) })
                    }
                    None if len > 0 => self.txns.table.select(Some(0)),
                    _ => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "transaction list fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
        // mark the revision applied even on failure; retried only on the
        // next filter change or explicit refresh
        self.txns.applied_revision = Some(revision);
        self.txns.loading = false;
    }

    async fn load_users(&mut self) {
        self.users.loaded = true;
        match self.api.list_users().await {
            Ok(list) => {
                self.users.list = list;
                let len = self.users.list.len();
                match self.users.sel.selected() {
                    Some(i) if i >= len => {
                        self.users.sel.select(if len == 0 { None } else { Some(len - 1) })
                    }
                    None if len > 0 => self.users.sel.select(Some(0)),
                    _ => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "user list fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
    }

    async fn load_categories(&mut self) {
        self.categories.loaded = true;
        match self.api.list_categories().await {
            Ok(list) => {
                self.categories.list = list;
                let len = self.categories.list.len();
                match self.categories.sel.selected() {
                    Some(i) if i >= len => {
                        self.categories.sel.select(if len == 0 { None } else { Some(len - 1) })
                    }
                    None if len > 0 => self.categories.sel.select(Some(0)),
                    _ => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "category list fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
        match self.api.list_transaction_types().await {
            Ok(types) => self.categories.types = types,
            Err(e) => {
                warn!(error = %e, "transaction type list fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
    }

    async fn load_dashboard(&mut self) {
        self.dashboard.loaded = true;
        match self.api.balance().await {
            Ok(balance) => self.dashboard.balance = Some(balance),
            Err(e) => {
                warn!(error = %e, "balance fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
        match self.api.report_by_categories(None, None).await {
            Ok(by_category) => self.dashboard.chart = report::category_chart_data(&by_category),
            Err(e) => {
                warn!(error = %e, "category report fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
    }

    async fn load_reports(&mut self) {
        self.reports.loaded = true;
        match self
            .api
            .report_by_categories(self.reports.start_date, self.reports.end_date)
            .await
        {
            Ok(by_category) => {
                self.reports.chart = report::category_chart_data(&by_category);
                self.reports.by_category = by_category;
            }
            Err(e) => {
                warn!(error = %e, "category report fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
        match self.api.report_by_users().await {
            Ok(by_users) => self.reports.by_users = by_users,
            Err(e) => {
                warn!(error = %e, "user report fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key.code);
            return;
        }

        // open popups capture input before anything global
        if self.users.form.is_some() {
            self.handle_user_form_key(key.code).await;
            return;
        }
        if self.categories.type_form.is_some() {
            self.handle_type_form_key(key.code).await;
            return;
        }
        if self.categories.form.is_some() {
            self.handle_category_form_key(key.code).await;
            return;
        }
        if self.txns.form.is_some() {
            self.handle_txn_form_key(key.code).await;
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.quit = true;
                return;
            }
            KeyCode::Tab => {
                self.next_tab();
                return;
            }
            KeyCode::BackTab => {
                self.prev_tab();
                return;
            }
            KeyCode::Char('?') => {
                self.tab = Tab::Help;
                return;
            }
            _ => {}
        }

        match self.tab {
            Tab::Dashboard => self.handle_dashboard_key(key.code),
            Tab::Transactions => self.handle_transactions_key(key.code).await,
            Tab::Users => self.handle_users_key(key.code).await,
            Tab::Categories => self.handle_categories_key(key.code).await,
            Tab::Reports => self.handle_reports_key(key.code),
            Tab::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('b')) {
                    self.tab = Tab::Dashboard;
                }
            }
        }
    }

    fn next_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Dashboard => Tab::Transactions,
            Tab::Transactions => Tab::Users,
            Tab::Users => Tab::Categories,
            Tab::Categories => Tab::Reports,
            Tab::Reports | Tab::Help => Tab::Dashboard,
        };
    }

    fn prev_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Dashboard => Tab::Reports,
            Tab::Transactions => Tab::Dashboard,
            Tab::Users => Tab::Transactions,
            Tab::Categories => Tab::Users,
            Tab::Reports | Tab::Help => Tab::Categories,
        };
    }

    fn handle_dashboard_key(&mut self, code: KeyCode) {
        if code == KeyCode::Char('r') {
            self.dashboard.loaded = false;
        }
    }

    async fn handle_transactions_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.move_txn(-1),
            KeyCode::Down => self.move_txn(1),
            KeyCode::Char('n') => self.open_txn_form(None).await,
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(transaction) = self.selected_txn().cloned() {
                    self.open_txn_form(Some(transaction)).await;
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => self.delete_selected_txn().await,
            KeyCode::Char('r') => self.txns.applied_revision = None,
            KeyCode::Char('t') => self.filters.cycle_type(),
            KeyCode::Char('c') => {
                if self.txns.ref_categories.is_empty() {
                    match self.api.list_categories().await {
                        Ok(categories) => self.txns.ref_categories = categories,
                        Err(e) => {
                            warn!(error = %e, "category list fetch failed");
                            self.status = format!("Load failed: {e}");
                        }
                    }
                }
                self.filters.cycle_category(&self.txns.ref_categories);
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.input_text = self.filters.query().search.clone();
                self.input_mode = InputMode::Searching;
            }
            KeyCode::Char('s') => {
                self.input_text.clear();
                self.input_mode = InputMode::StartDate;
            }
            KeyCode::Char('d') => {
                self.input_text.clear();
                self.input_mode = InputMode::EndDate;
            }
            KeyCode::Char('F') => self.filters.reset(),
            KeyCode::Char('v') => self.export_visible(),
            _ => {}
        }
    }

    async fn handle_users_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.move_user(-1),
            KeyCode::Down => self.move_user(1),
            KeyCode::Char('n') => self.users.form = Some(UserForm::create_default()),
            KeyCode::Char('e') | KeyCode::Enter => {
                // re-fetch the record on open, the list copy may be stale
                if let Some(id) = self.selected_user_id() {
                    match self.api.get_user(id).await {
                        Ok(user) => self.users.form = Some(UserForm::edit(&user)),
                        Err(e) => {
                            warn!(error = %e, "user fetch failed");
                            self.status = format!("Load failed: {e}");
                        }
                    }
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = self.selected_user_id() {
                    match self.api.delete_user(id).await {
                        Ok(()) => {
                            self.users.loaded = false;
                            self.status = "Deleted".into();
                        }
                        Err(e) => {
                            warn!(error = %e, "user delete failed");
                            self.status = format!("Delete failed: {e}");
                        }
                    }
                }
            }
            KeyCode::Char('r') => self.users.loaded = false,
            _ => {}
        }
    }

    async fn handle_categories_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.move_category(-1),
            KeyCode::Down => self.move_category(1),
            KeyCode::Char('n') => {
                self.categories.form = Some(CategoryForm::create_default(&self.categories.types));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(category) = self.selected_category().cloned() {
                    self.categories.form =
                        Some(CategoryForm::edit(&category, &self.categories.types));
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = self.selected_category().map(|c| c.id) {
                    match self.api.delete_category(id).await {
                        Ok(()) => {
                            self.categories.loaded = false;
                            self.status = "Deleted".into();
                        }
                        Err(e) => {
                            warn!(error = %e, "category delete failed");
                            self.status = format!("Delete failed: {e}");
                        }
                    }
                }
            }
            KeyCode::Char('t') => {
                self.categories.type_form = Some(TransactionTypeForm::default());
            }
            KeyCode::Char('r') => self.categories.loaded = false,
            _ => {}
        }
    }

    fn handle_reports_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('r') => self.reports.loaded = false,
            KeyCode::Char('s') => {
                self.input_text.clear();
                self.input_mode = InputMode::ReportStart;
            }
            KeyCode::Char('d') => {
                self.input_text.clear();
                self.input_mode = InputMode::ReportEnd;
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.input_text.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.submit_prompt(),
            KeyCode::Backspace => {
                self.input_text.pop();
            }
            KeyCode::Char(c) => self.input_text.push(c),
            _ => {}
        }
    }

    fn submit_prompt(&mut self) {
        let text = std::mem::take(&mut self.input_text);
        match self.input_mode {
            InputMode::Searching => self.filters.set_search(text.trim().to_string()),
            InputMode::StartDate
            | InputMode::EndDate
            | InputMode::ReportStart
            | InputMode::ReportEnd => {
                let parsed = if text.trim().is_empty() {
                    Ok(None)
                } else {
                    date::parse_input_date(&text).map(Some)
                };
                match parsed {
                    Ok(parsed) => match self.input_mode {
                        InputMode::StartDate => self.filters.set_start_date(parsed),
                        InputMode::EndDate => self.filters.set_end_date(parsed),
                        InputMode::ReportStart => {
                            self.reports.start_date = parsed;
                            self.reports.loaded = false;
                        }
                        InputMode::ReportEnd => {
                            self.reports.end_date = parsed;
                            self.reports.loaded = false;
                        }
                        _ => {}
                    },
                    Err(e) => {
                        // keep the prompt open so the date can be fixed
                        self.status = e.to_string();
                        self.input_text = text;
                        return;
                    }
                }
            }
            InputMode::Normal => {}
        }
        self.input_mode = InputMode::Normal;
    }

    async fn open_txn_form(&mut self, existing: Option<Transaction>) {
        // the original re-fetches both reference lists every time the
        // dialog opens
        match self.api.list_users().await {
            Ok(users) => self.txns.ref_users = users,
            Err(e) => {
                warn!(error = %e, "user list fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
        match self.api.list_categories().await {
            Ok(categories) => self.txns.ref_categories = categories,
            Err(e) => {
                warn!(error = %e, "category list fetch failed");
                self.status = format!("Load failed: {e}");
            }
        }
        self.txns.form = Some(match existing {
            Some(transaction) => {
                TransactionForm::edit(&transaction, &self.txns.ref_users, &self.txns.ref_categories)
            }
            None => TransactionForm::create_default(&self.txns.ref_users, &self.txns.ref_categories),
        });
    }

    async fn handle_txn_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.txns.form = None,
            KeyCode::Enter => {
                let (payload, id) = {
                    let page = &mut self.txns;
                    let Some(form) = page.form.as_mut() else { return };
                    (form.build(&page.ref_users, &page.ref_categories), form.id)
                };
                let Some(payload) = payload else { return };
                let result = match id {
                    Some(id) => self.api.update_transaction(id, &payload).await.map(|_| ()),
                    None => self.api.create_transaction(&payload).await.map(|_| ()),
                };
                match result {
                    Ok(()) => {
                        self.txns.form = None;
                        self.txns.applied_revision = None;
                        self.status = "Saved".into();
                    }
                    Err(e) => {
                        warn!(error = %e, "transaction save failed");
                        if let Some(form) = self.txns.form.as_mut() {
                            form.error = Some(format!("Save failed: {e}"));
                        }
                    }
                }
            }
            _ => {
                let users_len = self.txns.ref_users.len();
                let categories_len = self.txns.ref_categories.len();
                if let Some(form) = self.txns.form.as_mut() {
                    match code {
                        KeyCode::Tab => form.next_field(),
                        KeyCode::BackTab => form.prev_field(),
                        KeyCode::Up => form.cycle_selection(-1, users_len, categories_len),
                        KeyCode::Down => form.cycle_selection(1, users_len, categories_len),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c) => form.push_char(c),
                        _ => {}
                    }
                }
            }
        }
    }

    async fn handle_user_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.users.form = None,
            KeyCode::Enter => {
                let (payload, id) = {
                    let Some(form) = self.users.form.as_mut() else { return };
                    (form.build(), form.id)
                };
                let Some(payload) = payload else { return };
                let result = match id {
                    Some(id) => self.api.update_user(id, &payload).await,
                    None => self.api.create_user(&payload).await.map(|_| ()),
                };
                match result {
                    Ok(()) => {
                        self.users.form = None;
                        self.users.loaded = false;
                        self.status = "Saved".into();
                    }
                    Err(e) => {
                        warn!(error = %e, "user save failed");
                        if let Some(form) = self.users.form.as_mut() {
                            form.error = Some(format!("Save failed: {e}"));
                        }
                    }
                }
            }
            _ => {
                if let Some(form) = self.users.form.as_mut() {
                    match code {
                        KeyCode::Tab | KeyCode::Down => form.next_field(),
                        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c) => form.push_char(c),
                        _ => {}
                    }
                }
            }
        }
    }

    async fn handle_category_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.categories.form = None,
            KeyCode::Enter => {
                let (payload, id) = {
                    let page = &mut self.categories;
                    let Some(form) = page.form.as_mut() else { return };
                    (form.build(&page.types), form.id)
                };
                let Some(payload) = payload else { return };
                let result = match id {
                    Some(id) => self.api.update_category(id, &payload).await.map(|_| ()),
                    None => self.api.create_category(&payload).await.map(|_| ()),
                };
                match result {
                    Ok(()) => {
                        self.categories.form = None;
                        self.categories.loaded = false;
                        self.status = "Saved".into();
                    }
                    Err(e) => {
                        warn!(error = %e, "category save failed");
                        if let Some(form) = self.categories.form.as_mut() {
                            form.error = Some(format!("Save failed: {e}"));
                        }
                    }
                }
            }
            _ => {
                let types_len = self.categories.types.len();
                if let Some(form) = self.categories.form.as_mut() {
                    match code {
                        KeyCode::Tab => form.next_field(),
                        KeyCode::BackTab => form.prev_field(),
                        KeyCode::Up => form.cycle_type(-1, types_len),
                        KeyCode::Down => form.cycle_type(1, types_len),
                        KeyCode::Backspace => form.backspace(),
                        KeyCode::Char(c) => form.push_char(c),
                        _ => {}
                    }
                }
            }
        }
    }

    async fn handle_type_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.categories.type_form = None,
            KeyCode::Enter => {
                let payload = {
                    let Some(form) = self.categories.type_form.as_mut() else { return };
                    form.build()
                };
                let Some(payload) = payload else { return };
                match self.api.create_transaction_type(&payload).await {
                    Ok(_) => {
                        self.categories.type_form = None;
                        self.categories.loaded = false;
                        self.status = "Saved".into();
                    }
                    Err(e) => {
                        warn!(error = %e, "transaction type save failed");
                        if let Some(form) = self.categories.type_form.as_mut() {
                            form.error = Some(format!("Save failed: {e}"));
                        }
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.categories.type_form.as_mut() {
                    form.backspace();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.categories.type_form.as_mut() {
                    form.push_char(c);
                }
            }
            _ => {}
        }
    }

    async fn delete_selected_txn(&mut self) {
        let Some(id) = self.selected_txn().map(|t| t.id) else { return };
        match self.api.delete_transaction(id).await {
            Ok(()) => {
                // full re-fetch rather than local removal
                self.txns.applied_revision = None;
                self.status = "Deleted".into();
            }
            Err(e) => {
                warn!(error = %e, "transaction delete failed");
                self.status = format!("Delete failed: {e}");
            }
        }
    }

    fn export_visible(&mut self) {
        let path = format!("transactions-{}.csv", date::today().format("%Y%m%d"));
        match export::write_transactions(&path, &self.txns.rows) {
            Ok(()) => self.status = format!("Exported {} rows to {path}", self.txns.rows.len()),
            Err(e) => {
                warn!(error = %e, "csv export failed");
                self.status = format!("Export failed: {e}");
            }
        }
    }

    pub fn selected_txn(&self) -> Option<&Transaction> {
        self.txns.rows.get(self.txns.table.selected()?)
    }

    fn selected_user_id(&self) -> Option<i64> {
        self.users
            .list
            .get(self.users.sel.selected()?)
            .map(|u| u.id)
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.categories.list.get(self.categories.sel.selected()?)
    }

    fn move_txn(&mut self, delta: isize) {
        let len = self.txns.rows.len();
        if len == 0 {
            self.txns.table.select(None);
            return;
        }
        let current = self.txns.table.selected().unwrap_or(0) as isize;
        self.txns
            .table
            .select(Some((current + delta).rem_euclid(len as isize) as usize));
    }

    fn move_user(&mut self, delta: isize) {
        let len = self.users.list.len();
        if len == 0 {
            self.users.sel.select(None);
            return;
        }
        let current = self.users.sel.selected().unwrap_or(0) as isize;
        self.users
            .sel
            .select(Some((current + delta).rem_euclid(len as isize) as usize));
    }

    fn move_category(&mut self, delta: isize) {
        let len = self.categories.list.len();
        if len == 0 {
            self.categories.sel.select(None);
            return;
        }
        let current = self.categories.sel.selected().unwrap_or(0) as isize;
        self.categories
            .sel
            .select(Some((current + delta).rem_euclid(len as isize) as usize));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TypeFilter;
    use crate::api::mock::MockApi;
    use crate::models::category::{CategoryPayload, TransactionTypePayload};
    use crate::models::transaction::TransactionPayload;
    use crate::models::user::UserPayload;
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
    }

    /// Two users, income/expense types, two categories, one transaction each.
    async fn seeded_api() -> Arc<MockApi> {
        let api = Arc::new(MockApi::default());
        let income = api
            .create_transaction_type(&TransactionTypePayload { name: "Income".into() })
            .await
            .unwrap();
        let expense = api
            .create_transaction_type(&TransactionTypePayload { name: "Expense".into() })
            .await
            .unwrap();
        let ann = api
            .create_user(&UserPayload { name: "Ann".into(), email: "ann@home".into() })
            .await
            .unwrap();
        api.create_user(&UserPayload { name: "Bo".into(), email: "bo@home".into() })
            .await
            .unwrap();
        let salary = api
            .create_category(&CategoryPayload {
                name: "Salary".into(),
                transaction_type_id: income.id,
            })
            .await
            .unwrap();
        let groceries = api
            .create_category(&CategoryPayload {
                name: "Groceries".into(),
                transaction_type_id: expense.id,
            })
            .await
            .unwrap();
        api.create_transaction(&TransactionPayload {
            amount: Decimal::from(3000),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            description: "march salary".into(),
            user_id: ann.id,
            category_id: salary.id,
        })
        .await
        .unwrap();
        api.create_transaction(&TransactionPayload {
            amount: Decimal::from(-120),
            date: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
            description: "weekly groceries".into(),
            user_id: ann.id,
            category_id: groceries.id,
        })
        .await
        .unwrap();
        api
    }

    async fn app_on_transactions(api: &Arc<MockApi>) -> App {
        let mut app = App::new(api.clone());
        app.tab = Tab::Transactions;
        app.sync().await;
        app
    }

    #[tokio::test]
    async fn mount_fetches_once_and_idle_passes_do_not_refetch() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;
        assert_eq!(app.txns.rows.len(), 2);
        assert_eq!(api.list_request_count(), 1);

        app.sync().await;
        app.sync().await;
        assert_eq!(api.list_request_count(), 1);
    }

    #[tokio::test]
    async fn every_filter_dimension_change_triggers_exactly_one_refetch() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;

        app.handle_key(key(KeyCode::Char('t'))).await;
        app.sync().await;
        assert_eq!(api.list_request_count(), 2);
        let queries = api.recorded_queries();
        assert_eq!(queries[1].type_filter, TypeFilter::Income);
        assert_eq!(app.txns.rows.len(), 1);
        assert_eq!(app.txns.rows[0].description, "march salary");

        // several edits before the next pass coalesce into one request
        app.filters.set_search("groceries".into());
        app.filters.cycle_type();
        app.filters.cycle_type();
        app.sync().await;
        assert_eq!(api.list_request_count(), 3);
        let last = api.recorded_queries().pop().unwrap();
        assert_eq!(last.type_filter, TypeFilter::All);
        assert_eq!(last.search, "groceries");
    }

    #[tokio::test]
    async fn search_prompt_round_trip_sends_the_typed_text() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;

        app.handle_key(key(KeyCode::Char('f'))).await;
        assert_eq!(app.input_mode, InputMode::Searching);
        type_text(&mut app, "salary").await;
        app.handle_key(key(KeyCode::Enter)).await;
        assert_eq!(app.input_mode, InputMode::Normal);
        app.sync().await;

        let last = api.recorded_queries().pop().unwrap();
        assert_eq!(last.search, "salary");
        assert_eq!(app.txns.rows.len(), 1);
    }

    #[tokio::test]
    async fn date_prompt_rejects_garbage_and_stays_open() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;

        app.handle_key(key(KeyCode::Char('s'))).await;
        type_text(&mut app, "03/2024").await;
        app.handle_key(key(KeyCode::Enter)).await;
        assert_eq!(app.input_mode, InputMode::StartDate);
        assert_eq!(app.input_text, "03/2024");
        app.sync().await;
        assert_eq!(api.list_request_count(), 1);
    }

    #[tokio::test]
    async fn create_form_defaults_to_first_references_and_create_then_list_shows_the_record() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;

        app.handle_key(key(KeyCode::Char('n'))).await;
        {
            let form = app.txns.form.as_ref().unwrap();
            assert_eq!(form.user_sel, Some(0));
            assert_eq!(form.category_sel, Some(0));
            assert!(form.id.is_none());
        }
        {
            let form = app.txns.form.as_mut().unwrap();
            form.amount = "-42.50".into();
            form.date = "2024-03-09".into();
            form.description = "market".into();
        }
        app.handle_key(key(KeyCode::Enter)).await;
        assert!(app.txns.form.is_none());
        app.sync().await;

        assert_eq!(app.txns.rows.len(), 3);
        let created = app
            .txns
            .rows
            .iter()
            .find(|t| t.description == "market")
            .unwrap();
        assert_eq!(created.amount, Decimal::new(-4250, 2));
        assert_eq!(created.user_name(), "Ann");
        assert_eq!(created.category_name(), "Salary");
    }

    #[tokio::test]
    async fn invalid_form_input_sets_an_error_and_sends_nothing() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;

        app.handle_key(key(KeyCode::Char('n'))).await;
        app.txns.form.as_mut().unwrap().amount = "wat".into();
        app.handle_key(key(KeyCode::Enter)).await;

        let form = app.txns.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Invalid amount"));
        app.sync().await;
        assert_eq!(app.txns.rows.len(), 2);
    }

    #[tokio::test]
    async fn edit_submits_an_update_instead_of_a_create() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;

        app.txns.table.select(Some(0));
        app.handle_key(key(KeyCode::Char('e'))).await;
        {
            let form = app.txns.form.as_mut().unwrap();
            assert!(form.id.is_some());
            form.description = "corrected".into();
        }
        app.handle_key(key(KeyCode::Enter)).await;
        app.sync().await;

        assert_eq!(app.txns.rows.len(), 2);
        assert!(app.txns.rows.iter().any(|t| t.description == "corrected"));
    }

    #[tokio::test]
    async fn delete_refetches_the_whole_list_and_the_record_is_gone() {
        let api = seeded_api().await;
        let mut app = app_on_transactions(&api).await;
        let doomed = app.txns.rows[0].id;

        app.handle_key(key(KeyCode::Char('x'))).await;
        app.sync().await;

        assert_eq!(app.txns.rows.len(), 1);
        assert!(app.txns.rows.iter().all(|t| t.id != doomed));
        // one mount fetch plus one post-delete fetch
        assert_eq!(api.list_request_count(), 2);
    }

    #[tokio::test]
    async fn user_crud_round_trip_through_the_users_tab() {
        let api = seeded_api().await;
        let mut app = App::new(api.clone());
        app.tab = Tab::Users;
        app.sync().await;
        assert_eq!(app.users.list.len(), 2);

        app.handle_key(key(KeyCode::Char('n'))).await;
        type_text(&mut app, "Cleo").await;
        app.handle_key(key(KeyCode::Tab)).await;
        type_text(&mut app, "cleo@home").await;
        app.handle_key(key(KeyCode::Enter)).await;
        assert!(app.users.form.is_none());
        app.sync().await;
        assert_eq!(app.users.list.len(), 3);
        assert!(app.users.list.iter().any(|u| u.email == "cleo@home"));

        app.users.sel.select(Some(2));
        app.handle_key(key(KeyCode::Char('x'))).await;
        app.sync().await;
        assert_eq!(app.users.list.len(), 2);
        assert!(app.users.list.iter().all(|u| u.email != "cleo@home"));
    }

    #[tokio::test]
    async fn dashboard_shapes_the_category_report_into_a_chart() {
        let api = seeded_api().await;
        let mut app = App::new(api.clone());
        app.sync().await;

        assert_eq!(app.dashboard.balance, Some(Decimal::from(2880)));
        assert_eq!(
            app.dashboard.chart,
            vec![("Salary".to_string(), 3000), ("Groceries".to_string(), 120)]
        );
    }

    #[tokio::test]
    async fn report_date_range_is_forwarded_and_reload_is_marked() {
        let api = seeded_api().await;
        let mut app = App::new(api.clone());
        app.tab = Tab::Reports;
        app.sync().await;
        assert_eq!(app.reports.by_category.len(), 2);
        assert_eq!(app.reports.by_users.len(), 1);

        app.handle_key(key(KeyCode::Char('s'))).await;
        type_text(&mut app, "2024-03-02").await;
        app.handle_key(key(KeyCode::Enter)).await;
        assert!(!app.reports.loaded);
        app.sync().await;

        // only the groceries transaction falls in range
        assert_eq!(app.reports.by_category.len(), 1);
        assert_eq!(app.reports.by_category[0].category, "Groceries");
    }
}
