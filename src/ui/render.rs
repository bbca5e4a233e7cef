use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Tabs},
};
use rust_decimal::Decimal;

use super::app::{App, InputMode, Tab};
use super::forms::TxnField;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    draw_tabs(f, root[0], app);

    match app.tab {
        Tab::Dashboard => draw_dashboard(f, root[1], app),
        Tab::Transactions => draw_transactions(f, root[1], app),
        Tab::Users => draw_users(f, root[1], app),
        Tab::Categories => draw_categories(f, root[1], app),
        Tab::Reports => draw_reports(f, root[1], app),
        Tab::Help => draw_help(f, root[1]),
    }

    draw_status_bar(f, root[2], app);

    if app.users.form.is_some() {
        draw_user_form(f, size, app);
    }
    if app.categories.form.is_some() {
        draw_category_form(f, size, app);
    }
    if app.categories.type_form.is_some() {
        draw_type_form(f, size, app);
    }
    if app.txns.form.is_some() {
        draw_txn_form(f, size, app);
    }
    if app.input_mode != InputMode::Normal {
        draw_input_prompt(f, size, app);
    }
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles = ["Dashboard", "Transactions", "Users", "Categories", "Reports", "Help"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let selected = match app.tab {
        Tab::Dashboard => 0,
        Tab::Transactions => 1,
        Tab::Users => 2,
        Tab::Categories => 3,
        Tab::Reports => 4,
        Tab::Help => 5,
    };
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("Family Budget"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn amount_style(amount: Decimal) -> Style {
    if amount < Decimal::ZERO {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let balance_line = match app.dashboard.balance {
        Some(balance) => Line::from(vec![
            Span::raw("Balance: "),
            Span::styled(
                format!("{:.2}", balance),
                amount_style(balance).add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from("Balance: loading…"),
    };
    let balance = Paragraph::new(vec![
        Line::from(""),
        balance_line,
        Line::from(""),
        Line::from("r refresh"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Overview"))
    .alignment(Alignment::Center);
    f.render_widget(balance, cols[0]);

    let data: Vec<(&str, u64)> = app
        .dashboard
        .chart
        .iter()
        .map(|(label, value)| (label.as_str(), *value))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("By category"))
        .bar_width(9)
        .bar_gap(1)
        .data(&data);
    f.render_widget(chart, cols[1]);
}

fn filter_summary(app: &App) -> String {
    let query = app.filters.query();
    let mut parts = vec![format!("[{}]", query.type_filter.as_str())];
    let search = query.search.trim();
    if !search.is_empty() {
        parts.push(format!("search:\"{search}\""));
    }
    if let Some(start) = query.start_date {
        parts.push(format!("from {start}"));
    }
    if let Some(end) = query.end_date {
        parts.push(format!("to {end}"));
    }
    if let Some(id) = query.category_id {
        let name = app
            .txns
            .ref_categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{id}"));
        parts.push(format!("cat:{name}"));
    }
    parts.join(" ")
}

fn draw_transactions(f: &mut Frame, area: Rect, app: &mut App) {
    let header = Row::new(vec!["Date", "Description", "User", "Category", "Amount"])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .height(1);

    let body: Vec<Row> = app.txns.rows.iter().map(|t| t.to_row()).collect();
    let total: Decimal = app.txns.rows.iter().map(|t| t.amount).sum();

    let title = format!(
        "Transactions {} ({} shown, total {:.2}){}",
        filter_summary(app),
        app.txns.rows.len(),
        total,
        if app.txns.loading { " loading…" } else { "" }
    );

    let widths = [
        Constraint::Length(12),
        Constraint::Percentage(40),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(14),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");

    f.render_stateful_widget(table, area, &mut app.txns.table);
}

fn draw_users(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app.users.list.iter().map(|u| u.to_list_item()).collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Users ({})", app.users.list.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("➤ ");
    f.render_stateful_widget(list, area, &mut app.users.sel);
}

fn draw_categories(f: &mut Frame, area: Rect, app: &mut App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let items: Vec<ListItem> = app
        .categories
        .list
        .iter()
        .map(|c| c.to_list_item())
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Categories ({})", app.categories.list.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("➤ ");
    f.render_stateful_widget(list, cols[0], &mut app.categories.sel);

    let types: Vec<ListItem> = app
        .categories
        .types
        .iter()
        .map(|t| ListItem::new(Line::from(t.name.clone())))
        .collect();
    let types = List::new(types).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Transaction types (t new)"),
    );
    f.render_widget(types, cols[1]);
}

fn draw_reports(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let range = format!(
        "By category  {} .. {}   (s/d set range, r refresh)",
        app.reports
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "start".into()),
        app.reports
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "end".into()),
    );
    let data: Vec<(&str, u64)> = app
        .reports
        .chart
        .iter()
        .map(|(label, value)| (label.as_str(), *value))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(range))
        .bar_width(9)
        .bar_gap(1)
        .data(&data);
    f.render_widget(chart, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let category_rows: Vec<Row> = app
        .reports
        .by_category
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.category.clone()),
                Cell::from(r.r#type.clone()),
                Cell::from(Span::styled(
                    format!("{:>12}", r.total.round_dp(2)),
                    amount_style(r.total),
                )),
                Cell::from(format!("{:>6.1}%", r.percentage)),
            ])
        })
        .collect();
    let category_table = Table::new(
        category_rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(Row::new(vec!["Category", "Type", "Total", "Share"]).height(1))
    .block(Block::default().borders(Borders::ALL).title("Totals"));
    f.render_widget(category_table, cols[0]);

    let user_rows: Vec<Row> = app
        .reports
        .by_users
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.user_name.clone()),
                Cell::from(Span::styled(
                    format!("{:>12}", r.total_income.round_dp(2)),
                    Style::default().fg(Color::Green),
                )),
                Cell::from(Span::styled(
                    format!("{:>12}", r.total_expense.round_dp(2)),
                    Style::default().fg(Color::Red),
                )),
            ])
        })
        .collect();
    let user_table = Table::new(
        user_rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(Row::new(vec!["User", "Income", "Expense"]).height(1))
    .block(Block::default().borders(Borders::ALL).title("By users"));
    f.render_widget(user_table, cols[1]);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let text = vec![
        "Global:",
        "  Tab/Shift+Tab : switch view",
        "  ?             : this help",
        "  q             : quit",
        "",
        "Transactions:",
        "  Up/Down  : move    n: new    e/Enter: edit    x/Del: delete",
        "  t : cycle income/expense tab     c : cycle category filter",
        "  f : search text                  s/d : start/end date",
        "  F : clear all filters            r : refresh    v : export CSV",
        "",
        "Users / Categories:",
        "  Up/Down  : move    n: new    e/Enter: edit    x/Del: delete",
        "  r : refresh        t : new transaction type (Categories)",
        "",
        "Reports:",
        "  s/d : report date range          r : refresh",
        "",
        "Forms: Tab cycles fields, Up/Down change selections,",
        "       Enter saves, Esc cancels.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Help & Keybindings "));
    f.render_widget(help, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let keys = match app.tab {
        Tab::Dashboard => "r refresh • Tab next view",
        Tab::Transactions => "n new • e edit • x delete • t/c/f/s/d filters • v export",
        Tab::Users => "n new • e edit • x delete • r refresh",
        Tab::Categories => "n new • e edit • x delete • t new type • r refresh",
        Tab::Reports => "s/d date range • r refresh",
        Tab::Help => "Esc back",
    };
    let line = Line::from(vec![
        Span::styled(keys, Style::default().fg(Color::Yellow)),
        Span::raw("  |  "),
        Span::raw(app.status.clone()),
    ]);
    let bar = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(bar, area);
}

fn marker(active: bool) -> &'static str {
    if active { "  <editing>" } else { "" }
}

fn draw_user_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.users.form.as_ref() else { return };
    let title = if form.id.is_some() { "Edit User" } else { "New User" };
    let lines = vec![
        format!("Name  : {}{}", form.name, marker(form.focus == 0)),
        format!("Email : {}{}", form.email, marker(form.focus == 1)),
        String::new(),
        "Tab: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        popup,
    );
}

fn draw_category_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.categories.form.as_ref() else { return };
    let title = if form.id.is_some() { "Edit Category" } else { "New Category" };
    let type_name = form
        .type_sel
        .and_then(|i| app.categories.types.get(i))
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "<none loaded>".into());
    let lines = vec![
        format!("Name : {}{}", form.name, marker(form.focus == 0)),
        format!(
            "Type : {}{}{}",
            type_name,
            marker(form.focus == 1),
            if form.focus == 1 { " (↑/↓ to choose)" } else { "" }
        ),
        String::new(),
        "Tab: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        popup,
    );
}

fn draw_type_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.categories.type_form.as_ref() else { return };
    let lines = vec![
        format!("Name : {}", form.name),
        String::new(),
        "Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let popup = centered_rect(40, 25, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("New Transaction Type"),
        ),
        popup,
    );
}

fn draw_txn_form(f: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.txns.form.as_ref() else { return };
    let title = if form.id.is_some() { "Edit Transaction" } else { "New Transaction" };

    let user_name = form
        .user_sel
        .and_then(|i| app.txns.ref_users.get(i))
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "<none loaded>".into());
    let category_name = form
        .category_sel
        .and_then(|i| app.txns.ref_categories.get(i))
        .map(|c| format!("{} [{}]", c.name, c.type_name()))
        .unwrap_or_else(|| "<none loaded>".into());

    let lines = vec![
        format!("Amount   : {}{}", form.amount, marker(form.focus == TxnField::Amount)),
        format!("Date     : {}{}", form.date, marker(form.focus == TxnField::Date)),
        format!(
            "Desc     : {}{}",
            form.description,
            marker(form.focus == TxnField::Description)
        ),
        format!("User     : {}{}", user_name, marker(form.focus == TxnField::User)),
        format!("Category : {}{}", category_name, marker(form.focus == TxnField::Category)),
        String::new(),
        "Tab: switch | ↑/↓: choose user/category | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let popup = centered_rect(60, 45, area);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        popup,
    );
}

fn draw_input_prompt(f: &mut Frame, area: Rect, app: &App) {
    let (title, placeholder) = match app.input_mode {
        InputMode::Searching => (
            "Search (Enter to apply, empty clears, Esc to cancel)",
            "Enter text to search descriptions...",
        ),
        InputMode::StartDate => (
            "Start date (Enter to apply, empty clears, Esc to cancel)",
            "YYYY-MM-DD",
        ),
        InputMode::EndDate => (
            "End date (Enter to apply, empty clears, Esc to cancel)",
            "YYYY-MM-DD",
        ),
        InputMode::ReportStart => (
            "Report start date (Enter to apply, empty clears, Esc to cancel)",
            "YYYY-MM-DD",
        ),
        InputMode::ReportEnd => (
            "Report end date (Enter to apply, empty clears, Esc to cancel)",
            "YYYY-MM-DD",
        ),
        InputMode::Normal => return,
    };

    let input = Paragraph::new(if app.input_text.is_empty() {
        Line::from(placeholder).style(Style::default().fg(Color::DarkGray))
    } else {
        Line::from(app.input_text.as_str())
    })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    let popup = centered_rect(60, 10, area);
    f.render_widget(Clear, popup);
    f.render_widget(input, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(layout[1])[1]
}
