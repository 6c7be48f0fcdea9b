use colored::Colorize;
use comfy_table::{Cell, Table};

use passbook::filters::Bounds;
use passbook::fmt::{money_with, percent};
use passbook::reports::{BudgetRow, CategoryBreakdown, MonthlyTotals, Summary};
use passbook::{Category, Transaction, TransactionKind};

fn signed(sym: &str, amount: f64) -> String {
    if amount < 0.0 {
        money_with(sym, amount).red().to_string()
    } else {
        money_with(sym, amount).green().to_string()
    }
}

pub fn format_skipped(count: usize) -> String {
    format!("Warning: {count} row(s) skipped (unparseable date or amount)")
}

/// Headline of a statement: how many rows, the date span and amount range.
pub fn format_overview(count: usize, bounds: Option<&Bounds>, categories: &[Category], sym: &str) -> String {
    let Some(b) = bounds else {
        return "No transactions found.".to_string();
    };
    let names: Vec<&str> = categories.iter().map(|c| c.name()).collect();
    format!(
        "{count} transaction(s) from {} to {}\nAmounts: {} to {}\nCategories: {}",
        b.first_date,
        b.last_date,
        money_with(sym, b.min_amount),
        money_with(sym, b.max_amount),
        names.join(", ")
    )
}

pub fn format_summary(data: &Summary, sym: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Total Income"),
        Cell::new(money_with(sym, data.total_income)),
    ]);
    table.add_row(vec![
        Cell::new("Total Expenses"),
        Cell::new(money_with(sym, data.total_expense)),
    ]);
    let net_label = if data.net_flow >= 0.0 {
        "Net Flow".green().bold()
    } else {
        "Net Flow".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money_with(sym, data.net_flow))]);
    table.add_row(vec![
        Cell::new("Savings Rate"),
        Cell::new(percent(data.savings_rate)),
    ]);
    format!("Financial Summary\n{table}")
}

pub fn format_monthly(months: &[MonthlyTotals], sym: &str) -> String {
    if months.is_empty() {
        return "No transactions found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
    for m in months {
        table.add_row(vec![
            Cell::new(&m.month),
            Cell::new(money_with(sym, m.income)),
            Cell::new(money_with(sym, m.expense)),
            Cell::new(signed(sym, m.net)),
        ]);
    }
    format!("Monthly Income vs. Expenses\n{table}")
}

pub fn format_budget(rows: &[BudgetRow], sym: &str) -> String {
    if rows.is_empty() {
        return "No transactions found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Month", "Actual Expenses", "Budget", "Difference"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.month),
            Cell::new(money_with(sym, r.actual_expense)),
            Cell::new(money_with(sym, r.budget)),
            Cell::new(signed(sym, r.difference)),
        ]);
    }
    let over = rows.iter().filter(|r| r.difference < 0.0).count();
    format!("Monthly Budget ({over} month(s) over budget)\n{table}")
}

pub fn format_categories(data: &CategoryBreakdown, sym: &str) -> String {
    if data.categories.is_empty() {
        return "No expenses found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%", "Count"]);
    for item in &data.categories {
        table.add_row(vec![
            Cell::new(item.category),
            Cell::new(money_with(sym, item.total)),
            Cell::new(format!("{:.1}%", item.pct)),
            Cell::new(item.count),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money_with(sym, data.total)),
        Cell::new(""),
        Cell::new(""),
    ]);
    format!("Expense Distribution by Category\n{table}")
}

pub fn format_top(rows: &[Transaction], kind: TransactionKind, sym: &str) -> String {
    let title = match kind {
        TransactionKind::Income => "Top Incomes",
        TransactionKind::Expense => "Top Expenses",
    };
    if rows.is_empty() {
        return format!("{title}\nNo transactions found.");
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category"]);
    for t in rows {
        table.add_row(vec![
            Cell::new(t.date),
            Cell::new(&t.description),
            Cell::new(signed(sym, t.amount)),
            Cell::new(t.category),
        ]);
    }
    format!("{title}\n{table}")
}

/// Transactions alongside their running balance over the whole statement.
pub fn format_register(rows: &[(&Transaction, f64)], sym: &str) -> String {
    if rows.is_empty() {
        return "No transactions found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category", "Tag", "Balance"]);
    for (t, balance) in rows {
        table.add_row(vec![
            Cell::new(t.date),
            Cell::new(&t.description),
            Cell::new(signed(sym, t.amount)),
            Cell::new(t.category),
            Cell::new(t.tag.as_deref().unwrap_or("")),
            Cell::new(money_with(sym, *balance)),
        ]);
    }
    let net: f64 = rows.iter().map(|(t, _)| t.amount).sum();
    format!(
        "Transactions ({} shown, net: {})\n{table}",
        rows.len(),
        money_with(sym, net)
    )
}
