use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::{Category, Transaction, TransactionKind};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total_income: f64,
    /// Magnitude of all negative amounts.
    pub total_expense: f64,
    pub net_flow: f64,
    /// `net_flow / total_income`, or 0 when there is no income.
    pub savings_rate: f64,
}

pub fn summary(transactions: &[Transaction]) -> Summary {
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.amount > 0.0)
        .map(|t| t.amount)
        .sum();
    let total_expense: f64 = transactions
        .iter()
        .filter(|t| t.amount < 0.0)
        .map(|t| t.amount.abs())
        .sum();
    let net_flow = total_income - total_expense;
    let savings_rate = if total_income > 0.0 {
        net_flow / total_income
    } else {
        0.0
    };
    Summary {
        total_income,
        total_expense,
        net_flow,
        savings_rate,
    }
}

// ---------------------------------------------------------------------------
// Monthly trend & budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

pub fn monthly_trend(transactions: &[Transaction]) -> Vec<MonthlyTotals> {
    let mut by_month: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for t in transactions {
        let entry = by_month.entry((t.date.year(), t.date.month())).or_default();
        if t.amount > 0.0 {
            entry.0 += t.amount;
        } else {
            entry.1 += t.amount.abs();
        }
    }
    by_month
        .into_iter()
        .map(|((y, m), (income, expense))| MonthlyTotals {
            month: format!("{y:04}-{m:02}"),
            income,
            expense,
            net: income - expense,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRow {
    pub month: String,
    pub actual_expense: f64,
    pub budget: f64,
    /// Budget minus actual; negative means over budget.
    pub difference: f64,
}

/// One row per month present in the data, including income-only months.
pub fn budget_comparison(transactions: &[Transaction], monthly_budget: f64) -> Vec<BudgetRow> {
    monthly_trend(transactions)
        .into_iter()
        .map(|m| BudgetRow {
            month: m.month,
            actual_expense: m.expense,
            budget: monthly_budget,
            difference: monthly_budget - m.expense,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Expense distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: Category,
    pub total: f64,
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryShare>,
    pub total: f64,
}

impl CategoryBreakdown {
    pub fn get(&self, category: Category) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }
}

/// Expense magnitude per category, largest first.
pub fn category_distribution(transactions: &[Transaction]) -> CategoryBreakdown {
    let mut by_category: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.amount < 0.0) {
        let entry = by_category.entry(t.category).or_default();
        entry.0 += t.amount.abs();
        entry.1 += 1;
    }
    let total: f64 = by_category.values().map(|(t, _)| t).sum();
    let mut categories: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, (t, count))| CategoryShare {
            category,
            total: t,
            count,
            pct: if total != 0.0 { t / total * 100.0 } else { 0.0 },
        })
        .collect();
    categories.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.name().cmp(b.category.name()))
    });
    CategoryBreakdown { categories, total }
}

// ---------------------------------------------------------------------------
// Rankings & balance
// ---------------------------------------------------------------------------

/// Largest incomes or most negative expenses; ties keep input order.
pub fn top_transactions(transactions: &[Transaction], n: usize, kind: TransactionKind) -> Vec<Transaction> {
    let mut picked: Vec<&Transaction> = transactions.iter().filter(|t| t.kind() == kind).collect();
    match kind {
        TransactionKind::Income => picked.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
        TransactionKind::Expense => picked.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
    }
    picked.into_iter().take(n).cloned().collect()
}

/// Cumulative sum of amounts in input order.
pub fn running_balance(transactions: &[Transaction]) -> Vec<f64> {
    transactions
        .iter()
        .scan(0.0, |acc, t| {
            *acc += t.amount;
            Some(*acc)
        })
        .collect()
}
