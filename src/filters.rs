use chrono::NaiveDate;

use crate::models::{Category, Transaction};

/// Conjunctive predicates over a transaction list. Unset fields impose nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the description, matched as given
    /// (surrounding spaces included). An empty string imposes nothing.
    pub description: Option<String>,
    /// Empty means every category.
    pub categories: Vec<Category>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(q) = self.description.as_deref().filter(|q| !q.is_empty()) {
            if !txn.description.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&txn.category) {
            return false;
        }
        if self.min_amount.is_some_and(|min| txn.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| txn.amount > max) {
            return false;
        }
        if self.start_date.is_some_and(|start| txn.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| txn.date > end) {
            return false;
        }
        true
    }
}

/// Filtered copy of `transactions`; the input is left untouched and order kept.
pub fn apply_filters(transactions: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| criteria.matches(t))
        .cloned()
        .collect()
}

/// Extremes of the data, used as the default amount and date ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_amount: f64,
    pub max_amount: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

pub fn bounds(transactions: &[Transaction]) -> Option<Bounds> {
    let first = transactions.first()?;
    let init = Bounds {
        min_amount: first.amount,
        max_amount: first.amount,
        first_date: first.date,
        last_date: first.date,
    };
    Some(transactions.iter().fold(init, |b, t| Bounds {
        min_amount: b.min_amount.min(t.amount),
        max_amount: b.max_amount.max(t.amount),
        first_date: b.first_date.min(t.date),
        last_date: b.last_date.max(t.date),
    }))
}

/// Distinct categories in the data, sorted by name.
pub fn categories_present(transactions: &[Transaction]) -> Vec<Category> {
    let mut cats: Vec<Category> = transactions.iter().map(|t| t.category).collect();
    cats.sort_by_key(|c| c.name());
    cats.dedup();
    cats
}
