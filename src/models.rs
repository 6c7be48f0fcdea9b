use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PassbookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
}

impl FileKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }

    /// File kind for an upload's extension, e.g. `csv` or `xlsx`.
    pub fn from_extension(ext: &str) -> Option<FileKind> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed column.
    Single(&'static str),
    /// Separate debit and credit columns; amount = credit - debit.
    Split {
        debit: &'static str,
        credit: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: &'static str,
    pub description: &'static str,
    pub amount: AmountColumns,
    pub tag: Option<&'static str>,
}

impl ColumnMap {
    /// Every source column the map refers to, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = vec![self.date, self.description];
        match self.amount {
            AmountColumns::Single(col) => names.push(col),
            AmountColumns::Split { debit, credit } => {
                names.push(debit);
                names.push(credit);
            }
        }
        names.extend(self.tag);
        names
    }
}

/// Declarative parsing schema for one bank's export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankConfig {
    pub key: &'static str,
    pub name: &'static str,
    pub file_kind: FileKind,
    pub columns: ColumnMap,
    /// chrono `strftime` pattern, e.g. `%d/%m/%Y`.
    pub date_format: &'static str,
    /// Number of leading lines (or sheet rows) before the header.
    pub header_row: usize,
    pub sheet_name: Option<&'static str>,
}

/// A source row keyed by the header names found in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Salary,
    Shopping,
    Rent,
    Transfers,
    Groceries,
    Bills,
    Income,
    Uncategorized,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Salary,
        Category::Shopping,
        Category::Rent,
        Category::Transfers,
        Category::Groceries,
        Category::Bills,
        Category::Income,
        Category::Uncategorized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Utilities => "Utilities",
            Self::Salary => "Salary",
            Self::Shopping => "Shopping",
            Self::Rent => "Rent",
            Self::Transfers => "Transfers",
            Self::Groceries => "Groceries",
            Self::Bills => "Bills",
            Self::Income => "Income",
            Self::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = PassbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| PassbookError::Other(format!("Unknown category: {s}")))
    }
}

impl TryFrom<String> for Category {
    type Error = PassbookError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Canonical transaction every report and filter works on.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    /// Positive = income/credit, negative = expense/debit.
    pub amount: f64,
    pub tag: Option<String>,
    pub category: Category,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            tag: None,
            category: Category::Uncategorized,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Zero-amount rows count as income.
    pub fn kind(&self) -> TransactionKind {
        if self.amount >= 0.0 {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    }
}
