use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use crate::categorizer::normalize_tag;
use crate::models::{AmountColumns, BankConfig, RawRow, Transaction};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a statement amount. Accepts thousands separators, quotes, currency
/// symbols, a leading `+` and accounting-style `(negatives)`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$' | '₹' | '€' | '£') && !c.is_whitespace())
        .collect();
    if s.is_empty() {
        return None;
    }
    let value = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        -inner.parse::<f64>().ok()?
    } else {
        s.parse::<f64>().ok()?
    };
    value.is_finite().then_some(value)
}

pub fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format).ok()
}

fn split_amount(debit: &str, credit: &str) -> Option<f64> {
    // Outer None = unparseable cell, inner None = empty cell.
    fn side(raw: &str) -> Option<Option<f64>> {
        if raw.trim().is_empty() {
            Some(None)
        } else {
            parse_amount(raw).map(Some)
        }
    }
    let (d, c) = (side(debit)?, side(credit)?);
    Some(c.unwrap_or(0.0) - d.unwrap_or(0.0))
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum SkipReason {
    BadDate(String),
    BadAmount(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDate(raw) => write!(f, "unparseable date {raw:?}"),
            Self::BadAmount(raw) => write!(f, "unparseable amount {raw:?}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub transactions: Vec<Transaction>,
    /// Rows dropped for a bad date or amount.
    pub skipped: usize,
}

/// Map raw rows onto canonical transactions, preserving source order.
/// Rows with a bad date or amount are dropped and counted, never defaulted.
pub fn normalize(rows: &[RawRow], config: &BankConfig) -> Normalized {
    let mut out = Normalized {
        transactions: Vec::with_capacity(rows.len()),
        skipped: 0,
    };
    for (i, row) in rows.iter().enumerate() {
        match normalize_row(row, config) {
            Ok(txn) => out.transactions.push(txn),
            Err(reason) => {
                out.skipped += 1;
                debug!(row = i + 1, %reason, "skipping row");
            }
        }
    }
    out
}

fn normalize_row(row: &RawRow, config: &BankConfig) -> Result<Transaction, SkipReason> {
    let cols = &config.columns;
    let cell = |name: &str| row.get(name).unwrap_or("");

    let raw_date = cell(cols.date);
    let date = parse_date(raw_date, config.date_format)
        .ok_or_else(|| SkipReason::BadDate(raw_date.to_string()))?;

    let amount = match cols.amount {
        AmountColumns::Single(col) => {
            parse_amount(cell(col)).ok_or_else(|| SkipReason::BadAmount(cell(col).to_string()))?
        }
        AmountColumns::Split { debit, credit } => split_amount(cell(debit), cell(credit))
            .ok_or_else(|| {
                SkipReason::BadAmount(format!("debit {:?} / credit {:?}", cell(debit), cell(credit)))
            })?,
    };

    let mut txn = Transaction::new(date, cell(cols.description).trim(), amount);
    txn.tag = cols.tag.and_then(|col| normalize_tag(cell(col)));
    Ok(txn)
}
