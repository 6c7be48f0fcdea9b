use tracing::info;

use crate::banks;
use crate::categorizer::{categorize_in_place, RuleSet};
use crate::error::Result;
use crate::importer;
use crate::models::Transaction;
use crate::normalizer::normalize;

/// A parsed, normalized and categorized upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub transactions: Vec<Transaction>,
    /// Rows dropped for a bad date or amount.
    pub skipped: usize,
}

/// Run one upload through the whole pipeline. Fatal problems (unknown format,
/// undecodable file, missing columns) return an error and no transactions.
pub fn load(data: &[u8], format_key: &str, rules: &RuleSet) -> Result<Statement> {
    let config = banks::lookup(format_key)?;
    let raw_rows = importer::parse(data, config)?;
    let normalized = normalize(&raw_rows, config);
    let mut transactions = normalized.transactions;
    let result = categorize_in_place(&mut transactions, rules);

    info!(
        format = config.key,
        rows = raw_rows.len(),
        imported = transactions.len(),
        skipped = normalized.skipped,
        categorized = result.categorized,
        uncategorized = result.uncategorized,
        "loaded statement"
    );
    Ok(Statement {
        transactions,
        skipped: normalized.skipped,
    })
}
