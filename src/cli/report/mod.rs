pub mod text;

use std::path::Path;

use colored::Colorize;
use passbook::error::{PassbookError, Result};
use passbook::filters::{self, apply_filters, FilterCriteria};
use passbook::settings::{load_settings, Settings};
use passbook::{banks, reports, statement, Statement, TransactionKind};

use super::{FilterArgs, ReportCommands, StatementArgs};

pub fn dispatch(cmd: ReportCommands, rules_path: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let stmt = open_statement(cmd.statement(), &settings, rules_path)?;
    if stmt.skipped > 0 {
        eprintln!("{}", text::format_skipped(stmt.skipped).yellow());
    }
    println!("{}", render(&cmd, &stmt, &settings));
    Ok(())
}

/// Explicit `--format`, else the only format reading the file's extension,
/// else the configured default.
pub(crate) fn resolve_format(args: &StatementArgs, settings: &Settings) -> Result<String> {
    if let Some(key) = &args.format {
        return Ok(key.clone());
    }
    let ext = Path::new(&args.file)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match banks::for_extension(ext).as_slice() {
        [only] => Ok(only.key.to_string()),
        candidates => {
            if let Some(key) = &settings.default_format {
                return Ok(key.clone());
            }
            if candidates.is_empty() {
                Err(PassbookError::Other(format!(
                    "No statement format reads '.{ext}' files; pass --format"
                )))
            } else {
                let keys: Vec<_> = candidates.iter().map(|b| b.key).collect();
                Err(PassbookError::Other(format!(
                    "Several formats read '.{ext}' files ({}); pass --format",
                    keys.join(", ")
                )))
            }
        }
    }
}

fn open_statement(
    args: &StatementArgs,
    settings: &Settings,
    rules_path: Option<&str>,
) -> Result<Statement> {
    let format = resolve_format(args, settings)?;
    let rules = settings.rule_set(rules_path)?;
    let data = std::fs::read(&args.file)?;
    statement::load(&data, &format, &rules)
}

impl From<&FilterArgs> for FilterCriteria {
    fn from(args: &FilterArgs) -> Self {
        FilterCriteria {
            description: args.query.clone(),
            categories: args.categories.clone(),
            min_amount: args.min,
            max_amount: args.max,
            start_date: args.from_date,
            end_date: args.to_date,
        }
    }
}

pub(crate) fn render(cmd: &ReportCommands, stmt: &Statement, settings: &Settings) -> String {
    let sym = settings.currency_symbol.as_str();
    let txns = &stmt.transactions;
    match cmd {
        ReportCommands::Summary { .. } => text::format_summary(&reports::summary(txns), sym),
        ReportCommands::Monthly { .. } => text::format_monthly(&reports::monthly_trend(txns), sym),
        ReportCommands::Budget { amount, .. } => {
            let budget = amount.unwrap_or(settings.monthly_budget);
            text::format_budget(&reports::budget_comparison(txns, budget), sym)
        }
        ReportCommands::Categories { .. } => {
            text::format_categories(&reports::category_distribution(txns), sym)
        }
        ReportCommands::Top { kind, count, .. } => {
            let kind = TransactionKind::from(*kind);
            let n = count.unwrap_or(settings.top_n);
            text::format_top(&reports::top_transactions(txns, n, kind), kind, sym)
        }
        ReportCommands::Search { filters, .. } => search(stmt, &FilterCriteria::from(filters), settings),
        ReportCommands::Dashboard { .. } => dashboard(stmt, settings),
    }
}

fn search(stmt: &Statement, criteria: &FilterCriteria, settings: &Settings) -> String {
    let sym = settings.currency_symbol.as_str();
    let balances = reports::running_balance(&stmt.transactions);
    let rows: Vec<_> = stmt
        .transactions
        .iter()
        .zip(balances)
        .filter(|(t, _)| criteria.matches(t))
        .collect();

    let filtered = apply_filters(&stmt.transactions, criteria);
    let top_income = reports::top_transactions(&filtered, settings.top_n, TransactionKind::Income);
    let top_expense = reports::top_transactions(&filtered, settings.top_n, TransactionKind::Expense);

    [
        text::format_register(&rows, sym),
        text::format_top(&top_income, TransactionKind::Income, sym),
        text::format_top(&top_expense, TransactionKind::Expense, sym),
    ]
    .join("\n\n")
}

fn dashboard(stmt: &Statement, settings: &Settings) -> String {
    let sym = settings.currency_symbol.as_str();
    let txns = &stmt.transactions;
    [
        text::format_overview(
            txns.len(),
            filters::bounds(txns).as_ref(),
            &filters::categories_present(txns),
            sym,
        ),
        text::format_summary(&reports::summary(txns), sym),
        text::format_monthly(&reports::monthly_trend(txns), sym),
        text::format_budget(&reports::budget_comparison(txns, settings.monthly_budget), sym),
        text::format_categories(&reports::category_distribution(txns), sym),
        text::format_top(
            &reports::top_transactions(txns, settings.top_n, TransactionKind::Income),
            TransactionKind::Income,
            sym,
        ),
        text::format_top(
            &reports::top_transactions(txns, settings.top_n, TransactionKind::Expense),
            TransactionKind::Expense,
            sym,
        ),
    ]
    .join("\n\n")
}
