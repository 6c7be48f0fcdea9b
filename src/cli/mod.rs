pub mod formats;
pub mod init;
pub mod report;
pub mod rules;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use passbook::{Category, TransactionKind};

#[derive(Parser)]
#[command(name = "passbook", about = "Summarize and explore a bank statement export.")]
pub struct Cli {
    /// JSON rule file to use instead of the configured rules
    #[arg(long, global = true)]
    pub rules: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default settings file.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// List supported statement formats.
    Formats {
        /// Only formats that read this file extension (csv, xlsx)
        #[arg(long)]
        ext: Option<String>,
    },
    /// Show the categorization rules and tag overrides in effect.
    Rules,
    /// Generate reports from a statement file.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Args, Clone)]
pub struct StatementArgs {
    /// Path to the CSV or XLSX statement
    pub file: String,
    /// Statement format key (see `passbook formats`)
    #[arg(long)]
    pub format: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(Args, Clone, Default)]
pub struct FilterArgs {
    /// Text to search for in descriptions
    #[arg(long)]
    pub query: Option<String>,
    /// Category to keep (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<Category>,
    /// Smallest amount to keep
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,
    /// Largest amount to keep
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<NaiveDate>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income, expenses, net flow and savings rate.
    Summary {
        #[command(flatten)]
        statement: StatementArgs,
    },
    /// Income vs. expenses per month.
    Monthly {
        #[command(flatten)]
        statement: StatementArgs,
    },
    /// Monthly expenses against a budget.
    Budget {
        #[command(flatten)]
        statement: StatementArgs,
        /// Monthly expense budget (default from settings)
        #[arg(long)]
        amount: Option<f64>,
    },
    /// Expense breakdown by category.
    Categories {
        #[command(flatten)]
        statement: StatementArgs,
    },
    /// Largest incomes or expenses.
    Top {
        #[command(flatten)]
        statement: StatementArgs,
        #[arg(long, value_enum, default_value = "expense")]
        kind: KindArg,
        /// How many to show (default from settings)
        #[arg(short = 'n', long = "count")]
        count: Option<usize>,
    },
    /// Search and filter transactions.
    Search {
        #[command(flatten)]
        statement: StatementArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Every report in one go.
    Dashboard {
        #[command(flatten)]
        statement: StatementArgs,
    },
}

impl ReportCommands {
    pub fn statement(&self) -> &StatementArgs {
        match self {
            Self::Summary { statement }
            | Self::Monthly { statement }
            | Self::Budget { statement, .. }
            | Self::Categories { statement }
            | Self::Top { statement, .. }
            | Self::Search { statement, .. }
            | Self::Dashboard { statement } => statement,
        }
    }
}
