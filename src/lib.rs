//! Bank statement pipeline: parse an export, normalize it into canonical
//! transactions, categorize them, then aggregate and filter for display.

pub mod banks;
pub mod categorizer;
pub mod error;
pub mod filters;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod normalizer;
pub mod reports;
pub mod settings;
pub mod statement;

pub use error::{PassbookError, Result};
pub use models::{BankConfig, Category, Transaction, TransactionKind};
pub use statement::{load, Statement};
