use crate::error::{PassbookError, Result};
use crate::models::{AmountColumns, BankConfig, ColumnMap, FileKind};

// ---------------------------------------------------------------------------
// Built-in statement formats
// ---------------------------------------------------------------------------

const PAYTM_COLUMNS: ColumnMap = ColumnMap {
    date: "Date",
    description: "Transaction Details",
    amount: AmountColumns::Single("Amount"),
    tag: Some("Tags"),
};

pub const PAYTM_CSV: BankConfig = BankConfig {
    key: "paytm_csv",
    name: "Paytm Passbook (CSV)",
    file_kind: FileKind::Csv,
    columns: PAYTM_COLUMNS,
    date_format: "%d/%m/%Y",
    header_row: 0,
    sheet_name: None,
};

pub const PAYTM_EXCEL: BankConfig = BankConfig {
    key: "paytm_excel",
    name: "Paytm Passbook (Excel)",
    file_kind: FileKind::Excel,
    columns: PAYTM_COLUMNS,
    date_format: "%d/%m/%Y",
    header_row: 0,
    sheet_name: Some("Passbook Payment History"),
};

const ALL_BANKS: &[BankConfig] = &[PAYTM_CSV, PAYTM_EXCEL];

pub fn all() -> &'static [BankConfig] {
    ALL_BANKS
}

pub fn lookup(key: &str) -> Result<&'static BankConfig> {
    ALL_BANKS
        .iter()
        .find(|b| b.key == key)
        .ok_or_else(|| PassbookError::UnknownFormat(key.to_string()))
}

/// Formats that can read a file with the given extension.
pub fn for_extension(ext: &str) -> Vec<&'static BankConfig> {
    let Some(kind) = FileKind::from_extension(ext) else {
        return Vec::new();
    };
    ALL_BANKS.iter().filter(|b| b.file_kind == kind).collect()
}
