use comfy_table::{Cell, Table};
use passbook::banks;
use passbook::error::Result;
use passbook::models::{AmountColumns, BankConfig};

pub fn list(ext: Option<&str>) -> Result<()> {
    let configs: Vec<&BankConfig> = match ext {
        Some(ext) => banks::for_extension(ext),
        None => banks::all().iter().collect(),
    };
    println!("{}", format_formats(&configs));
    Ok(())
}

pub fn format_formats(configs: &[&BankConfig]) -> String {
    if configs.is_empty() {
        return "No matching statement formats.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Key", "Name", "Kind", "Date Format", "Amount", "Sheet"]);
    for cfg in configs {
        let amount = match cfg.columns.amount {
            AmountColumns::Single(col) => col.to_string(),
            AmountColumns::Split { debit, credit } => format!("{credit} - {debit}"),
        };
        table.add_row(vec![
            Cell::new(cfg.key),
            Cell::new(cfg.name),
            Cell::new(cfg.file_kind.key()),
            Cell::new(cfg.date_format),
            Cell::new(amount),
            Cell::new(cfg.sheet_name.unwrap_or("")),
        ]);
    }
    format!("Statement Formats\n{table}")
}
