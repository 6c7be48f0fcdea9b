use comfy_table::{Cell, Table};
use passbook::categorizer::RuleSet;
use passbook::error::Result;
use passbook::settings::load_settings;

pub fn list(rules_path: Option<&str>) -> Result<()> {
    let rules = load_settings().rule_set(rules_path)?;
    println!("{}", format_rules(&rules));
    Ok(())
}

pub fn format_rules(rules: &RuleSet) -> String {
    let mut overrides = Table::new();
    overrides.set_header(vec!["Tag", "Category"]);
    for o in rules.tag_overrides() {
        overrides.add_row(vec![Cell::new(o.tag()), Cell::new(o.category())]);
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Pattern", "Match", "Category"]);
    for (i, r) in rules.rules().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(r.pattern()),
            Cell::new(r.match_type().key()),
            Cell::new(r.category()),
        ]);
    }
    format!("Tag Overrides (checked first)\n{overrides}\n\nKeyword Rules (first match wins)\n{table}")
}
