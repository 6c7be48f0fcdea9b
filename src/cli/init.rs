use std::path::Path;

use passbook::error::{PassbookError, Result};
use passbook::settings::{save_settings_to, settings_path, Settings};

pub fn run(force: bool) -> Result<()> {
    let path = settings_path();
    write_defaults(&path, force)?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(PassbookError::Settings(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    save_settings_to(&Settings::default(), path)
}
