//! Init command - write an example config file

use crate::config::{CONFIG_FILE, EXAMPLE_CONFIG};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run() -> Result<()> {
    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        println!(
            "{} {} already exists, leaving it untouched",
            style("✓").green(),
            CONFIG_FILE
        );
        return Ok(());
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;
    println!("{} Created {}", style("✓").green(), CONFIG_FILE);
    println!("  Edit the model list, then run: kerneval evaluate --prompts prompts.txt");
    Ok(())
}
