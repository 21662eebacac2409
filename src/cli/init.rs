//! Init command - emit a commented default skillcheck.toml

use crate::config::DEFAULT_CONFIG_TOML;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(output: Option<&Path>, force: bool) -> Result<i32> {
    let Some(path) = output else {
        print!("{}", DEFAULT_CONFIG_TOML);
        return Ok(0);
    };

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!(
        "{} Created {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    eprintln!(
        "  Place it next to SKILL.md; every key is optional."
    );
    Ok(0)
}
