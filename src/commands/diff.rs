//! @acp:module "Diff Command"
//! @acp:summary "Line diff of two report files"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Reports are deterministic, so any difference between two runs is a real
//! change in coverage, the port surface or the override table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use similar::TextDiff;

/// Options for the diff command
#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub old: PathBuf,
    pub new: PathBuf,
    /// Lines of context around each hunk
    pub context: usize,
    /// Exit non-zero when the files differ
    pub check: bool,
}

/// Unified diff of two texts, `None` when identical
pub fn unified_diff(old: &str, new: &str, old_name: &str, new_name: &str, context: usize) -> Option<String> {
    if old == new {
        return None;
    }
    Some(
        TextDiff::from_lines(old, new)
            .unified_diff()
            .context_radius(context)
            .header(old_name, new_name)
            .to_string(),
    )
}

/// Execute the diff command
pub fn execute_diff(options: DiffOptions) -> Result<()> {
    let old = std::fs::read_to_string(&options.old)
        .with_context(|| format!("reading {}", options.old.display()))?;
    let new = std::fs::read_to_string(&options.new)
        .with_context(|| format!("reading {}", options.new.display()))?;

    let old_name = options.old.display().to_string();
    let new_name = options.new.display().to_string();
    let Some(diff) = unified_diff(&old, &new, &old_name, &new_name, options.context) else {
        println!("{} Reports are identical", style("✓").green());
        return Ok(());
    };

    for line in diff.lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            println!("{}", style(line).bold());
        } else if line.starts_with("@@") {
            println!("{}", style(line).cyan());
        } else if line.starts_with('-') {
            println!("{}", style(line).red());
        } else if line.starts_with('+') {
            println!("{}", style(line).green());
        } else {
            println!("{}", line);
        }
    }

    if options.check {
        eprintln!("{} Reports differ", style("✗").red());
        std::process::exit(1);
    }
    Ok(())
}
