//! @acp:module "Style Command"
//! @acp:summary "Naming-drift audit of the override table"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::commands::run::STYLE_REPORT_FILE;
use crate::config::Config;
use crate::conventions::{build_style_report, ENTRIES_KEY};
use crate::mapping::OverrideTable;
use crate::report::write_pretty;

/// Options for the style command
#[derive(Debug, Clone, Default)]
pub struct StyleOptions {
    /// Override table to classify
    pub mapping: Option<PathBuf>,
    /// Output directory
    pub output: Option<PathBuf>,
}

/// Execute the style command
pub fn execute_style(options: StyleOptions, config: Config) -> Result<()> {
    let mapping = options.mapping.unwrap_or_else(|| config.mapping.clone());
    let outdir = options.output.unwrap_or_else(|| config.output.clone());

    let overrides = OverrideTable::load(&mapping)?;
    let report = build_style_report(&overrides, &config);
    let path = outdir.join(STYLE_REPORT_FILE);
    write_pretty(&path, &report)?;

    println!("mapped entries: {}", report.entries());
    for (class, count) in report.totals.iter().filter(|(k, _)| k.as_str() != ENTRIES_KEY) {
        println!("  {}: {}", class, count);
    }
    println!("{} Wrote {}", style("✓").green(), path.display());
    Ok(())
}
