//! @acp:module "Run Command"
//! @acp:summary "Full parity audit: surfaces, coverage and style reports"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `parity run`. The audit itself ([`audit`]) is a pure function
//! of the configuration and the files it reads; [`execute_run`] adds report
//! writing and console output.

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::style;

use crate::config::Config;
use crate::conventions::{build_style_report, StyleReport};
use crate::error::AuditError;
use crate::mapping::OverrideTable;
use crate::matcher::{Matcher, Normalizer};
use crate::port::{PortScanner, PortSurface};
use crate::reference::{build_rustdoc_json, extract_reference_surface, DocIndex, ReferenceSurface};
use crate::report::{write_pretty, CoverageReport, ReportBuilder};
use crate::symbol::BucketRules;

/// File name of the port surface report
pub const PORT_EXPORTS_FILE: &str = "port_exports.json";
/// File name of the coverage report
pub const REPORT_FILE: &str = "report.json";
/// File name of the style report
pub const STYLE_REPORT_FILE: &str = "style_report.json";

/// Options for the run command; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit rustdoc JSON per crate (`crate=path`)
    pub indexes: Vec<(String, PathBuf)>,
    /// Generate rustdoc JSON before reading it
    pub build: bool,
    pub reference_root: Option<PathBuf>,
    pub port_root: Option<PathBuf>,
    pub mapping: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl RunOptions {
    /// Fold command-line overrides into the configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.reference_root {
            config.reference.root = root.clone();
        }
        if let Some(root) = &self.port_root {
            config.port.root = root.clone();
        }
        if let Some(mapping) = &self.mapping {
            config.mapping = mapping.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        for (crate_name, _) in &self.indexes {
            if !config.reference.crates.contains(crate_name) {
                config.reference.crates.push(crate_name.clone());
            }
        }
    }

    fn explicit_index(&self, crate_name: &str) -> Option<&Path> {
        self.indexes
            .iter()
            .find(|(name, _)| name == crate_name)
            .map(|(_, path)| path.as_path())
    }
}

/// Parse a `crate=path` index argument
pub fn parse_index_arg(arg: &str) -> std::result::Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected CRATE=PATH, got {:?}", arg)),
    }
}

/// @acp:summary "Everything one audit produces"
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub surfaces: Vec<ReferenceSurface>,
    pub port: PortSurface,
    pub report: CoverageReport,
    pub style: StyleReport,
}

impl AuditOutcome {
    /// @acp:summary "Write all reports into a directory"
    pub fn write(&self, outdir: &Path) -> crate::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for surface in &self.surfaces {
            let path = outdir.join(format!("{}_pub.json", surface.crate_name));
            write_pretty(&path, surface)?;
            written.push(path);
        }
        let path = outdir.join(PORT_EXPORTS_FILE);
        write_pretty(&path, &self.port)?;
        written.push(path);
        let path = outdir.join(REPORT_FILE);
        self.report.write_json(&path)?;
        written.push(path);
        let path = outdir.join(STYLE_REPORT_FILE);
        write_pretty(&path, &self.style)?;
        written.push(path);
        Ok(written)
    }
}

/// @acp:summary "Run the audit without writing anything"
/// `config` must already carry the command-line overrides.
pub fn audit(config: &Config, options: &RunOptions) -> crate::Result<AuditOutcome> {
    let needs_root = config
        .reference
        .crates
        .iter()
        .any(|c| options.explicit_index(c).is_none());
    if needs_root && !config.reference.root.is_dir() {
        return Err(AuditError::not_found("reference root", &config.reference.root));
    }
    if !config.port.root.is_dir() {
        return Err(AuditError::not_found("port root", &config.port.root));
    }

    let buckets = BucketRules::new(&config.buckets);
    let mut surfaces = Vec::with_capacity(config.reference.crates.len());
    for crate_name in &config.reference.crates {
        let index_path = match options.explicit_index(crate_name) {
            Some(path) => path.to_path_buf(),
            None if options.build => build_rustdoc_json(
                &config.reference.root,
                crate_name,
                &config.reference.index_path(crate_name),
            )?,
            None => config.reference.index_path(crate_name),
        };
        if !index_path.is_file() {
            return Err(AuditError::not_found("rustdoc JSON", index_path));
        }
        let doc = DocIndex::from_json(&index_path)?;
        let surface = extract_reference_surface(&doc, crate_name, &buckets)?;
        tracing::info!("{}: {} public items", crate_name, surface.items.len());
        surfaces.push(surface);
    }

    let port = PortScanner::new(config.port.clone()).scan()?;
    tracing::info!("port: {} exports", port.exports.len());

    let overrides = OverrideTable::load(&config.mapping)?;
    let matcher = Matcher::new(&port, &overrides, Normalizer::new(config.normalize.clone()));
    let report = surfaces
        .iter()
        .fold(ReportBuilder::new(&matcher, &overrides), |builder, surface| {
            builder.add_surface(surface)
        })
        .build();
    let style = build_style_report(&overrides, config);

    Ok(AuditOutcome {
        surfaces,
        port,
        report,
        style,
    })
}

/// Execute the run command
pub fn execute_run(options: RunOptions, mut config: Config) -> Result<()> {
    options.apply(&mut config);
    println!("{} Auditing public surface...", style("→").cyan());

    let outcome = audit(&config, &options)?;
    let written = outcome.write(&config.output)?;

    for (crate_name, surface) in &outcome.report.surfaces {
        let totals = surface.totals;
        let marker = if totals.missing == 0 {
            style("✓").green()
        } else {
            style("!").yellow()
        };
        println!(
            "{} {}: {} covered, {} missing of {}",
            marker, crate_name, totals.covered, totals.missing, totals.items
        );
    }
    println!("  Port exports: {}", outcome.port.exports.len());
    println!(
        "  Overrides: {} mapped, {} ignored",
        outcome.report.mapped_count, outcome.report.ignored_count
    );
    println!("  Style entries: {}", outcome.style.entries());
    for path in &written {
        println!("{} Wrote {}", style("✓").green(), path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_arg() {
        assert_eq!(
            parse_index_arg("rapier3d=doc/rapier3d.json").unwrap(),
            ("rapier3d".to_string(), PathBuf::from("doc/rapier3d.json"))
        );
        assert!(parse_index_arg("rapier3d").is_err());
        assert!(parse_index_arg("=x").is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let options = RunOptions {
            indexes: vec![("parry3d".to_string(), PathBuf::from("p.json"))],
            output: Some(PathBuf::from("out")),
            ..RunOptions::default()
        };
        let mut config = Config::default();
        options.apply(&mut config);
        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.reference.crates, vec!["rapier2d", "rapier3d", "parry3d"]);
        assert_eq!(options.explicit_index("parry3d"), Some(Path::new("p.json")));
        assert_eq!(options.explicit_index("rapier3d"), None);
    }

    #[test]
    fn test_missing_reference_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.reference.root = dir.path().join("absent");
        config.port.root = dir.path().to_path_buf();
        let err = audit(&config, &RunOptions::default()).unwrap_err();
        assert!(matches!(err, AuditError::InputNotFound { what: "reference root", .. }));
    }
}
