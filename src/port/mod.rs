//! @acp:module "Port Surface"
//! @acp:summary "Export surface of the port from interface descriptors"
//! @acp:domain cli
//! @acp:layer service
//!
//! Walks the port root, scans every generated descriptor with the
//! [`descriptor`] state machine, then adds what the secondary sources declare
//! and the descriptors do not.

pub mod descriptor;
pub mod secondary;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::PortConfig;
use crate::error::{AuditError, Result};
use crate::symbol::{SymbolKind, SymbolRecord, SymbolSet, PATH_SEP};

pub use descriptor::{scan_descriptor, step, Declaration, ScanState};
pub use secondary::scan_secondary;

/// @acp:summary "Exported symbols of all port packages"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSurface {
    /// Sorted by `(package, kind, path)`; bucket holds the package name
    pub exports: Vec<SymbolRecord>,
}

impl PortSurface {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.exports.iter().map(|r| r.path.as_str())
    }
}

/// @acp:summary "Collects the port surface from a repository checkout"
pub struct PortScanner {
    config: PortConfig,
}

impl PortScanner {
    pub fn new(config: PortConfig) -> Self {
        Self { config }
    }

    /// @acp:summary "Scan descriptors and secondary sources under the root"
    pub fn scan(&self) -> Result<PortSurface> {
        let root = &self.config.root;
        if !root.is_dir() {
            return Err(AuditError::not_found("port root", root));
        }

        let mut builder = PortSurfaceBuilder::default();
        // Package declared per directory, for secondary files next to a descriptor.
        let mut packages: HashMap<PathBuf, String> = HashMap::new();

        for path in self.find_files(&self.config.descriptors)? {
            let content = std::fs::read_to_string(&path)?;
            let src = relative(root, &path);
            match scan_descriptor(&content) {
                Some((package, declarations)) => {
                    tracing::debug!("{}: {} declarations in {}", src, declarations.len(), package);
                    if let Some(dir) = path.parent() {
                        packages.insert(dir.to_path_buf(), package.clone());
                    }
                    builder.add_primary(&package, declarations, &src);
                }
                None => tracing::warn!("{}: no package declaration, skipped", src),
            }
        }

        for path in self.find_files(&self.config.secondary)? {
            let content = std::fs::read_to_string(&path)?;
            let src = relative(root, &path);
            let package = path
                .parent()
                .and_then(|dir| packages.get(dir).cloned())
                .unwrap_or_else(|| self.fallback_package(root, &path));
            builder.add_secondary(&package, scan_secondary(&content), &src);
        }

        Ok(builder.build())
    }

    /// `<prefix>/<folder>` for a secondary file without a sibling descriptor
    fn fallback_package(&self, root: &Path, path: &Path) -> String {
        let folder = path
            .parent()
            .map(|dir| relative(root, dir))
            .unwrap_or_default();
        if folder.is_empty() {
            self.config.package_prefix.clone()
        } else {
            format!("{}/{}", self.config.package_prefix, folder)
        }
    }

    /// Files under the root matching any include pattern and no exclude pattern, sorted
    fn find_files(&self, include: &[String]) -> Result<Vec<PathBuf>> {
        let root = &self.config.root;
        let include_patterns = compile(include);
        let exclude_patterns = compile(&self.config.exclude);

        let match_opts = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative_path = relative(root, e.path());
                let included = include_patterns
                    .iter()
                    .any(|p| p.matches_with(&relative_path, match_opts));
                let excluded = exclude_patterns
                    .iter()
                    .any(|p| p.matches_with(&relative_path, match_opts));
                (included && !excluded).then(|| e.into_path())
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

fn compile(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("invalid glob {:?}: {}", p, e);
                None
            }
        })
        .collect()
}

/// Path relative to root with `/` separators
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// @acp:summary "Accumulates package-qualified port symbols"
#[derive(Debug, Default)]
pub struct PortSurfaceBuilder {
    symbols: SymbolSet,
}

impl PortSurfaceBuilder {
    /// Record descriptor declarations of a package
    pub fn add_primary(&mut self, package: &str, declarations: Vec<Declaration>, src: &str) {
        for decl in declarations {
            self.symbols.insert(record(package, &decl.symbol, decl.kind, src));
        }
    }

    /// Record secondary declarations, never touching a path already known
    pub fn add_secondary(&mut self, package: &str, declarations: Vec<Declaration>, src: &str) {
        for decl in declarations {
            let rec = record(package, &decl.symbol, decl.kind, src);
            if self.symbols.contains_path(&rec.path) {
                continue;
            }
            self.symbols.insert(rec);
        }
    }

    pub fn build(self) -> PortSurface {
        PortSurface {
            exports: self.symbols.into_sorted(),
        }
    }
}

fn record(package: &str, symbol: &str, kind: SymbolKind, src: &str) -> SymbolRecord {
    SymbolRecord::new(format!("{}{}{}", package, PATH_SEP, symbol), kind, package).with_source(src)
}
