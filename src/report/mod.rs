//! @acp:module "Coverage Report"
//! @acp:summary "Deterministic aggregation of coverage results"
//! @acp:domain cli
//! @acp:layer service
//!
//! Every map in the report is ordered and every list sorted, so identical
//! inputs serialize to byte-identical JSON and reports can be reviewed as
//! diffs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mapping::OverrideTable;
use crate::matcher::{MatchKind, Matcher};
use crate::reference::ReferenceSurface;
use crate::symbol::SymbolKind;

/// @acp:summary "Item counts of one reference surface"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub items: usize,
    pub covered: usize,
    pub missing: usize,
}

/// @acp:summary "An uncovered reference symbol"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub path: String,
    pub kind: SymbolKind,
    #[serde(rename = "match")]
    pub match_kind: MatchKind,
}

/// @acp:summary "Coverage of one reference surface"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceReport {
    pub totals: Totals,
    /// Number of symbols resolved by each tier
    pub matches: BTreeMap<MatchKind, usize>,
    pub missing_by_bucket: BTreeMap<String, Vec<MissingEntry>>,
}

/// @acp:summary "Full coverage report across reference surfaces"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Keyed by reference crate name
    pub surfaces: BTreeMap<String, SurfaceReport>,
    pub mapping_file: String,
    pub mapped_count: usize,
    pub ignored_count: usize,
}

impl CoverageReport {
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_pretty(path, self)
    }
}

/// Pretty JSON with a trailing newline
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

/// @acp:summary "Write pretty JSON, creating parent directories"
pub fn write_pretty<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_pretty_json(value)?)?;
    Ok(())
}

/// @acp:summary "Builds the coverage report from matcher decisions"
pub struct ReportBuilder<'a> {
    matcher: &'a Matcher<'a>,
    overrides: &'a OverrideTable,
    surfaces: BTreeMap<String, SurfaceReport>,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(matcher: &'a Matcher<'a>, overrides: &'a OverrideTable) -> Self {
        Self {
            matcher,
            overrides,
            surfaces: BTreeMap::new(),
        }
    }

    /// Match every non-structural symbol of a reference surface
    pub fn add_surface(mut self, surface: &ReferenceSurface) -> Self {
        let report = summarize(self.matcher, surface);
        tracing::debug!(
            "{}: items={} covered={} missing={}",
            surface.crate_name,
            report.totals.items,
            report.totals.covered,
            report.totals.missing
        );
        self.surfaces.insert(surface.crate_name.clone(), report);
        self
    }

    pub fn build(self) -> CoverageReport {
        CoverageReport {
            surfaces: self.surfaces,
            mapping_file: self.overrides.source_name(),
            mapped_count: self.overrides.map.len(),
            ignored_count: self.overrides.ignore.len(),
        }
    }
}

/// @acp:summary "Coverage of one surface"
pub fn summarize(matcher: &Matcher<'_>, surface: &ReferenceSurface) -> SurfaceReport {
    let mut report = SurfaceReport::default();

    for item in surface.items.iter().filter(|i| !i.kind.is_structural()) {
        let result = matcher.resolve(&item.path);
        report.totals.items += 1;
        *report.matches.entry(result.match_kind).or_default() += 1;
        if result.covered {
            report.totals.covered += 1;
            continue;
        }
        report.totals.missing += 1;
        report
            .missing_by_bucket
            .entry(item.bucket.clone())
            .or_default()
            .push(MissingEntry {
                path: item.path.clone(),
                kind: item.kind,
                match_kind: result.match_kind,
            });
    }

    for entries in report.missing_by_bucket.values_mut() {
        entries.sort_by(|a, b| (a.kind, &a.path).cmp(&(b.kind, &b.path)));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Normalizer;
    use crate::port::PortSurface;
    use crate::symbol::SymbolRecord;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn reference() -> ReferenceSurface {
        ReferenceSurface {
            crate_name: "rapier3d".to_string(),
            items: vec![
                SymbolRecord::new("rapier3d", SymbolKind::Module, "lib"),
                SymbolRecord::new("rapier3d::dynamics::RigidBody", SymbolKind::Struct, "dynamics"),
                SymbolRecord::new("rapier3d::dynamics::RigidBody::mass", SymbolKind::Method, "dynamics"),
                SymbolRecord::new("rapier3d::dynamics::RigidBody::wake_up", SymbolKind::Method, "dynamics"),
                SymbolRecord::new("rapier3d::dynamics::RigidBody::user_data", SymbolKind::Field, "dynamics"),
                SymbolRecord::new("rapier3d::geometry::Ray", SymbolKind::Struct, "geometry"),
                SymbolRecord::new("rapier3d::geometry::Ray::new", SymbolKind::Method, "geometry"),
                SymbolRecord::new("rapier3d::utils::SimdReal", SymbolKind::Type, "utils"),
            ],
        }
    }

    fn port() -> PortSurface {
        PortSurface {
            exports: vec![
                SymbolRecord::new("p::RigidBody3D", SymbolKind::Struct, "p"),
                SymbolRecord::new("p::RigidBody3D::mass", SymbolKind::Method, "p"),
            ],
        }
    }

    fn overrides() -> OverrideTable {
        OverrideTable::parse(
            "[map]\n\"rapier3d::geometry::Ray\" = \"p::Ray3D\"\n[ignore]\n\"rapier3d::utils::SimdReal\" = \"no SIMD\"\n",
            Path::new("map.toml"),
        )
        .unwrap()
    }

    #[test]
    fn test_totals_and_buckets() {
        let port = port();
        let table = overrides();
        let matcher = Matcher::new(&port, &table, Normalizer::default());
        let report = summarize(&matcher, &reference());

        assert_eq!(
            report.totals,
            Totals {
                items: 7,
                covered: 3,
                missing: 4
            }
        );
        assert_eq!(report.matches[&MatchKind::MappedMissing], 1);
        assert_eq!(report.matches[&MatchKind::Ignored], 1);
        assert_eq!(report.matches[&MatchKind::Name], 1);
        assert_eq!(report.matches[&MatchKind::MethodName], 1);
        assert_eq!(report.matches[&MatchKind::Missing], 3);

        let dynamics: Vec<_> = report.missing_by_bucket["dynamics"]
            .iter()
            .map(|e| (e.path.as_str(), e.kind))
            .collect();
        assert_eq!(
            dynamics,
            vec![
                ("rapier3d::dynamics::RigidBody::user_data", SymbolKind::Field),
                ("rapier3d::dynamics::RigidBody::wake_up", SymbolKind::Method),
            ]
        );
        let geometry = &report.missing_by_bucket["geometry"];
        assert_eq!(geometry[0].path, "rapier3d::geometry::Ray::new");
        assert_eq!(geometry[0].match_kind, MatchKind::Missing);
        assert_eq!(geometry[1].path, "rapier3d::geometry::Ray");
        assert_eq!(geometry[1].match_kind, MatchKind::MappedMissing);
    }

    #[test]
    fn test_report_serialization_is_stable() {
        let port = port();
        let table = overrides();
        let matcher = Matcher::new(&port, &table, Normalizer::default());
        let build = || {
            ReportBuilder::new(&matcher, &table)
                .add_surface(&reference())
                .build()
        };
        let first = to_pretty_json(&build()).unwrap();
        let second = to_pretty_json(&build()).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("}\n"));
        assert!(first.contains("\"match\": \"mapped-missing\""));
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.json");
        let port = port();
        let table = overrides();
        let matcher = Matcher::new(&port, &table, Normalizer::default());
        let report = ReportBuilder::new(&matcher, &table)
            .add_surface(&reference())
            .build();
        report.write_json(&path).unwrap();
        assert_eq!(CoverageReport::from_json(&path).unwrap(), report);
    }
}
