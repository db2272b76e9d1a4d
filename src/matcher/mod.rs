//! @acp:module "Coverage Matcher"
//! @acp:summary "Tiered decision of whether the port covers a reference symbol"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! # Tiers
//!
//! 1. **Ignore**: listed in `[ignore]` → covered.
//! 2. **Mapping**: listed in `[map]` → covered iff a candidate exists in the
//!    port; otherwise `mapped-missing`, with no heuristic fallback.
//! 3. **Leaf**: leaf name equals a top-level port declaration's leaf, raw or
//!    normalized.
//! 4. **Suffix**: `Owner::member` equals a port symbol's last two segments,
//!    raw or with the owner normalized.
//! 5. Otherwise missing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::NormalizeConfig;
use crate::mapping::OverrideTable;
use crate::port::PortSurface;
use crate::symbol::{leaf, segments, PATH_SEP};

/// @acp:summary "How a reference symbol was resolved"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    Ignored,
    Mapped,
    MappedMissing,
    Name,
    MethodName,
    Missing,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Ignored => "ignored",
            MatchKind::Mapped => "mapped",
            MatchKind::MappedMissing => "mapped-missing",
            MatchKind::Name => "name",
            MatchKind::MethodName => "method-name",
            MatchKind::Missing => "missing",
        }
    }

    pub fn is_covered(&self) -> bool {
        !matches!(self, MatchKind::MappedMissing | MatchKind::Missing)
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @acp:summary "Coverage decision for one reference symbol"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub covered: bool,
    pub match_kind: MatchKind,
}

impl From<MatchKind> for CoverageResult {
    fn from(match_kind: MatchKind) -> Self {
        Self {
            covered: match_kind.is_covered(),
            match_kind,
        }
    }
}

/// @acp:summary "Closed-list leaf normalization"
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Remove product tokens, then strip each dimension suffix once, in order
    pub fn normalize(&self, name: &str) -> String {
        let mut out = name.to_string();
        for token in self.config.product_tokens.iter().filter(|t| !t.is_empty()) {
            out = out.replace(token.as_str(), "");
        }
        for suffix in &self.config.dimension_suffixes {
            if let Some(stripped) = out.strip_suffix(suffix.as_str()) {
                out = stripped.to_string();
            }
        }
        out
    }
}

/// @acp:summary "Matcher over one port surface and one override table"
pub struct Matcher<'a> {
    overrides: &'a OverrideTable,
    normalizer: Normalizer,
    port_paths: HashSet<String>,
    /// Leaves of top-level port declarations (`pkg::Name`)
    leaves: HashSet<String>,
    normalized_leaves: HashSet<String>,
    /// Last two segments of every port path
    tails: HashSet<String>,
    /// Same, with the owner segment normalized
    normalized_tails: HashSet<String>,
}

impl<'a> Matcher<'a> {
    pub fn new(port: &PortSurface, overrides: &'a OverrideTable, normalizer: Normalizer) -> Self {
        let mut port_paths = HashSet::new();
        let mut leaves = HashSet::new();
        let mut normalized_leaves = HashSet::new();
        let mut tails = HashSet::new();
        let mut normalized_tails = HashSet::new();

        for record in &port.exports {
            let segs = segments(&record.path);
            if let [_, name] = segs.as_slice() {
                leaves.insert(name.to_string());
                normalized_leaves.insert(normalizer.normalize(name));
            }
            if let [.., owner, member] = segs.as_slice() {
                tails.insert(format!("{}{}{}", owner, PATH_SEP, member));
                normalized_tails.insert(format!("{}{}{}", normalizer.normalize(owner), PATH_SEP, member));
            }
            port_paths.insert(record.path.clone());
        }

        Self {
            overrides,
            normalizer,
            port_paths,
            leaves,
            normalized_leaves,
            tails,
            normalized_tails,
        }
    }

    /// @acp:summary "Resolve one reference path through the tiers"
    pub fn resolve(&self, path: &str) -> CoverageResult {
        if self.overrides.is_ignored(path) {
            return MatchKind::Ignored.into();
        }

        if let Some(mapped) = self.overrides.mapping(path) {
            let found = mapped
                .candidates()
                .iter()
                .any(|candidate| self.port_paths.contains(candidate));
            return if found {
                MatchKind::Mapped.into()
            } else {
                MatchKind::MappedMissing.into()
            };
        }

        let name = leaf(path);
        if self.leaves.contains(name)
            || self.normalized_leaves.contains(&self.normalizer.normalize(name))
        {
            return MatchKind::Name.into();
        }

        let segs = segments(path);
        if let [.., owner, member] = segs.as_slice() {
            let raw = format!("{}{}{}", owner, PATH_SEP, member);
            let normalized = format!("{}{}{}", self.normalizer.normalize(owner), PATH_SEP, member);
            if self.tails.contains(&raw) || self.normalized_tails.contains(&normalized) {
                return MatchKind::MethodName.into();
            }
        }

        MatchKind::Missing.into()
    }
}
