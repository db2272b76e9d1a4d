//! @acp:module "Conventions"
//! @acp:summary "Naming-drift audit of the override table"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! # Style Report
//!
//! Every `[map]` entry records that a reference symbol lives under some port
//! name. This module classifies each entry with [`StyleClassifier`] and
//! aggregates the classes per bucket:
//!
//! - `totals`: count per class plus `entries`
//! - `buckets.<name>.counts`: same, per bucket
//! - `buckets.<name>.samples`: the first non-exact entries, in key order
//!
//! Only keys under a configured reference crate are considered.

pub mod naming;

pub use naming::{StyleClass, StyleClassifier};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::mapping::OverrideTable;
use crate::symbol::{BucketRules, PATH_SEP};

/// Counter key holding the number of classified entries
pub const ENTRIES_KEY: &str = "entries";

/// @acp:summary "One non-exact mapping, kept as an example"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSample {
    pub reference: String,
    pub port: String,
    pub class: StyleClass,
}

/// @acp:summary "Class counts and samples of one bucket"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStyle {
    pub counts: BTreeMap<String, usize>,
    pub samples: Vec<StyleSample>,
}

/// @acp:summary "Naming-drift report over the override table"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleReport {
    pub mapping_file: String,
    pub totals: BTreeMap<String, usize>,
    pub buckets: BTreeMap<String, BucketStyle>,
}

impl StyleReport {
    pub fn entries(&self) -> usize {
        self.totals.get(ENTRIES_KEY).copied().unwrap_or(0)
    }
}

/// @acp:summary "Classify every in-scope mapping entry"
pub fn build_style_report(overrides: &OverrideTable, config: &Config) -> StyleReport {
    let classifier = StyleClassifier::new(&config.style);
    let buckets = BucketRules::new(&config.style.buckets);
    let prefixes: Vec<String> = config
        .reference
        .crates
        .iter()
        .map(|c| format!("{}{}", c.replace('-', "_"), PATH_SEP))
        .collect();

    let mut totals: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_bucket: BTreeMap<String, BucketStyle> = BTreeMap::new();

    for (reference, value) in &overrides.map {
        if !prefixes.iter().any(|p| reference.starts_with(p.as_str())) {
            continue;
        }
        let (class, port) = classifier.best_for(reference, value.candidates());
        *totals.entry(class.as_str().to_string()).or_default() += 1;
        *totals.entry(ENTRIES_KEY.to_string()).or_default() += 1;

        let bucket = by_bucket.entry(buckets.bucket_for(reference)).or_default();
        *bucket.counts.entry(class.as_str().to_string()).or_default() += 1;
        *bucket.counts.entry(ENTRIES_KEY.to_string()).or_default() += 1;
        if class != StyleClass::Exact && bucket.samples.len() < config.style.sample_limit {
            bucket.samples.push(StyleSample {
                reference: reference.clone(),
                port,
                class,
            });
        }
    }

    tracing::debug!("style audit: {} mapped entries", totals.get(ENTRIES_KEY).unwrap_or(&0));

    StyleReport {
        mapping_file: overrides.source_name(),
        totals,
        buckets: by_bucket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn table() -> OverrideTable {
        OverrideTable::parse(
            r#"
[map]
"rapier3d::dynamics::RigidBody::linvel" = ["pkg::RigidBody::linear_velocity", "pkg::RigidBody::lin_vel"]
"rapier3d::dynamics::RigidBody" = "pkg::RigidBody3D"
"rapier3d::dynamics::RigidBodySet" = "pkg::RigidBodySet"
"rapier2d::math::DIM" = "pkg::dim"
"rapier3d::utils::test" = "pkg::passes"
"parry3d::shape::Ball" = "pkg::Ball"
"#,
            Path::new("map.toml"),
        )
        .unwrap()
    }

    #[test]
    fn test_totals_and_buckets() {
        let report = build_style_report(&table(), &Config::default());

        assert_eq!(report.entries(), 5);
        assert_eq!(report.totals["exact"], 1);
        assert_eq!(report.totals["spelling_alias"], 1);
        assert_eq!(report.totals["dimension_suffix_alias"], 1);
        assert_eq!(report.totals["const_case_alias"], 1);
        assert_eq!(report.totals["keyword_alias"], 1);

        let dynamics = &report.buckets["dynamics"];
        assert_eq!(dynamics.counts[ENTRIES_KEY], 3);
        assert_eq!(
            dynamics.samples,
            vec![
                StyleSample {
                    reference: "rapier3d::dynamics::RigidBody".to_string(),
                    port: "pkg::RigidBody3D".to_string(),
                    class: StyleClass::DimensionSuffixAlias,
                },
                StyleSample {
                    reference: "rapier3d::dynamics::RigidBody::linvel".to_string(),
                    port: "pkg::RigidBody::lin_vel".to_string(),
                    class: StyleClass::SpellingAlias,
                },
            ]
        );
        assert!(report.buckets.contains_key("math"));
        assert!(!report.buckets.contains_key("shape"));
        assert_eq!(report.mapping_file, "");
    }

    #[test]
    fn test_sample_limit() {
        let mut config = Config::default();
        config.style.sample_limit = 1;
        let report = build_style_report(&table(), &config);
        assert_eq!(report.buckets["dynamics"].samples.len(), 1);
        assert_eq!(report.buckets["dynamics"].counts[ENTRIES_KEY], 3);
    }

    #[test]
    fn test_serialized_class_names() {
        let report = build_style_report(&table(), &Config::default());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"class\":\"dimension_suffix_alias\""));
        assert!(json.contains("\"entries\":5"));
    }
}
