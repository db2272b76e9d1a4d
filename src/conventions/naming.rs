//! @acp:module "Naming Drift"
//! @acp:summary "Classification of how a port name differs from its reference name"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! # Classification Ladder
//!
//! A `(reference leaf, port leaf)` pair is tested in this order, first hit wins:
//!
//! 1. **exact**: identical
//! 2. **keyword_alias**: configured pair (a reference name that is a keyword in the port language)
//! 3. **const_case_alias**: `UPPER_CASE` reference, same letters in the port
//! 4. **dimension_suffix_alias**: equal after dimension/product normalization
//! 5. **case_alias**: equal ignoring case
//! 6. **spelling_alias**: equal ignoring case and underscores
//! 7. **renamed**: anything else
//!
//! Choosing among several mapped candidates uses [`StyleClass::rank`], which
//! follows the report ladder instead of the test order.

use serde::{Deserialize, Serialize};

use crate::config::StyleConfig;
use crate::matcher::Normalizer;
use crate::symbol::leaf;

/// @acp:summary "Kind of naming drift between a reference and a port name"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleClass {
    Exact,
    ConstCaseAlias,
    CaseAlias,
    SpellingAlias,
    DimensionSuffixAlias,
    KeywordAlias,
    Renamed,
}

/// Rank of each class, best first
const RANKS: [(StyleClass, u8); 7] = [
    (StyleClass::Exact, 0),
    (StyleClass::ConstCaseAlias, 1),
    (StyleClass::CaseAlias, 2),
    (StyleClass::SpellingAlias, 3),
    (StyleClass::DimensionSuffixAlias, 4),
    (StyleClass::KeywordAlias, 5),
    (StyleClass::Renamed, 6),
];

impl StyleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleClass::Exact => "exact",
            StyleClass::ConstCaseAlias => "const_case_alias",
            StyleClass::CaseAlias => "case_alias",
            StyleClass::SpellingAlias => "spelling_alias",
            StyleClass::DimensionSuffixAlias => "dimension_suffix_alias",
            StyleClass::KeywordAlias => "keyword_alias",
            StyleClass::Renamed => "renamed",
        }
    }

    /// Position on the ladder; lower is better
    pub fn rank(&self) -> u8 {
        RANKS
            .iter()
            .find(|(class, _)| class == self)
            .map(|(_, rank)| *rank)
            .unwrap_or(u8::MAX)
    }
}

impl std::fmt::Display for StyleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @acp:summary "Leaf-pair classifier"
#[derive(Debug, Clone)]
pub struct StyleClassifier {
    normalizer: Normalizer,
    keyword_aliases: Vec<(String, String)>,
}

impl StyleClassifier {
    pub fn new(config: &StyleConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config.normalize.clone()),
            keyword_aliases: config.keyword_aliases.clone(),
        }
    }

    /// Classify one `(reference leaf, port leaf)` pair
    pub fn classify(&self, reference: &str, port: &str) -> StyleClass {
        if reference == port {
            return StyleClass::Exact;
        }
        if self
            .keyword_aliases
            .iter()
            .any(|(r, p)| r == reference && p == port)
        {
            return StyleClass::KeywordAlias;
        }
        if is_upper_case(reference) && reference.to_lowercase() == port.to_lowercase() {
            return StyleClass::ConstCaseAlias;
        }
        if self.normalizer.normalize(reference) == self.normalizer.normalize(port) {
            return StyleClass::DimensionSuffixAlias;
        }
        if reference.to_lowercase() == port.to_lowercase() {
            return StyleClass::CaseAlias;
        }
        if fold_spelling(reference) == fold_spelling(port) {
            return StyleClass::SpellingAlias;
        }
        StyleClass::Renamed
    }

    /// @acp:summary "Best class among candidates; first candidate wins ties"
    /// Returns `(Renamed, first candidate)` when no candidate beats renamed,
    /// and an empty target when there are no candidates.
    pub fn best_for(&self, reference_path: &str, candidates: &[String]) -> (StyleClass, String) {
        let reference_leaf = leaf(reference_path);
        let mut best = (
            StyleClass::Renamed,
            candidates.first().cloned().unwrap_or_default(),
        );
        for candidate in candidates {
            let class = self.classify(reference_leaf, leaf(candidate));
            if class.rank() < best.0.rank() {
                best = (class, candidate.clone());
            }
        }
        best
    }
}

/// At least one cased character and no lowercase ones
fn is_upper_case(s: &str) -> bool {
    s.chars().any(|c| c.is_uppercase()) && !s.chars().any(|c| c.is_lowercase())
}

fn fold_spelling(s: &str) -> String {
    s.replace('_', "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> StyleClassifier {
        StyleClassifier::new(&StyleConfig::default())
    }

    #[test]
    fn test_classify_ladder() {
        let c = classifier();
        assert_eq!(c.classify("mass", "mass"), StyleClass::Exact);
        assert_eq!(c.classify("test", "passes"), StyleClass::KeywordAlias);
        assert_eq!(c.classify("COLLISION_EVENTS", "collision_events"), StyleClass::ConstCaseAlias);
        assert_eq!(c.classify("RigidBody", "RigidBody3D"), StyleClass::DimensionSuffixAlias);
        assert_eq!(c.classify("Vector", "Vector2"), StyleClass::DimensionSuffixAlias);
        assert_eq!(c.classify("Aabb", "AABB"), StyleClass::CaseAlias);
        assert_eq!(c.classify("linvel", "lin_vel"), StyleClass::SpellingAlias);
        assert_eq!(c.classify("linvel", "linear_velocity"), StyleClass::Renamed);
    }

    #[test]
    fn test_upper_case_detection() {
        assert!(is_upper_case("MAX_2D"));
        assert!(!is_upper_case("Max"));
        assert!(!is_upper_case("__"));
    }

    #[test]
    fn test_rank_follows_ladder() {
        let mut classes: Vec<StyleClass> = RANKS.iter().map(|(c, _)| *c).collect();
        classes.reverse();
        classes.sort_by_key(|c| c.rank());
        assert_eq!(classes.first(), Some(&StyleClass::Exact));
        assert_eq!(classes.last(), Some(&StyleClass::Renamed));
        assert!(StyleClass::ConstCaseAlias.rank() < StyleClass::DimensionSuffixAlias.rank());
    }

    #[test]
    fn test_best_for_prefers_better_class_then_first() {
        let c = classifier();
        let candidates = vec![
            "p::RigidBody::linear_velocity".to_string(),
            "p::RigidBody::lin_vel".to_string(),
            "p::RigidBody::LINVEL".to_string(),
        ];
        let (class, target) = c.best_for("rapier3d::dynamics::RigidBody::linvel", &candidates);
        assert_eq!(class, StyleClass::CaseAlias);
        assert_eq!(target, "p::RigidBody::LINVEL");

        let (class, target) = c.best_for("r::a::x", &["p::y".to_string(), "p::z".to_string()]);
        assert_eq!(class, StyleClass::Renamed);
        assert_eq!(target, "p::y");
    }
}
