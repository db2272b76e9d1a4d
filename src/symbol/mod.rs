//! @acp:module "Symbols"
//! @acp:summary "Normalized public symbol records shared by both surfaces"
//! @acp:domain cli
//! @acp:layer model
//!
//! Both extractors produce a [`SymbolSet`]: `(path, kind)` pairs with a
//! bucket, deduplicated on insert and sorted by `(bucket, kind, path)`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BucketConfig;

/// Separator between path segments on both surfaces
pub const PATH_SEP: &str = "::";

/// @acp:summary "Kind of a public symbol"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Module,
    Function,
    Struct,
    Enum,
    Trait,
    TraitMethod,
    Method,
    Field,
    Const,
    AssocConst,
    AssocType,
    Type,
    Variant,
    Macro,
    Static,
    Union,
    TraitAlias,
}

impl SymbolKind {
    /// Get string representation for serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Function => "function",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Trait => "trait",
            SymbolKind::TraitMethod => "trait_method",
            SymbolKind::Method => "method",
            SymbolKind::Field => "field",
            SymbolKind::Const => "const",
            SymbolKind::AssocConst => "assoc_const",
            SymbolKind::AssocType => "assoc_type",
            SymbolKind::Type => "type",
            SymbolKind::Variant => "variant",
            SymbolKind::Macro => "macro",
            SymbolKind::Static => "static",
            SymbolKind::Union => "union",
            SymbolKind::TraitAlias => "trait_alias",
        }
    }

    /// Map a rustdoc `paths[*].kind` value; `None` for kinds that are not public names
    pub fn from_rustdoc(kind: &str) -> Option<Self> {
        match kind {
            "module" => Some(SymbolKind::Module),
            "function" => Some(SymbolKind::Function),
            "struct" => Some(SymbolKind::Struct),
            "enum" => Some(SymbolKind::Enum),
            "trait" => Some(SymbolKind::Trait),
            "constant" => Some(SymbolKind::Const),
            "type_alias" => Some(SymbolKind::Type),
            "variant" => Some(SymbolKind::Variant),
            "assoc_const" => Some(SymbolKind::AssocConst),
            "assoc_type" => Some(SymbolKind::AssocType),
            "struct_field" => Some(SymbolKind::Field),
            "macro" | "proc_attribute" | "proc_derive" => Some(SymbolKind::Macro),
            "static" => Some(SymbolKind::Static),
            "union" => Some(SymbolKind::Union),
            "trait_alias" => Some(SymbolKind::TraitAlias),
            _ => None,
        }
    }

    /// Structural kinds carry no API commitment and are not audited
    pub fn is_structural(&self) -> bool {
        matches!(self, SymbolKind::Module)
    }
}

impl PartialOrd for SymbolKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reports order kinds by their serialized name.
impl Ord for SymbolKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "module" => Ok(SymbolKind::Module),
            "function" => Ok(SymbolKind::Function),
            "struct" => Ok(SymbolKind::Struct),
            "enum" => Ok(SymbolKind::Enum),
            "trait" => Ok(SymbolKind::Trait),
            "trait_method" => Ok(SymbolKind::TraitMethod),
            "method" => Ok(SymbolKind::Method),
            "field" => Ok(SymbolKind::Field),
            "const" => Ok(SymbolKind::Const),
            "assoc_const" => Ok(SymbolKind::AssocConst),
            "assoc_type" => Ok(SymbolKind::AssocType),
            "type" | "typealias" => Ok(SymbolKind::Type),
            "variant" => Ok(SymbolKind::Variant),
            "macro" => Ok(SymbolKind::Macro),
            "static" => Ok(SymbolKind::Static),
            "union" => Ok(SymbolKind::Union),
            "trait_alias" => Ok(SymbolKind::TraitAlias),
            _ => Err(format!("Unknown symbol kind: {}", s)),
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @acp:summary "One public symbol of a surface"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Fully qualified `a::b::c` path
    pub path: String,
    pub kind: SymbolKind,
    /// Coarse module group
    pub bucket: String,
    /// Descriptor file the symbol came from (port surface only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SymbolRecord {
    pub fn new(path: impl Into<String>, kind: SymbolKind, bucket: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            bucket: bucket.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn sort_key(&self) -> (&str, &str, &str) {
        (&self.bucket, self.kind.as_str(), &self.path)
    }
}

/// Final segment of a scoped path
pub fn leaf(path: &str) -> &str {
    path.rsplit(PATH_SEP).next().unwrap_or(path)
}

/// Split a scoped path into segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEP).collect()
}

/// Join path segments
pub fn join<S: AsRef<str>>(segs: &[S]) -> String {
    segs.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(PATH_SEP)
}

/// @acp:summary "Bucket assignment from the second path segment"
#[derive(Debug, Clone)]
pub struct BucketRules {
    modules: HashSet<String>,
    catch_all: String,
}

impl BucketRules {
    pub fn new(config: &BucketConfig) -> Self {
        Self {
            modules: config.modules.iter().cloned().collect(),
            catch_all: config.catch_all.clone(),
        }
    }

    /// `crate::geometry::Ray::new` → `geometry`; unknown or missing module → catch-all
    pub fn bucket_for(&self, path: &str) -> String {
        match path.split(PATH_SEP).nth(1) {
            Some(module) if self.modules.contains(module) => module.to_string(),
            _ => self.catch_all.clone(),
        }
    }
}

impl Default for BucketRules {
    fn default() -> Self {
        Self::new(&BucketConfig::default())
    }
}

/// @acp:summary "Deduplicating, deterministically ordered symbol collection"
#[derive(Debug, Clone, Default)]
pub struct SymbolSet {
    records: Vec<SymbolRecord>,
    seen: HashSet<(String, SymbolKind)>,
    paths: HashSet<String>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record; returns `false` when `(path, kind)` was already present
    pub fn insert(&mut self, record: SymbolRecord) -> bool {
        if !self.seen.insert((record.path.clone(), record.kind)) {
            return false;
        }
        self.paths.insert(record.path.clone());
        self.records.push(record);
        true
    }

    /// True if any record has this path, whatever its kind
    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume into records sorted by `(bucket, kind, path)`
    pub fn into_sorted(self) -> Vec<SymbolRecord> {
        let mut records = self.records;
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut set = SymbolSet::new();
        assert!(set.insert(SymbolRecord::new("rapier3d::data::Arena", SymbolKind::Struct, "data")));
        assert!(!set.insert(SymbolRecord::new("rapier3d::data::Arena", SymbolKind::Struct, "data")));
        assert!(set.insert(SymbolRecord::new("rapier3d::data::Arena", SymbolKind::Type, "data")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_sorted_by_bucket_kind_path() {
        let mut set = SymbolSet::new();
        set.insert(SymbolRecord::new("c::lib::z", SymbolKind::Function, "lib"));
        set.insert(SymbolRecord::new("c::data::B", SymbolKind::Struct, "data"));
        set.insert(SymbolRecord::new("c::data::A", SymbolKind::Struct, "data"));
        set.insert(SymbolRecord::new("c::data::f", SymbolKind::Function, "data"));

        let paths: Vec<_> = set.into_sorted().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["c::data::f", "c::data::A", "c::data::B", "c::lib::z"]);
    }

    #[test]
    fn test_bucket_assignment() {
        let rules = BucketRules::default();
        assert_eq!(rules.bucket_for("rapier3d::geometry::Ray::new"), "geometry");
        assert_eq!(rules.bucket_for("rapier3d::math::Real"), "lib");
        assert_eq!(rules.bucket_for("rapier3d"), "lib");
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(leaf("a::b::c"), "c");
        assert_eq!(leaf("single"), "single");
        assert_eq!(segments("a::b"), vec!["a", "b"]);
        assert_eq!(join(&["a", "b", "c"]), "a::b::c");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SymbolKind::from_rustdoc("constant"), Some(SymbolKind::Const));
        assert_eq!(SymbolKind::from_rustdoc("type_alias"), Some(SymbolKind::Type));
        assert_eq!(SymbolKind::from_rustdoc("primitive"), None);
        assert_eq!("trait_method".parse::<SymbolKind>().unwrap(), SymbolKind::TraitMethod);
        assert_eq!("typealias".parse::<SymbolKind>().unwrap(), SymbolKind::Type);
        assert!("fn".parse::<SymbolKind>().is_err());
        assert_eq!(
            serde_json::to_string(&SymbolKind::AssocConst).unwrap(),
            "\"assoc_const\""
        );
        assert!(SymbolKind::Field < SymbolKind::Method);
    }
}
