//! @acp:module "Rustdoc Index"
//! @acp:summary "Subset of the rustdoc JSON format read by the reference extractor"
//! @acp:domain cli
//! @acp:layer model
//!
//! Only the fields the audit reads are modelled; everything else in the
//! (unstable) format is ignored, so minor format revisions keep loading.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{AuditError, Result};

/// Item identifier; integers in recent format versions, strings in older ones
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub String);

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Num(u64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Num(n) => ItemId(n.to_string()),
            RawId::Str(s) => ItemId(s),
        })
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// @acp:summary "Top-level rustdoc JSON document"
#[derive(Debug, Clone, Deserialize)]
pub struct DocIndex {
    pub root: ItemId,
    #[serde(default)]
    pub index: HashMap<String, DocItem>,
    #[serde(default)]
    pub paths: HashMap<String, PathSummary>,
}

impl DocIndex {
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn item(&self, id: &ItemId) -> Option<&DocItem> {
        self.index.get(&id.0)
    }
}

/// @acp:summary "Resolved path of an item (after re-export resolution)"
#[derive(Debug, Clone, Deserialize)]
pub struct PathSummary {
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub kind: String,
}

/// @acp:summary "One entry of the item index"
#[derive(Debug, Clone, Deserialize)]
pub struct DocItem {
    #[serde(default)]
    pub name: Option<String>,
    /// `"public"`, `"default"`, `"crate"` or `{"restricted": ...}`
    #[serde(default)]
    pub visibility: serde_json::Value,
    /// Externally tagged by item kind, e.g. `{"struct": {...}}`
    #[serde(default)]
    pub inner: serde_json::Map<String, serde_json::Value>,
}

impl DocItem {
    /// Public flag of the item itself, regardless of its parent
    pub fn is_public(&self) -> bool {
        self.visibility.as_str() == Some("public")
    }

    /// Whether `inner` is tagged with the given kind
    pub fn is(&self, tag: &str) -> bool {
        self.inner.contains_key(tag)
    }

    /// Decode the payload under `tag`, if present and well formed
    pub fn inner_as<T: DeserializeOwned>(&self, tag: &str) -> Option<T> {
        let value = self.inner.get(tag)?;
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleInner {
    #[serde(default)]
    pub is_crate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StructInner {
    pub kind: StructKind,
    #[serde(default)]
    pub impls: Vec<ItemId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructKind {
    Unit,
    Tuple(Vec<Option<ItemId>>),
    Plain {
        #[serde(default)]
        fields: Vec<ItemId>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumInner {
    #[serde(default)]
    pub impls: Vec<ItemId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraitInner {
    #[serde(default)]
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImplInner {
    /// Present (non-null) for trait implementations
    #[serde(default, rename = "trait")]
    pub trait_: Option<serde_json::Value>,
    #[serde(default)]
    pub items: Vec<ItemId>,
}

impl ImplInner {
    pub fn is_trait_impl(&self) -> bool {
        self.trait_.as_ref().is_some_and(|t| !t.is_null())
    }
}

/// @acp:summary "Build rustdoc JSON for a crate of the reference workspace"
/// @acp:ai-careful "Runs cargo with RUSTC_BOOTSTRAP=1 to unlock -Z flags"
pub fn build_rustdoc_json(reference_root: &Path, crate_name: &str, out: &Path) -> Result<PathBuf> {
    tracing::info!("building rustdoc JSON for {}", crate_name);
    let status = Command::new("cargo")
        .args(["rustdoc", "-p", crate_name, "--", "-Z", "unstable-options"])
        .args(["--output-format", "json"])
        .current_dir(reference_root)
        .env("RUSTC_BOOTSTRAP", "1")
        .status()
        .map_err(|e| AuditError::External(format!("cargo rustdoc -p {}: {}", crate_name, e)))?;

    if !status.success() {
        return Err(AuditError::External(format!(
            "cargo rustdoc -p {} exited with {}",
            crate_name, status
        )));
    }
    if !out.exists() {
        return Err(AuditError::not_found("rustdoc JSON", out));
    }
    Ok(out.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let doc: DocIndex = serde_json::from_str(
            r#"{"root": 0, "index": {}, "paths": {"0:1": {"path": ["c"], "kind": "module"}}}"#,
        )
        .unwrap();
        assert_eq!(doc.root, ItemId("0".to_string()));

        let doc: DocIndex = serde_json::from_str(r#"{"root": "0:0"}"#).unwrap();
        assert_eq!(doc.root.to_string(), "0:0");
    }

    #[test]
    fn test_struct_kinds() {
        let item: DocItem = serde_json::from_str(
            r#"{"name": "P", "visibility": "public",
                "inner": {"struct": {"kind": {"plain": {"fields": [3, 4], "has_stripped_fields": true}},
                                     "generics": {}, "impls": [9]}}}"#,
        )
        .unwrap();
        assert!(item.is_public());
        let st: StructInner = item.inner_as("struct").unwrap();
        match st.kind {
            StructKind::Plain { fields } => assert_eq!(fields.len(), 2),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(st.impls, vec![ItemId("9".to_string())]);

        let unit: StructInner = serde_json::from_str(r#"{"kind": "unit"}"#).unwrap();
        assert!(matches!(unit.kind, StructKind::Unit));
    }

    #[test]
    fn test_restricted_visibility_is_not_public() {
        let item: DocItem = serde_json::from_str(
            r#"{"name": "x", "visibility": {"restricted": {"parent": 1, "path": "::a"}}, "inner": {}}"#,
        )
        .unwrap();
        assert!(!item.is_public());
    }

    #[test]
    fn test_trait_impl_detection() {
        let inherent: ImplInner = serde_json::from_str(r#"{"trait": null, "items": [1]}"#).unwrap();
        assert!(!inherent.is_trait_impl());
        let by_trait: ImplInner =
            serde_json::from_str(r#"{"trait": {"path": "Clone", "id": 5}, "items": []}"#).unwrap();
        assert!(by_trait.is_trait_impl());
    }
}
