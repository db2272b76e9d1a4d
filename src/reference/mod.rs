//! @acp:module "Reference Surface"
//! @acp:summary "Public symbol extraction from a rustdoc JSON index"
//! @acp:domain cli
//! @acp:layer service
//!
//! # Extraction
//!
//! 1. **Seed** from the `paths` table: rustdoc has already resolved `pub use`
//!    re-exports (globs included), so every entry under the crate namespace is
//!    a public name.
//! 2. **Enrich** traits with their associated items.
//! 3. **Enrich** structs with public named fields, and structs/enums with the
//!    public items of their inherent impls. Trait impls are skipped: they add
//!    behavior, not names.

pub mod rustdoc;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};
use crate::symbol::{join, BucketRules, SymbolKind, SymbolRecord, SymbolSet, PATH_SEP};

pub use rustdoc::{build_rustdoc_json, DocIndex, DocItem, ItemId};
use rustdoc::{EnumInner, ImplInner, ModuleInner, StructInner, StructKind, TraitInner};

/// @acp:summary "Public surface of one reference crate"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSurface {
    #[serde(rename = "crate")]
    pub crate_name: String,
    pub items: Vec<SymbolRecord>,
}

/// @acp:summary "Extracts the reference surface of one crate"
pub struct ReferenceExtractor<'a> {
    doc: &'a DocIndex,
    crate_name: &'a str,
    buckets: &'a BucketRules,
    symbols: SymbolSet,
}

impl<'a> ReferenceExtractor<'a> {
    pub fn new(doc: &'a DocIndex, crate_name: &'a str, buckets: &'a BucketRules) -> Self {
        Self {
            doc,
            crate_name,
            buckets,
            symbols: SymbolSet::new(),
        }
    }

    /// @acp:summary "Run the extraction and return the sorted surface"
    pub fn extract(mut self) -> Result<ReferenceSurface> {
        self.check_root()?;
        let doc = self.doc;

        // rustdoc names the crate namespace with underscores.
        let namespace = self.crate_name.replace('-', "_");
        self.add(namespace.clone(), SymbolKind::Module);

        let prefix = format!("{}{}", namespace, PATH_SEP);
        let mut public: Vec<(SymbolKind, String, ItemId)> = Vec::new();
        for (id, summary) in &doc.paths {
            if summary.path.is_empty() {
                continue;
            }
            let path = join(&summary.path);
            if path != namespace && !path.starts_with(&prefix) {
                continue;
            }
            match SymbolKind::from_rustdoc(&summary.kind) {
                Some(kind) => public.push((kind, path, ItemId(id.clone()))),
                None => tracing::trace!("skipping {} of kind {}", path, summary.kind),
            }
        }
        public.sort();

        for (kind, path, id) in public {
            self.add(path.clone(), kind);
            if let Some(item) = doc.item(&id) {
                self.enrich(&path, item);
            }
        }

        let items = self.symbols.into_sorted();
        tracing::debug!("{}: {} public symbols", self.crate_name, items.len());
        Ok(ReferenceSurface {
            crate_name: self.crate_name.to_string(),
            items,
        })
    }

    fn check_root(&self) -> Result<()> {
        let root = self.doc.item(&self.doc.root).ok_or_else(|| {
            AuditError::MalformedIndex(format!("root item {} missing from index", self.doc.root))
        })?;
        match root.inner_as::<ModuleInner>("module") {
            Some(module) if module.is_crate => Ok(()),
            _ => Err(AuditError::MalformedIndex(format!(
                "root of {} is not a crate module",
                self.crate_name
            ))),
        }
    }

    fn add(&mut self, path: String, kind: SymbolKind) {
        let bucket = self.buckets.bucket_for(&path);
        self.symbols.insert(SymbolRecord::new(path, kind, bucket));
    }

    fn enrich(&mut self, path: &str, item: &DocItem) {
        if let Some(tr) = item.inner_as::<TraitInner>("trait") {
            // Trait members inherit the trait's visibility.
            for assoc in self.members(&tr.items) {
                if let (Some(name), Some(kind)) = (&assoc.name, trait_member_kind(assoc)) {
                    self.add(format!("{}{}{}", path, PATH_SEP, name), kind);
                }
            }
        }

        if let Some(st) = item.inner_as::<StructInner>("struct") {
            if let StructKind::Plain { fields } = &st.kind {
                for field in self.members(fields) {
                    if !field.is_public() {
                        continue;
                    }
                    if let Some(name) = &field.name {
                        self.add(format!("{}{}{}", path, PATH_SEP, name), SymbolKind::Field);
                    }
                }
            }
            self.inherent_impls(path, &st.impls);
        }

        if let Some(en) = item.inner_as::<EnumInner>("enum") {
            self.inherent_impls(path, &en.impls);
        }
    }

    fn inherent_impls(&mut self, type_path: &str, impl_ids: &[ItemId]) {
        let doc = self.doc;
        for impl_id in impl_ids {
            let Some(imp) = doc.item(impl_id).and_then(|i| i.inner_as::<ImplInner>("impl")) else {
                continue;
            };
            if imp.is_trait_impl() {
                continue;
            }
            for assoc in self.members(&imp.items) {
                if !assoc.is_public() {
                    continue;
                }
                if let (Some(name), Some(kind)) = (&assoc.name, inherent_member_kind(assoc)) {
                    self.add(format!("{}{}{}", type_path, PATH_SEP, name), kind);
                }
            }
        }
    }

    fn members(&self, ids: &[ItemId]) -> Vec<&'a DocItem> {
        let doc = self.doc;
        ids.iter().filter_map(|id| doc.item(id)).collect()
    }
}

fn trait_member_kind(item: &DocItem) -> Option<SymbolKind> {
    if item.is("function") {
        Some(SymbolKind::TraitMethod)
    } else if item.is("assoc_type") {
        Some(SymbolKind::AssocType)
    } else if item.is("assoc_const") {
        Some(SymbolKind::AssocConst)
    } else {
        None
    }
}

fn inherent_member_kind(item: &DocItem) -> Option<SymbolKind> {
    if item.is("function") {
        Some(SymbolKind::Method)
    } else if item.is("assoc_const") {
        Some(SymbolKind::AssocConst)
    } else if item.is("assoc_type") {
        Some(SymbolKind::AssocType)
    } else {
        None
    }
}

/// @acp:summary "Convenience wrapper: extract a crate's surface from an index"
pub fn extract_reference_surface(
    doc: &DocIndex,
    crate_name: &str,
    buckets: &BucketRules,
) -> Result<ReferenceSurface> {
    ReferenceExtractor::new(doc, crate_name, buckets).extract()
}
