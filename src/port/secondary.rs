//! @acp:module "Secondary Port Source"
//! @acp:summary "Low-confidence scan of hand-written `spec.mbt` sources"
//! @acp:domain cli
//! @acp:layer parser
//!
//! `spec.mbt` is not a signature file, but its obvious top-level exports are
//! still worth counting before descriptors are regenerated. Only type and free
//! function declarations are recognized.

use std::sync::LazyLock;

use regex::Regex;

use super::descriptor::Declaration;
use crate::symbol::SymbolKind;

static TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*pub\s+(struct|enum|trait|type)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

/// Free functions only; `pub fn Owner::method` is not a match
static FN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*pub\s+fn\s+([A-Za-z_][A-Za-z0-9_]*)\s*[\[(]").unwrap());

/// @acp:summary "Top-level declarations of a secondary source file"
pub fn scan_secondary(content: &str) -> Vec<Declaration> {
    content
        .lines()
        .filter_map(|line| {
            if let Some(caps) = TYPE_PATTERN.captures(line) {
                let kind = caps[1].parse::<SymbolKind>().ok()?;
                return Some(Declaration {
                    symbol: caps[2].to_string(),
                    kind,
                });
            }
            FN_PATTERN.captures(line).map(|caps| Declaration {
                symbol: caps[1].to_string(),
                kind: SymbolKind::Function,
            })
        })
        .collect()
}
