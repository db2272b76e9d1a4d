//! @acp:module "Override Table"
//! @acp:summary "Hand-authored reference→port mappings and ignore entries"
//! @acp:domain cli
//! @acp:layer config
//!
//! The table is a small TOML subset, parsed line by line:
//!
//! ```toml
//! [map]
//! "rapier3d::dynamics::RigidBody::linvel" = "pkg/dynamics::RigidBody::linear_velocity"
//! "rapier3d::geometry::Ray::new" = ["pkg/geometry::Ray::new", "pkg/geometry::ray"]
//!
//! [ignore]
//! "rapier3d::utils::SimdRealCopy" = "SIMD lanes have no MoonBit counterpart"
//! ```
//!
//! Any other line shape is an error: a broken table must not silently skew
//! coverage numbers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// `"key" = value`
static ENTRY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?P<key>[^"]+)"\s*=\s*(?P<val>.+)$"#).unwrap());

/// `"value"` (may be empty, used for ignore reasons)
static STRING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?P<v>[^"]*)"$"#).unwrap());

/// `["a", "b"]`, trailing comma allowed
static LIST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[\s*(?P<items>"[^"]+"(?:\s*,\s*"[^"]+")*)\s*,?\s*\]$"#).unwrap()
});

static LIST_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// @acp:summary "Mapping value; the scalar/list form is preserved"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingValue {
    Single(String),
    Many(Vec<String>),
}

impl MappingValue {
    /// Acceptable port paths, in declaration order
    pub fn candidates(&self) -> &[String] {
        match self {
            MappingValue::Single(s) => std::slice::from_ref(s),
            MappingValue::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Map,
    Ignore,
}

/// @acp:summary "Parsed override table"
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    /// Source file, for reports
    pub path: Option<PathBuf>,
    pub map: BTreeMap<String, MappingValue>,
    pub ignore: BTreeMap<String, String>,
}

impl OverrideTable {
    /// @acp:summary "Load a table; a missing file yields an empty table"
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("override table {} not found, using empty table", path.display());
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut table = Self::parse(&content, path)?;
        table.path = Some(path.to_path_buf());
        Ok(table)
    }

    /// @acp:summary "Parse table text; `origin` is only used in error messages"
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut table = Self::default();
        let mut current: Option<Table> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = match name.trim() {
                    "map" => Some(Table::Map),
                    "ignore" => Some(Table::Ignore),
                    other => {
                        return Err(AuditError::config(
                            origin,
                            line_no,
                            format!("unknown table [{}]", other),
                        ))
                    }
                };
                continue;
            }

            let caps = ENTRY_PATTERN.captures(line).ok_or_else(|| {
                AuditError::config(origin, line_no, format!("unsupported line: {}", raw))
            })?;
            let key = caps["key"].to_string();
            let val = caps["val"].trim();

            match current {
                None => {
                    return Err(AuditError::config(
                        origin,
                        line_no,
                        "entry outside of a [map] or [ignore] table",
                    ))
                }
                Some(Table::Ignore) => {
                    let reason = STRING_PATTERN.captures(val).ok_or_else(|| {
                        AuditError::config(origin, line_no, "ignore values must be quoted strings")
                    })?;
                    if table.ignore.insert(key.clone(), reason["v"].to_string()).is_some() {
                        return Err(duplicate(origin, line_no, &key));
                    }
                }
                Some(Table::Map) => {
                    let value = parse_map_value(val).ok_or_else(|| {
                        AuditError::config(
                            origin,
                            line_no,
                            "map values must be a quoted string or a non-empty string array",
                        )
                    })?;
                    if table.map.insert(key.clone(), value).is_some() {
                        return Err(duplicate(origin, line_no, &key));
                    }
                }
            }
        }

        Ok(table)
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore.contains_key(path)
    }

    pub fn mapping(&self, path: &str) -> Option<&MappingValue> {
        self.map.get(path)
    }

    /// Display name of the source file
    pub fn source_name(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

fn parse_map_value(val: &str) -> Option<MappingValue> {
    if val.starts_with('[') {
        let caps = LIST_PATTERN.captures(val)?;
        let items: Vec<String> = LIST_ITEM_PATTERN
            .captures_iter(&caps["items"])
            .map(|c| c[1].to_string())
            .collect();
        return Some(MappingValue::Many(items));
    }
    let caps = STRING_PATTERN.captures(val)?;
    let v = &caps["v"];
    if v.is_empty() {
        return None;
    }
    Some(MappingValue::Single(v.to_string()))
}

fn duplicate(origin: &Path, line: usize, key: &str) -> AuditError {
    AuditError::config(origin, line, format!("duplicate key \"{}\"", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<OverrideTable> {
        OverrideTable::parse(content, Path::new("map.toml"))
    }

    #[test]
    fn test_parse_both_tables() {
        let table = parse(
            r#"
# comment
[map]
"a::b::c" = "pkg::c"
"a::b::d" = ["pkg::d", "pkg::D", ]

[ignore]
"a::b::e" = "not applicable"
"a::b::f" = ""
"#,
        )
        .unwrap();

        assert_eq!(
            table.mapping("a::b::c"),
            Some(&MappingValue::Single("pkg::c".to_string()))
        );
        assert_eq!(
            table.mapping("a::b::d").unwrap().candidates(),
            &["pkg::d".to_string(), "pkg::D".to_string()]
        );
        assert!(table.is_ignored("a::b::e"));
        assert_eq!(table.ignore["a::b::f"], "");
    }

    #[test]
    fn test_bad_line_reports_location() {
        let err = parse("[map]\n\"a\" = \"b\"\nnot a valid line\n").unwrap_err();
        assert_eq!(err.to_string(), "map.toml:3: unsupported line: not a valid line");
    }

    #[test]
    fn test_rejected_shapes() {
        assert!(parse("\"a\" = \"b\"\n").is_err());
        assert!(parse("[other]\n").is_err());
        assert!(parse("[ignore]\n\"a\" = [\"b\"]\n").is_err());
        assert!(parse("[map]\n\"a\" = []\n").is_err());
        assert!(parse("[map]\n\"a\" = b\n").is_err());
        assert!(parse("[map]\n\"a\" = \"b\"\n\"a\" = \"c\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = OverrideTable::load(dir.path().join("absent.toml")).unwrap();
        assert!(table.map.is_empty());
        assert!(table.ignore.is_empty());
    }
}
