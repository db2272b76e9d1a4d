//! @acp:module "Configuration"
//! @acp:summary "Audit configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config
//!
//! Every field has a default matching the rapier → moon_rapier port, so a
//! missing `.parity.config.json` is equivalent to `{}`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".parity.config.json";

/// @acp:summary "Main audit configuration structure"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reference crate settings
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Port descriptor settings
    #[serde(default)]
    pub port: PortConfig,

    /// Override table (map/ignore) path
    #[serde(default = "default_mapping")]
    pub mapping: PathBuf,

    /// Directory receiving the JSON reports
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Bucket assignment for coverage reports
    #[serde(default)]
    pub buckets: BucketConfig,

    /// Leaf normalization used by the heuristic matchers
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Style audit settings
    #[serde(default)]
    pub style: StyleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference: ReferenceConfig::default(),
            port: PortConfig::default(),
            mapping: default_mapping(),
            output: default_output(),
            buckets: BucketConfig::default(),
            normalize: NormalizeConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the given file if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_mapping() -> PathBuf {
    PathBuf::from("tools/rapier_pub_mapping.toml")
}

fn default_output() -> PathBuf {
    PathBuf::from("_build/rapier_pub_audit")
}

/// @acp:summary "Reference (rustdoc) side of the audit"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Checkout of the reference workspace
    #[serde(default = "default_reference_root")]
    pub root: PathBuf,

    /// Crates whose public surface is audited, in report order
    #[serde(default = "default_crates")]
    pub crates: Vec<String>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            root: default_reference_root(),
            crates: default_crates(),
        }
    }
}

impl ReferenceConfig {
    /// Location of the rustdoc JSON output for a crate
    pub fn index_path(&self, crate_name: &str) -> PathBuf {
        self.root
            .join("target")
            .join("doc")
            .join(format!("{}.json", crate_name.replace('-', "_")))
    }
}

fn default_reference_root() -> PathBuf {
    PathBuf::from("rapier-reference")
}

fn default_crates() -> Vec<String> {
    vec!["rapier2d".to_string(), "rapier3d".to_string()]
}

/// @acp:summary "Port (MoonBit) side of the audit"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfig {
    /// Root of the port repository
    #[serde(default = "default_port_root")]
    pub root: PathBuf,

    /// Generated interface descriptors (glob, relative to root)
    #[serde(default = "default_descriptors")]
    pub descriptors: Vec<String>,

    /// Lower-confidence source files (glob, relative to root)
    #[serde(default = "default_secondary")]
    pub secondary: Vec<String>,

    /// Paths never scanned (glob, relative to root)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Package prefix for secondary files without a sibling descriptor
    #[serde(default = "default_package_prefix")]
    pub package_prefix: String,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            root: default_port_root(),
            descriptors: default_descriptors(),
            secondary: default_secondary(),
            exclude: default_exclude(),
            package_prefix: default_package_prefix(),
        }
    }
}

fn default_port_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_descriptors() -> Vec<String> {
    vec!["*/pkg.generated.mbti".to_string()]
}

fn default_secondary() -> Vec<String> {
    vec!["*/spec.mbt".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        // Build outputs
        "_build/**".to_string(),
        "target/**".to_string(),
        // Dependencies
        ".mooncakes/**".to_string(),
        // Reference checkout lives next to the port
        "rapier-reference/**".to_string(),
        // VCS
        ".git/**".to_string(),
    ]
}

fn default_package_prefix() -> String {
    "Milky2018/moon_rapier".to_string()
}

/// @acp:summary "Known top-level modules used as report buckets"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Second path segments that form their own bucket
    #[serde(default = "default_bucket_modules")]
    pub modules: Vec<String>,

    /// Bucket for everything else
    #[serde(default = "default_catch_all")]
    pub catch_all: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            modules: default_bucket_modules(),
            catch_all: default_catch_all(),
        }
    }
}

fn default_bucket_modules() -> Vec<String> {
    [
        "control", "counters", "data", "dynamics", "geometry", "pipeline", "utils",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_catch_all() -> String {
    "lib".to_string()
}

/// @acp:summary "Closed-list leaf normalization rules"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Tokens removed wherever they occur in a leaf
    #[serde(default = "default_product_tokens")]
    pub product_tokens: Vec<String>,

    /// Suffixes stripped once each, in order
    #[serde(default = "default_dimension_suffixes")]
    pub dimension_suffixes: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            product_tokens: default_product_tokens(),
            dimension_suffixes: default_dimension_suffixes(),
        }
    }
}

fn default_product_tokens() -> Vec<String> {
    vec!["3DReal".to_string()]
}

fn default_dimension_suffixes() -> Vec<String> {
    vec!["2D".to_string(), "3D".to_string()]
}

/// @acp:summary "Style (naming drift) audit settings"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Buckets for the style report
    #[serde(default = "default_style_buckets")]
    pub buckets: BucketConfig,

    /// Normalization used for dimension-suffix aliases
    #[serde(default = "default_style_normalize")]
    pub normalize: NormalizeConfig,

    /// Reference leaf → port leaf pairs forced by a keyword clash
    #[serde(default = "default_keyword_aliases")]
    pub keyword_aliases: Vec<(String, String)>,

    /// Maximum non-exact samples kept per bucket
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            buckets: default_style_buckets(),
            normalize: default_style_normalize(),
            keyword_aliases: default_keyword_aliases(),
            sample_limit: default_sample_limit(),
        }
    }
}

fn default_style_buckets() -> BucketConfig {
    let mut buckets = BucketConfig::default();
    buckets.modules.push("math".to_string());
    buckets.modules.push("prelude".to_string());
    buckets
}

fn default_style_normalize() -> NormalizeConfig {
    NormalizeConfig {
        product_tokens: default_product_tokens(),
        dimension_suffixes: ["3D", "2D", "3", "2"].iter().map(|s| s.to_string()).collect(),
    }
}

fn default_keyword_aliases() -> Vec<(String, String)> {
    vec![("test".to_string(), "passes".to_string())]
}

fn default_sample_limit() -> usize {
    30
}
