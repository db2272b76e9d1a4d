#![forbid(unsafe_code)]

//! @acp:module "Parity Library"
//! @acp:summary "Public-API parity audit between a Rust crate and its MoonBit port"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # surface-parity
//!
//! Compares the public surface of a reference Rust crate, read from rustdoc
//! JSON, with the exports of a port, read from generated `.mbti` interface
//! descriptors, and reports what the port does not cover yet.
//!
//! ## Pipeline
//!
//! - **Reference surface**: [`reference`] walks the rustdoc index
//! - **Port surface**: [`port`] scans descriptors with a line state machine
//! - **Overrides**: [`mapping`] reads hand-authored `[map]`/`[ignore]` tables
//! - **Coverage**: [`matcher`] resolves each symbol, [`report`] aggregates
//! - **Style**: [`conventions`] classifies naming drift of mapped entries
//!
//! ## Example
//!
//! ```rust,no_run
//! use parity::{audit, Config, RunOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default(".parity.config.json")?;
//!     let outcome = audit(&config, &RunOptions::default())?;
//!
//!     for (name, surface) in &outcome.report.surfaces {
//!         println!("{}: {} missing", name, surface.totals.missing);
//!     }
//!     outcome.write(&config.output)?;
//!
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod conventions;
pub mod error;
pub mod mapping;
pub mod matcher;
pub mod port;
pub mod reference;
pub mod report;
pub mod symbol;

// Re-exports
pub use commands::{audit, AuditOutcome, RunOptions};
pub use config::Config;
pub use conventions::{build_style_report, StyleClass, StyleClassifier, StyleReport};
pub use error::{AuditError, Result};
pub use mapping::{MappingValue, OverrideTable};
pub use matcher::{CoverageResult, MatchKind, Matcher, Normalizer};
pub use port::{PortScanner, PortSurface};
pub use reference::{extract_reference_surface, DocIndex, ReferenceSurface};
pub use report::{CoverageReport, ReportBuilder, SurfaceReport};
pub use symbol::{BucketRules, SymbolKind, SymbolRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
