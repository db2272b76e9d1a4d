//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each command is in its own submodule: an options struct plus an
//! `execute_*` entry point called by the binary.

pub mod diff;
pub mod run;
pub mod style;

pub use diff::{execute_diff, unified_diff, DiffOptions};
pub use run::{audit, execute_run, parse_index_arg, AuditOutcome, RunOptions};
pub use style::{execute_style, StyleOptions};
