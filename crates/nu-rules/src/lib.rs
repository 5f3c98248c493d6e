//! Neat URL Rule Set Compiler
//!
//! This crate turns bundled rule data and persisted settings into the
//! immutable `RuleSnapshot` the core engine runs on.

pub mod builder;
pub mod defaults;
pub mod error;
pub mod optimizer;
pub mod parser;
pub mod settings;

pub use builder::{build_snapshot, effective_rules, BuildStats};
pub use defaults::{bundled_default_params, bundled_suffix_table, load_default_params, DefaultParams};
pub use error::RulesError;
pub use optimizer::{prune_user_rules, PruneStats};
pub use parser::{format_rule_list, parse_rule_list};
pub use settings::Settings;
