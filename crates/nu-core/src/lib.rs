//! Neat URL Core Library
//!
//! This crate provides the rule matching and URL rewriting engine for Neat URL.
//! Given a request URL and a rule snapshot it decides which query parameters,
//! fragment parameters and trailing path segments to strip.
//!
//! # Architecture
//!
//! Rules are parsed once into tagged variants when a [`RuleSnapshot`] is
//! built. Each request decomposes its hostname, classifies the matching rules
//! into four lists and rewrites a private copy of the parsed URL. Nothing is
//! shared between requests except the retarget slot.
//!
//! # Modules
//!
//! - `suffix`: Known multi-label public suffixes
//! - `domain`: Hostname decomposition (root domain, label before suffix)
//! - `rule`: Rule text parsing
//! - `matcher`: Rule scope matching and classification
//! - `rewrite`: Query, fragment and path rewriting
//! - `engine`: Per-request orchestration and process-wide state
//! - `retarget`: Deferred retarget slot
//! - `types`: Shared type definitions

pub mod domain;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod retarget;
pub mod rewrite;
pub mod rule;
pub mod suffix;
pub mod types;

// Re-export commonly used types
pub use domain::{decompose, DomainParts};
pub use engine::{clean_url, Cleaner, RuleSnapshot};
pub use error::CleanError;
pub use matcher::{classify, ClassifiedParams};
pub use retarget::{PendingRetarget, RetargetSlot, RetargetToken, RETARGET_DELAY};
pub use rule::{DomainScope, Rule, RuleKind};
pub use suffix::SuffixTable;
pub use types::{ChangeKind, CleanOutcome, CleanRequest, RequestType, SkipReason};
