//! Effective rule snapshot builder
//!
//! Effective rule order is: default rules the user did not override, in
//! bundled order, followed by the user's own rules. Override removal is by
//! exact rule text and never touches the default list itself.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use nu_core::{Rule, RuleSnapshot, SuffixTable};

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    /// Default rules available
    pub defaults: usize,
    /// Default rules dropped by overrides
    pub overridden: usize,
    /// User rules appended
    pub user: usize,
    /// Rules in the snapshot
    pub total: usize,
}

/// Effective rule text list: defaults minus overrides, then user rules.
pub fn effective_rules(defaults: &[String], overrides: &[String], user: &[String]) -> Vec<String> {
    let overrides: HashSet<&str> = overrides.iter().map(String::as_str).collect();
    defaults
        .iter()
        .filter(|rule| !overrides.contains(rule.as_str()))
        .chain(user.iter())
        .cloned()
        .collect()
}

/// Build an immutable snapshot from default rules and settings.
pub fn build_snapshot(
    defaults: &[String],
    settings: &Settings,
    suffixes: Arc<SuffixTable>,
) -> (RuleSnapshot, BuildStats) {
    let user = settings.user_rules();
    let texts = effective_rules(defaults, &settings.overrides(), &user);

    let stats = BuildStats {
        defaults: defaults.len(),
        overridden: defaults.len() + user.len() - texts.len(),
        user: user.len(),
        total: texts.len(),
    };
    debug!(
        "built rule snapshot: {} defaults ({} overridden), {} user rules",
        stats.defaults, stats.overridden, stats.user
    );

    let rules = texts.iter().map(|text| Rule::parse(text)).collect();
    let snapshot = RuleSnapshot::new(
        rules,
        settings.blacklist(),
        suffixes,
        settings.request_types(),
    );

    (snapshot, stats)
}
