//! JSON output shapes, shared with the extension through generated
//! TypeScript bindings.

use serde::Serialize;
use ts_rs::TS;

use nu_core::{ClassifiedParams, CleanOutcome, DomainParts, PendingRetarget};
use nu_rules::BuildStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CleanReport {
    pub input: String,
    pub output: Option<String>,
    pub changed: bool,
    /// Why nothing changed
    pub reason: Option<String>,
    /// Rewrite went through the retarget slot
    pub deferred: bool,
    /// Set once a deferred rewrite fired
    pub retarget: Option<RetargetReport>,
}

impl CleanReport {
    pub fn from_outcome(input: &str, outcome: &CleanOutcome) -> Self {
        match outcome {
            CleanOutcome::Skipped(reason) => Self::skipped(input, reason.as_str()),
            CleanOutcome::Rewritten { url, change } => Self {
                input: input.to_string(),
                output: Some(url.clone()),
                changed: true,
                reason: None,
                deferred: matches!(change, nu_core::ChangeKind::Deferred(_)),
                retarget: None,
            },
        }
    }

    pub fn skipped(input: &str, reason: &str) -> Self {
        Self {
            input: input.to_string(),
            output: None,
            changed: false,
            reason: Some(reason.to_string()),
            deferred: false,
            retarget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RetargetReport {
    #[ts(type = "number")]
    pub token: u64,
    pub target: String,
    pub origin: String,
    pub tab_id: i32,
}

impl From<PendingRetarget> for RetargetReport {
    fn from(pending: PendingRetarget) -> Self {
        Self {
            token: pending.token.0,
            target: pending.target,
            origin: pending.origin,
            tab_id: pending.tab_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExplainReport {
    pub url: String,
    pub domain: String,
    pub root_domain: String,
    pub domain_minus_suffix: String,
    pub blocked: Vec<String>,
    pub hash: Vec<String>,
    pub endings: Vec<String>,
    pub excludes: Vec<String>,
}

impl ExplainReport {
    pub fn new(url: &str, parts: &DomainParts, params: &ClassifiedParams<'_>) -> Self {
        Self {
            url: url.to_string(),
            domain: parts.domain.clone(),
            root_domain: parts.root_domain.clone(),
            domain_minus_suffix: parts.minus_suffix.clone(),
            blocked: owned(&params.blocked),
            hash: owned(&params.hash),
            endings: owned(&params.endings),
            excludes: owned(&params.excludes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RulesReport {
    pub defaults: u32,
    pub overridden: u32,
    pub user: u32,
    pub total: u32,
    pub rules: Vec<String>,
    pub blacklist: Vec<String>,
    pub types: Vec<String>,
}

impl RulesReport {
    pub fn new(stats: BuildStats, rules: Vec<String>, blacklist: Vec<String>, types: Vec<String>) -> Self {
        Self {
            defaults: stats.defaults as u32,
            overridden: stats.overridden as u32,
            user: stats.user as u32,
            total: stats.total as u32,
            rules,
            blacklist,
            types,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PruneReport {
    pub before: u32,
    pub after: u32,
    pub changed: bool,
    /// Settings text to persist under `neat_url_blocked_params`
    pub blocked_params: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
